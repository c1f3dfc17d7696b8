//! Reference contour table.
//!
//! A family of reference curves, one per integer index, stored as a dense
//! row-major grid of `count x band.len()` values. The value at index `i` and
//! band position `p` is `i + offsets[p]`.

use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};

use crate::band::{ASTM_E413_OFFSETS, FrequencyBand};
use crate::error::{Error, Result};

/// Number of reference contours tabulated by ASTM E413 (indices 0 to 149).
pub const ASTM_E413_CONTOUR_COUNT: usize = 150;

static ASTM_E413_TABLE: LazyLock<Arc<ContourTable>> = LazyLock::new(|| {
    Arc::new(ContourTable {
        band: FrequencyBand::astm_e413(),
        count: ASTM_E413_CONTOUR_COUNT,
        values: dense_grid(&ASTM_E413_OFFSETS, ASTM_E413_CONTOUR_COUNT),
    })
});

/// Frequency-keyed curve, iterated in ascending frequency order.
pub type BandCurve = BTreeMap<u32, f64>;

/// Immutable table of reference contours.
#[derive(Debug, Clone, PartialEq)]
pub struct ContourTable {
    band: FrequencyBand,
    count: usize,
    values: Vec<f64>,
}

impl ContourTable {
    /// Builds `count` contours over `band` from per-band offsets.
    pub fn build(band: &FrequencyBand, offsets: &[i32], count: usize) -> Result<Self> {
        if offsets.len() != band.len() {
            return Err(Error::InvalidConfig(format!(
                "{} contour offsets for a {}-frequency band",
                offsets.len(),
                band.len()
            )));
        }
        if count == 0 {
            return Err(Error::InvalidConfig(
                "contour count must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            band: band.clone(),
            count,
            values: dense_grid(offsets, count),
        })
    }

    /// The process-wide ASTM E413 table, built on first use.
    #[must_use]
    pub fn astm_e413() -> &'static Self {
        &ASTM_E413_TABLE
    }

    /// Shared handle to the ASTM E413 table.
    pub(crate) fn shared_astm_e413() -> Arc<Self> {
        Arc::clone(&ASTM_E413_TABLE)
    }

    /// Frequency band the contours are defined over.
    #[must_use]
    pub fn band(&self) -> &FrequencyBand {
        &self.band
    }

    /// Number of contours in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether the table holds no contours.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Contour values for `index`, in band order.
    #[must_use]
    pub fn contour(&self, index: usize) -> Option<&[f64]> {
        if index >= self.count {
            return None;
        }
        let width = self.band.len();
        Some(&self.values[index * width..(index + 1) * width])
    }

    /// Contour for `index` keyed by frequency.
    #[must_use]
    pub fn curve(&self, index: usize) -> Option<BandCurve> {
        self.contour(index)
            .map(|row| self.band.iter().zip(row.iter().copied()).collect())
    }

    /// Iterates `(index, contour)` pairs in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[f64])> + '_ {
        self.values.chunks_exact(self.band.len()).enumerate()
    }
}

fn dense_grid(offsets: &[i32], count: usize) -> Vec<f64> {
    let mut values = Vec::with_capacity(count * offsets.len());
    for index in 0..count {
        values.extend(offsets.iter().map(|&offset| index as f64 + f64::from(offset)));
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_astm_table_shape() {
        let table = ContourTable::astm_e413();
        assert_eq!(table.len(), 150);
        assert_eq!(table.iter().count(), 150);
        assert!(table.contour(149).is_some());
        assert!(table.contour(150).is_none());
    }

    #[test]
    fn test_contour_values_for_index_20() {
        let curve = ContourTable::astm_e413().curve(20).unwrap();
        let expected: Vec<(u32, f64)> = vec![
            (125, 4.0),
            (160, 7.0),
            (200, 10.0),
            (250, 13.0),
            (315, 16.0),
            (400, 19.0),
            (500, 20.0),
            (630, 21.0),
            (800, 22.0),
            (1000, 23.0),
            (1250, 24.0),
            (1600, 24.0),
            (2000, 24.0),
            (2500, 24.0),
            (3150, 24.0),
            (4000, 24.0),
        ];
        assert_eq!(curve.into_iter().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn test_family_is_monotonic() {
        let table = ContourTable::astm_e413();
        for (index, row) in table.iter().skip(1) {
            let below = table.contour(index - 1).unwrap();
            assert!(row.iter().zip(below).all(|(a, b)| a > b));
            assert!(row.windows(2).all(|w| w[0] <= w[1]));
        }
    }

    #[test]
    fn test_build_rejects_offset_mismatch() {
        let band = FrequencyBand::astm_e413();
        assert!(ContourTable::build(&band, &[0, 1, 2], 10).is_err());
        assert!(ContourTable::build(&band, &ASTM_E413_OFFSETS, 0).is_err());
    }

    #[test]
    fn test_build_matches_shared_table() {
        let band = FrequencyBand::astm_e413();
        let built = ContourTable::build(&band, &ASTM_E413_OFFSETS, 150).unwrap();
        assert_eq!(&built, ContourTable::astm_e413());
    }
}
