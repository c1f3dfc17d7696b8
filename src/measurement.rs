//! Measured sound transmission loss curves.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::band::FrequencyBand;
use crate::error::{Error, Result};

/// Measured transmission loss (dB) keyed by centre frequency (Hz).
///
/// Values are unrestricted in range. Whether the key set matches a band is
/// checked when the curve is rated, not on construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransmissionLoss {
    values: BTreeMap<u32, f64>,
}

impl TransmissionLoss {
    /// Wraps an existing frequency map.
    #[must_use]
    pub fn from_map(values: BTreeMap<u32, f64>) -> Self {
        Self { values }
    }

    /// Builds a curve from values ordered to match `band`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use stc_rating::{FrequencyBand, TransmissionLoss};
    ///
    /// let band = FrequencyBand::astm_e413();
    /// let stl = TransmissionLoss::from_ordered(&band, &[30.0; 16]).unwrap();
    /// assert_eq!(stl.get(4000), Some(30.0));
    /// assert!(TransmissionLoss::from_ordered(&band, &[30.0; 15]).is_err());
    /// ```
    pub fn from_ordered(band: &FrequencyBand, values: &[f64]) -> Result<Self> {
        if values.len() != band.len() {
            return Err(Error::invalid_input(format!(
                "expected {} transmission loss values, got {}",
                band.len(),
                values.len()
            )));
        }
        Ok(Self {
            values: band.iter().zip(values.iter().copied()).collect(),
        })
    }

    /// Reads the values back in band order, `None` if a band frequency is missing.
    #[must_use]
    pub fn to_ordered(&self, band: &FrequencyBand) -> Option<Vec<f64>> {
        band.iter().map(|f| self.get(f)).collect()
    }

    /// Band-ordered values, failing if the key set is not exactly `band`.
    pub fn aligned(&self, band: &FrequencyBand) -> Result<Vec<f64>> {
        let missing: Vec<u32> = band.iter().filter(|f| !self.values.contains_key(f)).collect();
        let unexpected: Vec<u32> = self
            .values
            .keys()
            .copied()
            .filter(|&f| !band.contains(f))
            .collect();

        if !missing.is_empty() || !unexpected.is_empty() {
            return Err(Error::invalid_input(format!(
                "frequencies do not match the band (missing: {:?}, unexpected: {:?})",
                missing, unexpected
            )));
        }

        if let Some((frequency, value)) = self.values.iter().find(|(_, v)| !v.is_finite()) {
            return Err(Error::invalid_input(format!(
                "non-finite transmission loss {} at {} Hz",
                value, frequency
            )));
        }

        Ok(band.iter().map(|f| self.values[&f]).collect())
    }

    #[must_use]
    pub fn get(&self, frequency: u32) -> Option<f64> {
        self.values.get(&frequency).copied()
    }

    pub fn insert(&mut self, frequency: u32, value: f64) -> Option<f64> {
        self.values.insert(frequency, value)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates `(frequency, value)` in ascending frequency order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.values.iter().map(|(&f, &v)| (f, v))
    }

    /// Returns a copy with `offset` dB added at every frequency.
    #[must_use]
    pub fn shifted(&self, offset: f64) -> Self {
        Self {
            values: self.values.iter().map(|(&f, &v)| (f, v + offset)).collect(),
        }
    }
}

impl FromIterator<(u32, f64)> for TransmissionLoss {
    fn from_iter<I: IntoIterator<Item = (u32, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
