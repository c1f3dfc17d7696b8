//! One-third-octave frequency bands used for rating.
//!
//! The band fixes both the iteration order of every curve and the exact set of
//! frequencies a measurement must cover.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The sixteen ASTM E413 one-third-octave centre frequencies, 125 Hz to 4 kHz.
pub const ASTM_E413_FREQUENCIES: [u32; 16] = [
    125, 160, 200, 250, 315, 400, 500, 630, 800, 1000, 1250, 1600, 2000, 2500, 3150, 4000,
];

/// Reference contour offset (dB) relative to the contour index, per ASTM E413 band.
pub const ASTM_E413_OFFSETS: [i32; 16] = [-16, -13, -10, -7, -4, -1, 0, 1, 2, 3, 4, 4, 4, 4, 4, 4];

/// An ordered set of distinct, strictly ascending centre frequencies in Hz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u32>", into = "Vec<u32>")]
pub struct FrequencyBand {
    frequencies: Vec<u32>,
}

impl FrequencyBand {
    /// Creates a band, rejecting empty, zero-valued or non-ascending input.
    pub fn new(frequencies: Vec<u32>) -> Result<Self> {
        if frequencies.is_empty() {
            return Err(Error::InvalidConfig("frequency band is empty".to_string()));
        }
        if frequencies.contains(&0) {
            return Err(Error::InvalidConfig(
                "frequency band contains 0 Hz".to_string(),
            ));
        }
        if let Some(pair) = frequencies.windows(2).find(|w| w[0] >= w[1]) {
            return Err(Error::InvalidConfig(format!(
                "frequency band is not strictly ascending at {} Hz -> {} Hz",
                pair[0], pair[1]
            )));
        }
        Ok(Self { frequencies })
    }

    /// The 125 Hz - 4 kHz band rated by ASTM E413.
    #[must_use]
    pub fn astm_e413() -> Self {
        Self {
            frequencies: ASTM_E413_FREQUENCIES.to_vec(),
        }
    }

    /// Frequencies in band order.
    #[must_use]
    pub fn frequencies(&self) -> &[u32] {
        &self.frequencies
    }

    /// Number of frequencies in the band.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    /// Always false for a constructed band.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// Position of `frequency` within the band.
    #[must_use]
    pub fn position(&self, frequency: u32) -> Option<usize> {
        self.frequencies.binary_search(&frequency).ok()
    }

    /// Whether `frequency` belongs to the band.
    #[must_use]
    pub fn contains(&self, frequency: u32) -> bool {
        self.position(frequency).is_some()
    }

    /// Frequencies in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.frequencies.iter().copied()
    }
}

impl Default for FrequencyBand {
    fn default() -> Self {
        Self::astm_e413()
    }
}

impl TryFrom<Vec<u32>> for FrequencyBand {
    type Error = Error;

    fn try_from(frequencies: Vec<u32>) -> Result<Self> {
        Self::new(frequencies)
    }
}

impl From<FrequencyBand> for Vec<u32> {
    fn from(band: FrequencyBand) -> Self {
        band.frequencies
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_astm_band_positions() {
        let band = FrequencyBand::astm_e413();
        assert_eq!(band.len(), 16);
        assert_eq!(band.position(125), Some(0));
        assert_eq!(band.position(500), Some(6));
        assert_eq!(band.position(4000), Some(15));
        assert_eq!(band.position(100), None);
        assert!(!band.contains(5000));
    }

    #[test]
    fn test_rejects_unordered_band() {
        assert!(FrequencyBand::new(vec![125, 125, 160]).is_err());
        assert!(FrequencyBand::new(vec![160, 125]).is_err());
        assert!(FrequencyBand::new(vec![]).is_err());
        assert!(FrequencyBand::new(vec![0, 125]).is_err());
    }

    #[test]
    fn test_offsets_plateau_above_1250() {
        let band = FrequencyBand::astm_e413();
        let start = band.position(1250).unwrap();
        assert!(ASTM_E413_OFFSETS[start..].iter().all(|&o| o == 4));
        assert!(ASTM_E413_OFFSETS.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_band_deserialize_validates() {
        let band: FrequencyBand = serde_json::from_str("[125, 250, 500]").unwrap();
        assert_eq!(band.frequencies(), &[125, 250, 500]);
        assert!(serde_json::from_str::<FrequencyBand>("[500, 250]").is_err());
    }
}
