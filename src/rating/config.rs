//! Rating configuration.

use serde::{Deserialize, Serialize};

use crate::band::{ASTM_E413_OFFSETS, FrequencyBand};
use crate::contour::ASTM_E413_CONTOUR_COUNT;
use crate::error::{Error, Result};

/// Constants that define a contour-fitting rating.
///
/// The aggregate ceiling is inclusive (`sum <= max_deficiency`) while the
/// per-band ceiling is strict (`deviation < max_deviation`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingConfig {
    /// Frequencies a measurement must cover.
    pub band: FrequencyBand,

    /// Contour offset (dB) from the index at each band position.
    pub offsets: Vec<i32>,

    /// Number of reference contours, indices `0..contour_count`.
    pub contour_count: usize,

    /// Ceiling on the summed deviation of a compliant contour.
    pub max_deficiency: f64,

    /// Ceiling on any single deviation of a compliant contour.
    pub max_deviation: f64,

    /// Decimal digits kept in reported deltas and deficiency.
    pub digits: u32,
}

impl RatingConfig {
    /// ASTM E413 constants: 16 bands, 150 contours, 32 dB total, 8 dB per band.
    #[must_use]
    pub fn astm_e413() -> Self {
        Self {
            band: FrequencyBand::astm_e413(),
            offsets: ASTM_E413_OFFSETS.to_vec(),
            contour_count: ASTM_E413_CONTOUR_COUNT,
            max_deficiency: 32.0,
            max_deviation: 8.0,
            digits: 5,
        }
    }

    /// Create a new configuration builder starting from ASTM E413.
    #[must_use]
    pub fn builder() -> RatingConfigBuilder {
        RatingConfigBuilder::default()
    }

    /// Check internal consistency.
    pub fn validate(&self) -> Result<()> {
        if self.offsets.len() != self.band.len() {
            return Err(Error::InvalidConfig(format!(
                "{} offsets for {} band frequencies",
                self.offsets.len(),
                self.band.len()
            )));
        }
        if self.contour_count == 0 {
            return Err(Error::InvalidConfig(
                "contour_count must be at least 1".to_string(),
            ));
        }
        for (name, value) in [
            ("max_deficiency", self.max_deficiency),
            ("max_deviation", self.max_deviation),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "{name} must be a non-negative finite number, got {value}"
                )));
            }
        }
        if self.digits > 15 {
            return Err(Error::InvalidConfig(format!(
                "digits must be at most 15, got {}",
                self.digits
            )));
        }
        Ok(())
    }

    /// Load a configuration from a JSON file. Missing fields fall back to ASTM E413.
    pub fn from_json_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Whether this configuration describes the standard ASTM E413 contour family.
    pub(crate) fn uses_astm_contours(&self) -> bool {
        self.band == FrequencyBand::astm_e413()
            && self.offsets == ASTM_E413_OFFSETS
            && self.contour_count == ASTM_E413_CONTOUR_COUNT
    }
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self::astm_e413()
    }
}

/// Builder for [`RatingConfig`].
#[derive(Debug, Default)]
pub struct RatingConfigBuilder {
    band: Option<FrequencyBand>,
    offsets: Option<Vec<i32>>,
    contour_count: Option<usize>,
    max_deficiency: Option<f64>,
    max_deviation: Option<f64>,
    digits: Option<u32>,
}

impl RatingConfigBuilder {
    /// Set the band together with its contour offsets.
    #[must_use]
    pub fn band(mut self, band: FrequencyBand, offsets: Vec<i32>) -> Self {
        self.band = Some(band);
        self.offsets = Some(offsets);
        self
    }

    /// Set the number of reference contours.
    #[must_use]
    pub fn contour_count(mut self, count: usize) -> Self {
        self.contour_count = Some(count);
        self
    }

    /// Set the inclusive ceiling on summed deviation.
    #[must_use]
    pub fn max_deficiency(mut self, value: f64) -> Self {
        self.max_deficiency = Some(value);
        self
    }

    /// Set the strict ceiling on a single deviation.
    #[must_use]
    pub fn max_deviation(mut self, value: f64) -> Self {
        self.max_deviation = Some(value);
        self
    }

    /// Set the reported rounding precision.
    #[must_use]
    pub fn digits(mut self, digits: u32) -> Self {
        self.digits = Some(digits);
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> Result<RatingConfig> {
        let defaults = RatingConfig::astm_e413();
        let config = RatingConfig {
            band: self.band.unwrap_or(defaults.band),
            offsets: self.offsets.unwrap_or(defaults.offsets),
            contour_count: self.contour_count.unwrap_or(defaults.contour_count),
            max_deficiency: self.max_deficiency.unwrap_or(defaults.max_deficiency),
            max_deviation: self.max_deviation.unwrap_or(defaults.max_deviation),
            digits: self.digits.unwrap_or(defaults.digits),
        };
        config.validate()?;
        Ok(config)
    }
}
