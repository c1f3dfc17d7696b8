//! Contour-fitting rating engine.

use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::contour::{BandCurve, ContourTable};
use crate::error::{Error, Result};
use crate::measurement::TransmissionLoss;
use crate::rating::config::RatingConfig;

/// Deviation of a measured curve from one reference contour.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Reference contour index.
    pub index: usize,
    /// Shortfall below the contour at each band position, never negative.
    pub deviations: Vec<f64>,
    /// Sum of `deviations`, unrounded.
    pub total: f64,
}

impl Candidate {
    fn new(index: usize, contour: &[f64], measured: &[f64]) -> Self {
        let deviations: Vec<f64> = contour
            .iter()
            .zip(measured)
            .map(|(&reference, &value)| shortfall(reference, value))
            .collect();
        let total: f64 = deviations.iter().sum();
        Self {
            index,
            deviations,
            total,
        }
    }

    /// Both ceilings hold: total `<=` aggregate ceiling, every deviation `<` per-band ceiling.
    #[must_use]
    pub fn is_compliant(&self, config: &RatingConfig) -> bool {
        self.total <= config.max_deficiency
            && self.deviations.iter().all(|&d| d < config.max_deviation)
    }
}

/// Result of rating one measured curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    index: usize,
    contour: BandCurve,
    delta: BandCurve,
    deficiency: f64,
}

impl Rating {
    /// Winning contour index, the STC value.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Reference contour of the winning index.
    #[must_use]
    pub fn contour(&self) -> &BandCurve {
        &self.contour
    }

    /// Rounded per-frequency shortfall below the winning contour.
    #[must_use]
    pub fn delta(&self) -> &BandCurve {
        &self.delta
    }

    /// Rounded sum of the winning contour's deviations.
    #[must_use]
    pub fn deficiency(&self) -> f64 {
        self.deficiency
    }

    /// Display label, e.g. `STC 29`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("STC {}", self.index)
    }
}

/// Rates measured transmission loss curves against a reference contour table.
///
/// The table is built once and shared read-only, so an engine can be used
/// from any number of threads at once.
///
/// # Example
///
/// ```rust
/// use stc_rating::{FrequencyBand, RatingEngine, TransmissionLoss};
///
/// let engine = RatingEngine::astm_e413();
/// let stl = TransmissionLoss::from_ordered(
///     &FrequencyBand::astm_e413(),
///     &[
///         11.66, 13.303, 14.825, 20.861, 22.868, 24.943, 26.881, 28.889,
///         30.964, 32.902, 34.84, 36.984, 38.923, 40.861, 27.557, 30.67,
///     ],
/// )?;
///
/// let rating = engine.evaluate(&stl)?;
/// assert_eq!(rating.index(), 29);
/// assert_eq!(rating.deficiency(), 25.579);
/// # Ok::<(), stc_rating::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct RatingEngine {
    config: RatingConfig,
    table: Arc<ContourTable>,
}

impl RatingEngine {
    /// Create an engine for `config`, building its contour table.
    pub fn new(config: RatingConfig) -> Result<Self> {
        config.validate()?;
        let table = if config.uses_astm_contours() {
            ContourTable::shared_astm_e413()
        } else {
            Arc::new(ContourTable::build(
                &config.band,
                &config.offsets,
                config.contour_count,
            )?)
        };
        Ok(Self { config, table })
    }

    /// Engine with the standard ASTM E413 constants.
    #[must_use]
    pub fn astm_e413() -> Self {
        Self {
            config: RatingConfig::astm_e413(),
            table: ContourTable::shared_astm_e413(),
        }
    }

    /// Constants this engine rates with.
    #[must_use]
    pub fn config(&self) -> &RatingConfig {
        &self.config
    }

    /// Reference contours this engine selects from.
    #[must_use]
    pub fn table(&self) -> &ContourTable {
        &self.table
    }

    /// Deviation of `measured` from every reference contour, in index order.
    pub fn candidates(&self, measured: &TransmissionLoss) -> Result<Vec<Candidate>> {
        let values = measured.aligned(&self.config.band)?;
        Ok(self.candidates_aligned(&values).collect())
    }

    fn candidates_aligned<'a>(
        &'a self,
        values: &'a [f64],
    ) -> impl Iterator<Item = Candidate> + 'a {
        self.table
            .iter()
            .map(move |(index, contour)| Candidate::new(index, contour, values))
    }

    /// Rate one measured curve.
    ///
    /// Selects the highest contour index whose deviations satisfy both
    /// ceilings. Deltas and deficiency are rounded only after selection.
    pub fn evaluate(&self, measured: &TransmissionLoss) -> Result<Rating> {
        let values = measured.aligned(&self.config.band)?;

        let winner = self
            .candidates_aligned(&values)
            .filter(|c| c.is_compliant(&self.config))
            .max_by_key(|c| c.index)
            .ok_or(Error::NoCompliantContour {
                candidates: self.table.len(),
            })?;

        let digits = self.config.digits;
        let band = &self.config.band;
        let contour = self.table.curve(winner.index).ok_or_else(|| {
            Error::InvalidConfig(format!("contour {} missing from table", winner.index))
        })?;
        let delta: BandCurve = band
            .iter()
            .zip(&winner.deviations)
            .map(|(f, &d)| (f, round_to(d, digits)))
            .collect();

        log::debug!(
            "rated STC {} (deficiency {:.3}, max deviation {:.3})",
            winner.index,
            winner.total,
            winner.deviations.iter().copied().fold(0.0, f64::max)
        );

        Ok(Rating {
            index: winner.index,
            contour,
            delta,
            deficiency: round_to(winner.total, digits),
        })
    }

    /// Rate many curves in parallel. Results keep input order.
    pub fn evaluate_batch(&self, measurements: &[TransmissionLoss]) -> Vec<Result<Rating>> {
        measurements.par_iter().map(|m| self.evaluate(m)).collect()
    }
}

impl Default for RatingEngine {
    fn default() -> Self {
        Self::astm_e413()
    }
}

/// Shortfall of `value` below `reference`, zero when the reference is met.
fn shortfall(reference: f64, value: f64) -> f64 {
    if value < reference {
        reference - value
    } else {
        0.0
    }
}

/// Round `value` to `digits` decimal places.
///
/// Rounds the exact binary value through its decimal expansion, so
/// `0.048095` (stored just below the half) becomes `0.04809`. Scaling by
/// `10^digits` first would round the product up to the half.
#[must_use]
pub fn round_to(value: f64, digits: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{:.*}", digits as usize, value)
        .parse()
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::band::FrequencyBand;

    const LAB_WALL: [f64; 16] = [
        11.66, 13.303, 14.825, 20.861, 22.868, 24.943, 26.881, 28.889, 30.964, 32.902, 34.84,
        36.984, 38.923, 40.861, 27.557, 30.67,
    ];

    const DOUBLE_STUD: [f64; 16] = [
        22.49669, 27.85324, 32.77704, 46.30192, 52.32415, 58.54912, 64.36372, 70.38595, 76.61092,
        82.80217, 87.39175, 92.54538, 97.27899, 70.36132, 77.44058, 84.8613,
    ];

    fn flat(level: f64) -> TransmissionLoss {
        FrequencyBand::astm_e413().iter().map(|f| (f, level)).collect()
    }

    fn curve(values: &[f64]) -> TransmissionLoss {
        TransmissionLoss::from_ordered(&FrequencyBand::astm_e413(), values).unwrap()
    }

    /// Contour `index` with `shortfalls` subtracted from the leading bands.
    fn below_contour(index: usize, shortfalls: &[f64]) -> TransmissionLoss {
        let mut values = ContourTable::astm_e413().contour(index).unwrap().to_vec();
        for (value, shortfall) in values.iter_mut().zip(shortfalls) {
            *value -= shortfall;
        }
        curve(&values)
    }

    #[test]
    fn test_shortfall_is_one_sided() {
        assert_eq!(shortfall(30.0, 25.5), 4.5);
        assert_eq!(shortfall(30.0, 30.0), 0.0);
        assert_eq!(shortfall(30.0, 42.0), 0.0);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(25.579000000000004, 5), 25.579);
        assert_eq!(round_to(1.3399999999999999, 5), 1.34);
        assert_eq!(round_to(0.123456, 2), 0.12);
    }

    #[test]
    fn test_round_to_uses_exact_binary_value() {
        // 10 - 9.951905 is stored as 0.048094999..., below the half.
        assert_eq!(round_to(10.0 - 9.951905, 5), 0.04809);
        assert_eq!(round_to(28.548094999999982, 5), 28.54809);
        assert!(round_to(f64::NAN, 5).is_nan());
    }

    #[test]
    fn test_delta_just_below_half_rounds_down() {
        // Bands 160 Hz and up sit 1.9 dB under contour 26.
        let values = [
            9.951905, 11.1, 14.1, 17.1, 20.1, 23.1, 24.1, 25.1, 26.1, 27.1, 28.1, 28.1, 28.1,
            28.1, 28.1, 28.1,
        ];
        let rating = RatingEngine::astm_e413().evaluate(&curve(&values)).unwrap();

        assert_eq!(rating.index(), 26);
        assert_eq!(rating.delta()[&125], 0.04809);
        assert_eq!(rating.delta()[&160], 1.9);
        assert_eq!(rating.deficiency(), 28.54809);
    }

    #[test]
    fn test_candidates_cover_table() {
        let engine = RatingEngine::astm_e413();
        let candidates = engine.candidates(&flat(40.0)).unwrap();
        assert_eq!(candidates.len(), 150);
        assert!(candidates.iter().enumerate().all(|(i, c)| c.index == i));
        assert!(candidates.iter().all(|c| c.deviations.iter().all(|&d| d >= 0.0)));
    }

    #[test]
    fn test_flat_curve_limited_by_high_bands() {
        // At 40 dB flat, contour k shortfalls are max(0, k + offset - 40).
        let rating = RatingEngine::astm_e413().evaluate(&flat(40.0)).unwrap();
        let candidates = RatingEngine::astm_e413().candidates(&flat(40.0)).unwrap();
        assert!(candidates[rating.index()].is_compliant(&RatingConfig::astm_e413()));
        assert!(
            candidates[rating.index() + 1..]
                .iter()
                .all(|c| !c.is_compliant(&RatingConfig::astm_e413()))
        );
    }

    #[test]
    fn test_very_high_curve_rates_top_index() {
        let rating = RatingEngine::astm_e413().evaluate(&flat(1000.0)).unwrap();
        assert_eq!(rating.index(), 149);
        assert_eq!(rating.deficiency(), 0.0);
        assert_eq!(rating.label(), "STC 149");
    }

    #[test]
    fn test_no_compliant_contour() {
        let err = RatingEngine::astm_e413().evaluate(&flat(-1000.0)).unwrap_err();
        assert!(matches!(err, Error::NoCompliantContour { candidates: 150 }));
    }

    #[test]
    fn test_custom_band_engine() {
        let config = RatingConfig::builder()
            .band(FrequencyBand::new(vec![500, 1000]).unwrap(), vec![0, 2])
            .contour_count(20)
            .max_deficiency(4.0)
            .max_deviation(3.0)
            .build()
            .unwrap();
        let engine = RatingEngine::new(config).unwrap();
        let stl: TransmissionLoss = [(500, 10.0), (1000, 10.0)].into_iter().collect();
        // Index 10: deviations 0, 2. Index 11: 1, 3 (3 is not < 3).
        let rating = engine.evaluate(&stl).unwrap();
        assert_eq!(rating.index(), 10);
        assert_eq!(rating.deficiency(), 2.0);
        assert_eq!(engine.table().len(), 20);
    }

    #[test]
    fn test_batch_keeps_order() {
        let engine = RatingEngine::astm_e413();
        let inputs = vec![flat(40.0), flat(-1000.0), flat(1000.0)];
        let results = engine.evaluate_batch(&inputs);
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert_eq!(results[2].as_ref().unwrap().index(), 149);
    }

    #[test]
    fn test_lab_wall_rates_stc_29() {
        let rating = RatingEngine::astm_e413().evaluate(&curve(&LAB_WALL)).unwrap();

        assert_eq!(rating.index(), 29);
        assert_eq!(rating.deficiency(), 25.579);
        assert_eq!(rating.contour(), &ContourTable::astm_e413().curve(29).unwrap());
        assert_eq!(rating.delta()[&125], 1.34);
        assert_eq!(rating.delta()[&800], 0.036);
        assert_eq!(rating.delta()[&3150], 5.443);
        assert_eq!(rating.delta()[&1000], 0.0);
        assert_eq!(rating.delta().len(), 16);
    }

    #[test]
    fn test_double_stud_limited_by_single_band() {
        let engine = RatingEngine::astm_e413();
        let measured = curve(&DOUBLE_STUD);
        let rating = engine.evaluate(&measured).unwrap();

        assert_eq!(rating.index(), 46);
        assert_eq!(rating.deficiency(), 15.87303);
        assert_eq!(rating.delta()[&125], 7.50331);

        // One step higher the 125 Hz shortfall reaches 8.5 dB with total well under 32
        let next = &engine.candidates(&measured).unwrap()[47];
        assert!(next.total <= 32.0);
        assert!(!next.is_compliant(engine.config()));
    }

    #[test]
    fn test_fifteen_values_is_invalid_input() {
        let band = FrequencyBand::astm_e413();
        let err = TransmissionLoss::from_ordered(&band, &LAB_WALL[..15]).unwrap_err();
        assert!(matches!(err, Error::InvalidInput { .. }));
    }

    #[test]
    fn test_mismatched_keys_are_invalid_input() {
        let mut measured = curve(&LAB_WALL);
        measured.insert(5000, 45.0);
        let err = RatingEngine::astm_e413().evaluate(&measured).unwrap_err();
        assert!(matches!(err, Error::InvalidInput { .. }));

        let short: TransmissionLoss = FrequencyBand::astm_e413()
            .iter()
            .take(15)
            .map(|f| (f, 40.0))
            .collect();
        let err = RatingEngine::astm_e413().evaluate(&short).unwrap_err();
        assert!(matches!(err, Error::InvalidInput { .. }));
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let engine = RatingEngine::astm_e413();
        let measured = curve(&LAB_WALL);
        let first = engine.evaluate(&measured).unwrap();
        for _ in 0..5 {
            assert_eq!(engine.evaluate(&measured).unwrap(), first);
        }
        assert_eq!(RatingEngine::default().evaluate(&measured).unwrap(), first);
    }

    #[test]
    fn test_raising_curve_never_lowers_rating() {
        let engine = RatingEngine::astm_e413();
        for base in [LAB_WALL, DOUBLE_STUD] {
            let measured = curve(&base);
            let mut previous = engine.evaluate(&measured).unwrap().index();
            for shift in [0.0, 0.25, 0.5, 1.0, 2.75, 5.0, 12.0, 40.0] {
                let index = engine.evaluate(&measured.shifted(shift)).unwrap().index();
                assert!(index >= previous, "shift {shift}: {index} < {previous}");
                previous = index;
            }
        }
    }

    #[test]
    fn test_winner_is_highest_compliant_index() {
        let engine = RatingEngine::astm_e413();
        let config = engine.config();
        for base in [LAB_WALL, DOUBLE_STUD] {
            let measured = curve(&base);
            let rating = engine.evaluate(&measured).unwrap();
            let candidates = engine.candidates(&measured).unwrap();

            let winner = &candidates[rating.index()];
            assert!(winner.total <= 32.0);
            assert!(winner.deviations.iter().all(|&d| d < 8.0));
            assert_abs_diff_eq!(winner.total, rating.deficiency(), epsilon = 1e-5);

            assert!(
                candidates[rating.index() + 1..]
                    .iter()
                    .all(|c| !c.is_compliant(config))
            );
            assert!(rating.index() < 150);
        }
    }

    #[test]
    fn test_total_of_exactly_32_is_accepted() {
        let measured = below_contour(50, &[7.0, 7.0, 7.0, 7.0, 4.0]);
        let engine = RatingEngine::astm_e413();

        let candidate = &engine.candidates(&measured).unwrap()[50];
        assert_eq!(candidate.total, 32.0);
        assert!(candidate.is_compliant(engine.config()));

        let rating = engine.evaluate(&measured).unwrap();
        assert_eq!(rating.index(), 50);
        assert_eq!(rating.deficiency(), 32.0);
    }

    #[test]
    fn test_single_deviation_of_exactly_8_is_rejected() {
        let measured = below_contour(50, &[8.0]);
        let engine = RatingEngine::astm_e413();

        let candidate = &engine.candidates(&measured).unwrap()[50];
        assert_eq!(candidate.total, 8.0);
        assert!(!candidate.is_compliant(engine.config()));

        let rating = engine.evaluate(&measured).unwrap();
        assert_eq!(rating.index(), 49);
        assert_eq!(rating.delta()[&125], 7.0);
        assert_eq!(rating.deficiency(), 7.0);
    }

    #[test]
    fn test_pathological_curve_has_no_rating() {
        let measured = curve(&[-500.0; 16]);
        let err = RatingEngine::astm_e413().evaluate(&measured).unwrap_err();
        assert!(matches!(err, Error::NoCompliantContour { .. }));
    }

    #[test]
    fn test_concurrent_evaluations_agree() {
        let engine = RatingEngine::astm_e413();
        let expected = engine.evaluate(&curve(&LAB_WALL)).unwrap();

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| engine.evaluate(&curve(&LAB_WALL)).unwrap()))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });

        let batch: Vec<TransmissionLoss> = (0..64)
            .map(|i| curve(&LAB_WALL).shifted(f64::from(i)))
            .collect();
        let results = engine.evaluate_batch(&batch);
        assert_eq!(results[0].as_ref().unwrap(), &expected);
        assert!(
            results
                .windows(2)
                .all(|w| w[0].as_ref().unwrap().index() <= w[1].as_ref().unwrap().index())
        );
    }

    #[test]
    fn test_alternate_ceilings() {
        let config = RatingConfig::builder().max_deficiency(16.0).build().unwrap();
        let rating = RatingEngine::new(config)
            .unwrap()
            .evaluate(&curve(&LAB_WALL))
            .unwrap();
        // Index 28 totals 15.543, index 29 totals 25.579
        assert_eq!(rating.index(), 28);
        assert_eq!(rating.deficiency(), 15.543);
    }
}
