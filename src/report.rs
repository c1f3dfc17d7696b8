//! Report types for rating results.
//!
//! Reports can be serialized to JSON individually or written as a CSV table
//! with one row per rated specimen.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::band::FrequencyBand;
use crate::error::{Error, Result};
use crate::measurement::TransmissionLoss;
use crate::rating::Rating;

/// A rated specimen together with its measurement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingReport {
    /// Specimen name or identifier.
    pub name: String,

    /// Measured transmission loss.
    pub measured: TransmissionLoss,

    /// Rating result.
    pub rating: Rating,

    /// When this report was generated.
    #[serde(with = "chrono_serde")]
    pub generated_at: chrono::DateTime<chrono::Utc>,
}

impl RatingReport {
    /// Create a new report stamped with the current time.
    #[must_use]
    pub fn new(name: impl Into<String>, measured: TransmissionLoss, rating: Rating) -> Self {
        Self {
            name: name.into(),
            measured,
            rating,
            generated_at: chrono::Utc::now(),
        }
    }

    /// Write the report as pretty-printed JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("Wrote rating report to {}", path.display());
        Ok(())
    }

    /// Load a report previously written with [`RatingReport::write_json`].
    pub fn read_json(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Write reports as CSV: name, index, deficiency, then one delta column per band frequency.
pub fn write_csv(
    reports: &[RatingReport],
    band: &FrequencyBand,
    path: impl AsRef<Path>,
) -> Result<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)?;

    let mut header = vec![
        "name".to_string(),
        "stc".to_string(),
        "deficiency".to_string(),
    ];
    header.extend(band.iter().map(|f| format!("delta_{f}")));
    writer.write_record(&header)?;

    for report in reports {
        let mut row = vec![
            report.name.clone(),
            report.rating.index().to_string(),
            report.rating.deficiency().to_string(),
        ];
        for frequency in band.iter() {
            let delta = report.rating.delta().get(&frequency).ok_or_else(|| {
                Error::Report(format!(
                    "{}: no delta at {} Hz for this band",
                    report.name, frequency
                ))
            })?;
            row.push(delta.to_string());
        }
        writer.write_record(&row)?;
    }

    writer.flush()?;
    log::info!("Wrote {} ratings to {}", reports.len(), path.display());
    Ok(())
}

mod chrono_serde {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        dt.to_rfc3339().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::RatingEngine;

    fn sample_report(name: &str, level: f64) -> RatingReport {
        let measured: TransmissionLoss =
            FrequencyBand::astm_e413().iter().map(|f| (f, level)).collect();
        let rating = RatingEngine::astm_e413().evaluate(&measured).unwrap();
        RatingReport::new(name, measured, rating)
    }

    #[test]
    fn test_json_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let report = sample_report("gypsum wall", 45.0);
        report.write_json(&path).unwrap();

        let loaded = RatingReport::read_json(&path).unwrap();
        assert_eq!(loaded.name, "gypsum wall");
        assert_eq!(loaded.rating, report.rating);
        assert_eq!(loaded.measured, report.measured);
        assert_eq!(loaded.generated_at.timestamp(), report.generated_at.timestamp());
    }

    #[test]
    fn test_csv_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ratings.csv");
        let band = FrequencyBand::astm_e413();
        let reports = vec![sample_report("a", 40.0), sample_report("b", 55.0)];
        write_csv(&reports, &band, &path).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.len(), 3 + 16);
        assert_eq!(&headers[1], "stc");
        assert_eq!(&headers[3], "delta_125");

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[1][0], "b");
        assert_eq!(rows[0][1].parse::<usize>().unwrap(), reports[0].rating.index());
    }
}
