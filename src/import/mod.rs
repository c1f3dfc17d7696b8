//! CSV import of measured transmission loss.
//!
//! Two layouts are recognised:
//!
//! - **Wide**: one specimen per row, one column per band frequency
//!   (`125`, `125Hz`, `125 Hz` or `f125`), plus an optional name column.
//! - **Long**: one measurement per row with frequency and STL columns, plus an
//!   optional specimen column used to group rows.
//!
//! ## Example
//!
//! ```rust,ignore
//! use stc_rating::import::{MeasurementImporter, MeasurementSchema};
//!
//! let schema = MeasurementSchema::builder()
//!     .name_column("wall")
//!     .value_column("tl_db")
//!     .build();
//!
//! let specimens = MeasurementImporter::new(schema).import("lab.csv")?;
//! ```

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use crate::band::FrequencyBand;
use crate::error::{Error, Result};
use crate::measurement::TransmissionLoss;

/// A named measured curve read from CSV.
#[derive(Debug, Clone, PartialEq)]
pub struct Specimen {
    /// Specimen name, or `row N` when the file has no name column.
    pub name: String,
    /// Measured transmission loss.
    pub loss: TransmissionLoss,
}

/// Column names for CSV import. Unset columns are found by common aliases.
#[derive(Debug, Clone, Default)]
pub struct MeasurementSchema {
    /// Column name for the specimen identifier.
    pub name_column: Option<String>,
    /// Column name for frequency (long layout).
    pub frequency_column: Option<String>,
    /// Column name for transmission loss (long layout).
    pub value_column: Option<String>,
}

impl MeasurementSchema {
    /// Create a schema builder.
    #[must_use]
    pub fn builder() -> MeasurementSchemaBuilder {
        MeasurementSchemaBuilder::default()
    }

    /// Create a schema that auto-detects columns from common names.
    #[must_use]
    pub fn auto_detect() -> Self {
        Self::default()
    }

    fn find_column(headers: &[&str], primary: Option<&str>, aliases: &[&str]) -> Option<usize> {
        if let Some(name) = primary {
            if let Some(idx) = find_header_index(headers, name) {
                return Some(idx);
            }
        }

        aliases
            .iter()
            .find_map(|alias| find_header_index(headers, alias))
    }
}

/// Builder for [`MeasurementSchema`].
#[derive(Debug, Default)]
pub struct MeasurementSchemaBuilder {
    schema: MeasurementSchema,
}

impl MeasurementSchemaBuilder {
    /// Set the specimen name column.
    #[must_use]
    pub fn name_column(mut self, name: impl Into<String>) -> Self {
        self.schema.name_column = Some(name.into());
        self
    }

    /// Set the frequency column (long layout).
    #[must_use]
    pub fn frequency_column(mut self, name: impl Into<String>) -> Self {
        self.schema.frequency_column = Some(name.into());
        self
    }

    /// Set the transmission loss column (long layout).
    #[must_use]
    pub fn value_column(mut self, name: impl Into<String>) -> Self {
        self.schema.value_column = Some(name.into());
        self
    }

    /// Build the schema.
    #[must_use]
    pub fn build(self) -> MeasurementSchema {
        self.schema
    }
}

const NAME_ALIASES: &[&str] = &["name", "specimen", "sample", "partition", "id", "label"];
const FREQUENCY_ALIASES: &[&str] = &["frequency", "freq", "frequency_hz", "hz", "f"];
const VALUE_ALIASES: &[&str] = &[
    "stl",
    "tl",
    "transmission_loss",
    "loss",
    "r",
    "value",
    "db",
];

/// CSV importer for measured curves.
pub struct MeasurementImporter {
    schema: MeasurementSchema,
    band: FrequencyBand,
}

impl MeasurementImporter {
    /// Create an importer for the ASTM E413 band.
    #[must_use]
    pub fn new(schema: MeasurementSchema) -> Self {
        Self {
            schema,
            band: FrequencyBand::astm_e413(),
        }
    }

    /// Create an importer that auto-detects columns.
    #[must_use]
    pub fn auto_detect() -> Self {
        Self::new(MeasurementSchema::auto_detect())
    }

    /// Use a non-standard band for wide-layout column matching.
    #[must_use]
    pub fn with_band(mut self, band: FrequencyBand) -> Self {
        self.band = band;
        self
    }

    /// Import specimens from a CSV file.
    pub fn import(&self, path: impl AsRef<Path>) -> Result<Vec<Specimen>> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let specimens = self.import_reader(file)?;
        log::info!("Imported {} specimens from {}", specimens.len(), path.display());
        Ok(specimens)
    }

    /// Import specimens from any CSV source.
    pub fn import_reader<R: Read>(&self, source: R) -> Result<Vec<Specimen>> {
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(source);

        let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();
        let header_refs: Vec<&str> = headers.iter().map(String::as_str).collect();

        let name_idx = MeasurementSchema::find_column(
            &header_refs,
            self.schema.name_column.as_deref(),
            NAME_ALIASES,
        );

        // Wide layout when every band frequency has its own column
        let band_columns: Option<Vec<usize>> = self
            .band
            .iter()
            .map(|f| {
                header_refs
                    .iter()
                    .position(|h| parse_frequency_header(h) == Some(f))
            })
            .collect();
        if let Some(columns) = band_columns {
            return self.read_wide(&mut reader, name_idx, &columns);
        }

        let frequency_idx = MeasurementSchema::find_column(
            &header_refs,
            self.schema.frequency_column.as_deref(),
            FREQUENCY_ALIASES,
        )
        .ok_or_else(|| Error::CsvImport {
            line: 1,
            reason: "Could not find band columns or a frequency column".to_string(),
        })?;

        let value_idx = MeasurementSchema::find_column(
            &header_refs,
            self.schema.value_column.as_deref(),
            VALUE_ALIASES,
        )
        .ok_or_else(|| Error::CsvImport {
            line: 1,
            reason: "Could not find a transmission loss column".to_string(),
        })?;

        self.read_long(&mut reader, name_idx, frequency_idx, value_idx)
    }

    fn read_wide<R: Read>(
        &self,
        reader: &mut csv::Reader<R>,
        name_idx: Option<usize>,
        columns: &[usize],
    ) -> Result<Vec<Specimen>> {
        let mut specimens = Vec::new();

        for (line_num, record) in reader.records().enumerate() {
            let line = line_num + 2; // +2 for 1-based and header
            let record = record.map_err(|e| Error::CsvImport {
                line,
                reason: e.to_string(),
            })?;

            if record.iter().all(str::is_empty) {
                log::warn!("Skipping empty row at line {}", line);
                continue;
            }

            let mut loss = TransmissionLoss::default();
            for (frequency, &idx) in self.band.iter().zip(columns) {
                let cell = record.get(idx).unwrap_or("");
                loss.insert(frequency, parse_value(cell, line, frequency)?);
            }

            specimens.push(Specimen {
                name: specimen_name(&record, name_idx, line),
                loss,
            });
        }

        Ok(specimens)
    }

    fn read_long<R: Read>(
        &self,
        reader: &mut csv::Reader<R>,
        name_idx: Option<usize>,
        frequency_idx: usize,
        value_idx: usize,
    ) -> Result<Vec<Specimen>> {
        let mut specimens: Vec<Specimen> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for (line_num, record) in reader.records().enumerate() {
            let line = line_num + 2;
            let record = record.map_err(|e| Error::CsvImport {
                line,
                reason: e.to_string(),
            })?;

            if record.iter().all(str::is_empty) {
                log::warn!("Skipping empty row at line {}", line);
                continue;
            }

            let frequency_cell = record.get(frequency_idx).unwrap_or("");
            let frequency = parse_frequency_header(frequency_cell).ok_or_else(|| Error::CsvImport {
                line,
                reason: format!("invalid frequency '{}'", frequency_cell),
            })?;
            let value = parse_value(record.get(value_idx).unwrap_or(""), line, frequency)?;

            let name = name_idx
                .and_then(|i| record.get(i))
                .filter(|s| !s.is_empty())
                .unwrap_or("specimen")
                .to_string();

            let position = *positions.entry(name.clone()).or_insert_with(|| {
                specimens.push(Specimen {
                    name,
                    loss: TransmissionLoss::default(),
                });
                specimens.len() - 1
            });

            if specimens[position].loss.insert(frequency, value).is_some() {
                return Err(Error::CsvImport {
                    line,
                    reason: format!(
                        "duplicate {} Hz value for '{}'",
                        frequency, specimens[position].name
                    ),
                });
            }
        }

        Ok(specimens)
    }
}

fn specimen_name(record: &csv::StringRecord, name_idx: Option<usize>, line: usize) -> String {
    name_idx
        .and_then(|i| record.get(i))
        .filter(|s| !s.is_empty())
        .map(String::from)
        .unwrap_or_else(|| format!("row {}", line))
}

fn parse_value(cell: &str, line: usize, frequency: u32) -> Result<f64> {
    cell.parse().map_err(|_| Error::CsvImport {
        line,
        reason: format!("invalid transmission loss '{}' at {} Hz", cell, frequency),
    })
}

/// Parse a frequency from headers or cells like `125`, `125Hz`, `125 Hz`, `f125`, `125.0`.
fn parse_frequency_header(text: &str) -> Option<u32> {
    let lower = text.trim().to_lowercase();
    let digits = lower
        .strip_suffix("hz")
        .unwrap_or(&lower)
        .trim()
        .trim_start_matches('f')
        .trim();

    if let Ok(value) = digits.parse::<u32>() {
        return Some(value);
    }
    let value: f64 = digits.parse().ok()?;
    (value.fract() == 0.0 && value > 0.0 && value <= f64::from(u32::MAX)).then_some(value as u32)
}

/// Find a header index by name (case-insensitive).
fn find_header_index(headers: &[&str], name: &str) -> Option<usize> {
    let name_lower = name.to_lowercase();
    headers.iter().position(|h| h.to_lowercase() == name_lower)
}
