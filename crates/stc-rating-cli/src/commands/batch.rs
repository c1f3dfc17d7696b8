//! Batch rating command.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use stc_rating::RatingEngine;
use stc_rating::import::{MeasurementImporter, MeasurementSchema};
use stc_rating::report::{self, RatingReport};

pub fn run(
    engine: &RatingEngine,
    input: PathBuf,
    output: Option<PathBuf>,
    name_col: Option<String>,
    frequency_col: Option<String>,
    value_col: Option<String>,
) -> Result<()> {
    log::info!("Importing specimens from: {}", input.display());

    let mut schema = MeasurementSchema::builder();
    if let Some(col) = name_col {
        schema = schema.name_column(col);
    }
    if let Some(col) = frequency_col {
        schema = schema.frequency_column(col);
    }
    if let Some(col) = value_col {
        schema = schema.value_column(col);
    }

    let band = &engine.config().band;
    let specimens = MeasurementImporter::new(schema.build())
        .with_band(band.clone())
        .import(&input)
        .with_context(|| format!("Failed to import CSV from {}", input.display()))?;

    if specimens.is_empty() {
        bail!("No specimens found in {}", input.display());
    }

    let curves: Vec<_> = specimens.iter().map(|s| s.loss.clone()).collect();
    let results = engine.evaluate_batch(&curves);

    println!("{:<30} {:>8} {:>12}", "Specimen", "STC", "Deficiency");
    println!("{:-<52}", "");

    let mut reports = Vec::with_capacity(specimens.len());
    let mut failed = 0;
    for (specimen, result) in specimens.into_iter().zip(results) {
        let chars = specimen.name.chars().count();
        let name = if chars > 28 {
            let tail: String = specimen.name.chars().skip(chars - 25).collect();
            format!("...{}", tail)
        } else {
            specimen.name.clone()
        };

        match result {
            Ok(rating) => {
                println!("{:<30} {:>8} {:>12}", name, rating.index(), rating.deficiency());
                reports.push(RatingReport::new(specimen.name, specimen.loss, rating));
            }
            Err(e) => {
                println!("{:<30} {:>8} {}", name, "-", e);
                failed += 1;
            }
        }
    }

    if let Some(path) = &output {
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        if is_json {
            let json = serde_json::to_string_pretty(&reports)?;
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        } else {
            report::write_csv(&reports, band, path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        println!();
        println!("Wrote {} ratings to {}", reports.len(), path.display());
    }

    if failed > 0 {
        bail!("{} of {} specimens could not be rated", failed, failed + reports.len());
    }

    Ok(())
}
