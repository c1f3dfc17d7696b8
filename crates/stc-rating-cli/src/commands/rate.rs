//! Single-curve rating command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use stc_rating::chart::{self, ChartConfig, HtmlChart, RatingPlot, Render, SvgChart};
use stc_rating::{FrequencyBand, MeasurementImporter, RatingEngine, RatingReport, TransmissionLoss};

use crate::ChartFormat;

pub struct RateArgs {
    pub values: Vec<f64>,
    pub input: Option<PathBuf>,
    pub name: String,
    pub json: bool,
    pub output: Option<PathBuf>,
    pub export: Option<PathBuf>,
    pub format: Option<ChartFormat>,
    pub width: u32,
    pub height: u32,
}

pub fn run(engine: &RatingEngine, args: RateArgs) -> Result<()> {
    let band = &engine.config().band;

    let measured = match &args.input {
        Some(path) => load_curve(path, band)?,
        None if args.values.is_empty() => {
            bail!("Provide {} STL values or --input <file>", band.len())
        }
        None => TransmissionLoss::from_ordered(band, &args.values)
            .context("STL values must be listed in band order")?,
    };

    let rating = engine
        .evaluate(&measured)
        .with_context(|| format!("Failed to rate '{}'", args.name))?;
    let report = RatingReport::new(args.name, measured, rating);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_rating(&report, band);
    }

    if let Some(path) = &args.output {
        report
            .write_json(path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    if let Some(path) = &args.export {
        let format = args.format.unwrap_or_else(|| format_for(path));
        let config = ChartConfig::new(format!("Sound Transmission Class (STC) - {}", report.name))
            .with_dimensions(args.width, args.height);
        let renderer: Box<dyn Render> = match format {
            ChartFormat::Svg => Box::new(SvgChart::new(config)),
            ChartFormat::Html => Box::new(HtmlChart::new(config)),
        };
        let plot = RatingPlot::new(&report.rating, &report.measured)?;
        chart::export(renderer.as_ref(), &plot, path)
            .with_context(|| format!("Failed to export chart to {}", path.display()))?;
        if !args.json {
            println!();
            println!("Chart written to {}", path.display());
        }
    }

    Ok(())
}

fn print_rating(report: &RatingReport, band: &FrequencyBand) {
    let rating = &report.rating;
    println!("{}: {} (deficiency {} dB)", report.name, rating.label(), rating.deficiency());
    println!();
    println!("{:>10} {:>10} {:>10} {:>10}", "Freq (Hz)", "STL", "Contour", "Delta");
    println!("{:-<44}", "");
    for frequency in band.iter() {
        let stl = report.measured.get(frequency).unwrap_or(f64::NAN);
        let contour = rating.contour().get(&frequency).copied().unwrap_or(f64::NAN);
        let delta = rating.delta().get(&frequency).copied().unwrap_or(f64::NAN);
        println!("{:>10} {:>10.3} {:>10.0} {:>10.3}", frequency, stl, contour, delta);
    }
}

fn format_for(path: &Path) -> ChartFormat {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm") => {
            ChartFormat::Html
        }
        _ => ChartFormat::Svg,
    }
}

/// Load a curve from JSON (frequency map or ordered array) or CSV.
fn load_curve(path: &Path, band: &FrequencyBand) -> Result<TransmissionLoss> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    if let Ok(curve) = serde_json::from_str::<TransmissionLoss>(&content) {
        return Ok(curve);
    }
    if let Ok(values) = serde_json::from_str::<Vec<f64>>(&content) {
        return TransmissionLoss::from_ordered(band, &values)
            .with_context(|| format!("Invalid STL array in {}", path.display()));
    }

    let specimens = MeasurementImporter::auto_detect()
        .with_band(band.clone())
        .import(path)
        .with_context(|| format!("Failed to parse {} as JSON or CSV", path.display()))?;
    if specimens.len() > 1 {
        log::warn!(
            "{} contains {} specimens, rating only '{}' (use `batch` for all)",
            path.display(),
            specimens.len(),
            specimens[0].name
        );
    }
    specimens
        .into_iter()
        .next()
        .map(|s| s.loss)
        .with_context(|| format!("No measurements found in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_for_extension() {
        assert_eq!(format_for(Path::new("out.svg")), ChartFormat::Svg);
        assert_eq!(format_for(Path::new("out.HTML")), ChartFormat::Html);
        assert_eq!(format_for(Path::new("out")), ChartFormat::Svg);
    }

    #[test]
    fn test_load_curve_json_variants() {
        let dir = tempfile::tempdir().unwrap();
        let band = FrequencyBand::astm_e413();

        let array = dir.path().join("array.json");
        std::fs::write(&array, serde_json::to_string(&vec![30.0; 16]).unwrap()).unwrap();
        assert_eq!(load_curve(&array, &band).unwrap().len(), 16);

        let map = dir.path().join("map.json");
        std::fs::write(&map, r#"{"125": 20.0, "160": 21.5}"#).unwrap();
        assert_eq!(load_curve(&map, &band).unwrap().get(160), Some(21.5));

        let short = dir.path().join("short.json");
        std::fs::write(&short, "[1.0, 2.0]").unwrap();
        assert!(load_curve(&short, &band).is_err());
    }
}
