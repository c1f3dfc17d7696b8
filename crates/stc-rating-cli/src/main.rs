//! stc-rating CLI - Sound Transmission Class rating tool

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use stc_rating::{RatingConfig, RatingEngine};

mod commands;

/// Rate partitions by Sound Transmission Class (ASTM E413).
#[derive(Parser)]
#[command(name = "stc-rating")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Rating configuration (JSON) replacing the ASTM E413 constants
    #[arg(long, global = true, env = "STC_RATING_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rate one measured curve, optionally exporting a chart
    Rate {
        /// Sixteen STL values in band order (125 Hz to 4 kHz)
        #[arg(allow_negative_numbers = true)]
        values: Vec<f64>,

        /// Read the curve from a JSON or CSV file instead
        #[arg(short, long, conflicts_with = "values")]
        input: Option<PathBuf>,

        /// Specimen name used in reports
        #[arg(long, default_value = "specimen")]
        name: String,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Write the report to a JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Export a chart of the rating to this path
        #[arg(short, long)]
        export: Option<PathBuf>,

        /// Chart format (defaults to the export file extension)
        #[arg(long, value_enum)]
        format: Option<ChartFormat>,

        /// Chart width in pixels
        #[arg(long, default_value_t = 900)]
        width: u32,

        /// Chart height in pixels
        #[arg(long, default_value_t = 400)]
        height: u32,
    },

    /// Rate every specimen in a CSV file
    Batch {
        /// Input CSV (wide or long layout)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file (.csv or .json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Specimen name column
        #[arg(long)]
        name_col: Option<String>,

        /// Frequency column (long layout)
        #[arg(long)]
        frequency_col: Option<String>,

        /// Transmission loss column (long layout)
        #[arg(long)]
        value_col: Option<String>,
    },

    /// Print the reference contour table
    Contours {
        /// Show a single contour
        #[arg(long)]
        index: Option<usize>,
    },
}

/// Chart output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ChartFormat {
    /// Static SVG image
    Svg,
    /// Interactive HTML page
    Html,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let engine = build_engine(cli.config.as_ref())?;

    match cli.command {
        Commands::Rate {
            values,
            input,
            name,
            json,
            output,
            export,
            format,
            width,
            height,
        } => commands::rate::run(
            &engine,
            commands::rate::RateArgs {
                values,
                input,
                name,
                json,
                output,
                export,
                format,
                width,
                height,
            },
        ),
        Commands::Batch {
            input,
            output,
            name_col,
            frequency_col,
            value_col,
        } => commands::batch::run(&engine, input, output, name_col, frequency_col, value_col),
        Commands::Contours { index } => commands::contours::run(&engine, index),
    }
}

fn build_engine(config: Option<&PathBuf>) -> Result<RatingEngine> {
    let Some(path) = config else {
        return Ok(RatingEngine::astm_e413());
    };
    log::info!("Loading rating configuration from {}", path.display());
    let config = RatingConfig::from_json_file(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    RatingEngine::new(config).context("Invalid rating configuration")
}
