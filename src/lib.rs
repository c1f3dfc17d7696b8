//! # stc-rating
//!
//! Sound Transmission Class (STC) rating of a partition from one-third-octave
//! sound transmission loss, following the ASTM E413 reference-contour method.
//!
//! The measured curve is compared against a family of 150 reference contours.
//! The rating is the highest contour index whose summed shortfall is at most
//! 32 dB and whose largest single shortfall is below 8 dB.
//!
//! ## Quick Start
//!
//! ```rust
//! use stc_rating::{FrequencyBand, RatingEngine, TransmissionLoss};
//!
//! let stl = TransmissionLoss::from_ordered(
//!     &FrequencyBand::astm_e413(),
//!     &[
//!         22.49669, 27.85324, 32.77704, 46.30192, 52.32415, 58.54912, 64.36372, 70.38595,
//!         76.61092, 82.80217, 87.39175, 92.54538, 97.27899, 70.36132, 77.44058, 84.8613,
//!     ],
//! )?;
//!
//! let rating = RatingEngine::astm_e413().evaluate(&stl)?;
//! assert_eq!(rating.label(), "STC 46");
//! # Ok::<(), stc_rating::Error>(())
//! ```
//!
//! ## Modules
//!
//! - [`error`]: Error types for the library
//! - [`band`]: The rated frequency band and contour offsets
//! - [`contour`]: Reference contour table
//! - [`measurement`]: Measured transmission loss curves
//! - [`rating`]: Rating engine and configuration
//! - [`report`]: JSON and CSV reports
//! - [`import`]: CSV import of measurements
//! - [`chart`]: SVG and HTML rendering of ratings

pub mod band;
#[cfg(feature = "chart")]
pub mod chart;
pub mod contour;
pub mod error;
pub mod import;
pub mod measurement;
pub mod rating;
pub mod report;

// Re-export commonly used types
pub use band::FrequencyBand;
#[cfg(feature = "chart")]
pub use chart::{ChartConfig, HtmlChart, RatingPlot, Render, SvgChart};
pub use contour::{BandCurve, ContourTable};
pub use error::{Error, Result};
pub use import::{MeasurementImporter, MeasurementSchema, Specimen};
pub use measurement::TransmissionLoss;
pub use rating::{Candidate, Rating, RatingConfig, RatingEngine};
pub use report::RatingReport;
