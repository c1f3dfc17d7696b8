//! Rating engine and its configuration.
//!
//! - [`engine::RatingEngine`]: fits a measured curve to the contour family
//! - [`engine::Rating`]: winning index, contour, deltas and deficiency
//! - [`config::RatingConfig`]: band, offsets and the two deviation ceilings

pub mod config;
pub mod engine;

pub use config::{RatingConfig, RatingConfigBuilder};
pub use engine::{Candidate, Rating, RatingEngine, round_to};
