//! Error types for stc-rating operations.

use thiserror::Error;

/// Result type alias for stc-rating operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while rating a partition.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Measurement set does not match the frequency band.
    #[error("Invalid input: {reason}")]
    InvalidInput {
        /// What was wrong with the measurements.
        reason: String,
    },

    /// No reference contour satisfies both deviation ceilings.
    #[error("No compliant reference contour among {candidates} candidates")]
    NoCompliantContour {
        /// Number of contours that were evaluated.
        candidates: usize,
    },

    /// Rating configuration is inconsistent.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Error importing CSV data.
    #[error("CSV import error at line {line}: {reason}")]
    CsvImport {
        /// Line number where the error occurred.
        line: usize,
        /// Reason for the failure.
        reason: String,
    },

    /// Error writing report or chart files.
    #[error("Report error: {0}")]
    Report(String),

    /// I/O error wrapper.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    pub(crate) fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }
}
