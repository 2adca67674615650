//! Error types for report generation

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading inputs or producing report artifacts
#[derive(Debug, Error)]
pub enum ReportError {
    /// Input file missing or unreadable
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input file is not valid JSON or does not match the expected shape
    #[error("Invalid JSON in {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Output artifact could not be written
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Output directory could not be created
    #[error("Failed to create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Trend timestamp is not ISO-8601
    #[error("Invalid trend timestamp: {0:?}")]
    InvalidTimestamp(String),

    /// SVG could not be rasterized
    #[error("Chart rendering failed: {0}")]
    ChartRender(String),

    /// Built without the `charts` feature
    #[error("Chart rendering not available. Rebuild with: cargo build --features charts")]
    ChartsUnavailable,
}

impl ReportError {
    /// Whether the run can continue without the chart image
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ReportError::ChartsUnavailable)
    }
}
