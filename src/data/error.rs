use std::path::PathBuf;

use thiserror::Error;

/// Failures while reading the passenger table. All of them are fatal at startup.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The file could not be opened or read.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    /// A required column is absent from the header / schema.
    #[error("Missing required column '{0}'")]
    MissingColumn(&'static str),

    /// A cell failed validation. `row` is zero-based over data rows.
    #[error("Row {row}, column '{column}': {reason}")]
    InvalidValue {
        row: usize,
        column: &'static str,
        reason: String,
    },
}

/// Failures at the filter boundary: bad ranges and unreadable presets.
#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Invalid {field} range: min {min} is greater than max {max} or not finite")]
    InvalidRange {
        field: &'static str,
        min: f64,
        max: f64,
    },

    #[error("Failed to access filter preset {path}: {source}")]
    PresetIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed filter preset: {0}")]
    PresetJson(#[from] serde_json::Error),
}
