use std::path::PathBuf;
use thiserror::Error;

/// Result type for bidskit operations
pub type Result<T> = std::result::Result<T, BidsError>;

/// Error types for bidskit operations
#[derive(Error, Debug)]
pub enum BidsError {
    /// Missing or malformed scan configuration
    #[error("Config error: {0}")]
    ConfigError(String),

    /// An expected input file is absent
    #[error("Missing input: {}", .0.display())]
    MissingInput(PathBuf),

    /// Invalid command-line or caller-supplied argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// JSON parse or serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// CSV report error
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Invalid description pattern
    #[error("Pattern error: {0}")]
    RegexError(#[from] regex::Error),

    /// DICOM reading error
    #[error("DICOM error: {0}")]
    DicomError(String),

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<dicom_object::ReadError> for BidsError {
    fn from(e: dicom_object::ReadError) -> Self {
        BidsError::DicomError(format!("{}", e))
    }
}

impl From<walkdir::Error> for BidsError {
    fn from(e: walkdir::Error) -> Self {
        BidsError::IoError(e.into())
    }
}
