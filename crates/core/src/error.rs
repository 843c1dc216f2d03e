//! Error types for approval deck generation.
//!
//! Only fatal conditions are represented here. Field- and record-level
//! problems are absorbed where they happen and tallied in
//! [`RunSummary`](crate::RunSummary).

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a generation run.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to open, read or write a file.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The tabular input could not be parsed.
    #[error("CSV error: {0}")]
    CsvError(String),

    /// The name lookup table could not be loaded.
    #[error("Name lookup table unavailable: {0}")]
    LookupTableMissing(String),

    /// The template does not provide a layout the report needs.
    #[error("Layout not found in template: {0}")]
    LayoutNotFound(String),

    /// The template presentation is unreadable or structurally broken.
    #[error("Invalid template: {0}")]
    TemplateError(String),

    /// The report configuration violates one of its invariants.
    #[error("Invalid report configuration: {0}")]
    ConfigError(String),

    /// ZIP archive error (for PPTX).
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML parsing or writing error (for PPTX).
    #[error("XML error: {0}")]
    XmlError(String),
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::CsvError(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ConfigError(err.to_string())
    }
}
