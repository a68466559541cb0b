//! Error types for reefer-hub

use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration not found")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Unknown timezone: {0}")]
    InvalidTimezone(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Unreadable or unsupported spreadsheet file
    #[error("Spreadsheet read error: {0}")]
    Spreadsheet(String),

    #[error("Excel export error: {0}")]
    Excel(String),

    /// No row of the sheet holds the required key column
    #[error("Header '{keyword}' not found in {source_name}")]
    HeaderNotFound {
        keyword: String,
        source_name: String,
    },

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Monitor history error: {0}")]
    Persistence(String),

    #[error("No report rows with a container id were found")]
    NoReportData,

    #[error("No monitor sheet contains the unit column")]
    NoMonitorData,
}

pub type Result<T> = std::result::Result<T, Error>;
