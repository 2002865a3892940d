//! Error types for the chatwoot-reporting library.
//!
//! Infrastructure failures (`Database`, `Connection`) are subject to the
//! accessor's [`FailurePolicy`](crate::db::FailurePolicy). Argument contract
//! violations (`InvalidArgument`) always reach the caller.

use thiserror::Error;

/// Errors that can occur while producing reports.
#[derive(Error, Debug)]
pub enum ReportError {
    /// Statement preparation or execution failed
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The connection could not be opened
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Caller supplied arguments that violate a report's contract
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// CSV rendering errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O errors while rendering tables
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReportError {
    /// True for failures caused by the store rather than by the caller.
    #[must_use]
    pub const fn is_infrastructure(&self) -> bool {
        matches!(self, Self::Database(_) | Self::Connection(_))
    }
}

/// Convenience type alias for Result with ReportError
pub type Result<T> = std::result::Result<T, ReportError>;
