//! Error types for building a Sheets source.
//!
//! Request-time failures are reported as
//! [`SourceError`](intake_ledger_store::SourceError) so the record store can
//! treat every backend alike; this type only covers construction.

use thiserror::Error;

/// Errors that can occur while constructing a [`SheetsSource`](crate::SheetsSource).
#[derive(Debug, Error)]
pub enum SheetsError {
    /// The configured API endpoint is not an absolute http(s) URL.
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl {
        /// URL as configured.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// No spreadsheet id was configured.
    #[error("spreadsheet id is empty")]
    MissingSpreadsheetId,

    /// The HTTP client could not be built (TLS backend, ...).
    #[error("HTTP client error: {0}")]
    ClientError(#[from] reqwest::Error),
}

/// Convenience alias for results with [`SheetsError`].
pub type Result<T> = std::result::Result<T, SheetsError>;
