//! Error types for record store operations.
//!
//! Callers see two store failures: the remote source could not be used
//! ([`StoreError::StoreUnavailable`]), or the requested record does not exist
//! ([`StoreError::NotFound`]). They are kept apart so a front end can answer
//! "no such record" differently from "try again later".

use intake_ledger_core::ValidationError;
use thiserror::Error;

/// Failures reported by a [`TabularSource`](crate::TabularSource).
#[derive(Debug, Error)]
pub enum SourceError {
    /// The request never produced a response (DNS, TLS, timeout, ...).
    #[error("transport error: {0}")]
    Transport(String),

    /// The source answered with a non-success status (auth, quota, ...).
    #[error("source returned status {status}: {message}")]
    Status {
        /// HTTP-style status code.
        status: u16,
        /// Message extracted from the response.
        message: String,
    },

    /// The source answered with a body that could not be understood.
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Errors returned by [`RecordStore`](crate::RecordStore) operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The remote source failed; nothing was returned or written.
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] SourceError),

    /// No record has the requested positional id.
    #[error("record {id} not found")]
    NotFound {
        /// Requested id.
        id: i64,
    },
}

/// Errors that can occur while loading an [`IntakeConfig`](crate::IntakeConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// The configured schema version is not in the catalog.
    #[error("unknown schema version: {0}")]
    UnknownSchemaVersion(String),

    /// The `schema` section names both a version and inline fields.
    #[error("schema section must set at most one of `version` or `fields`")]
    AmbiguousSchema,

    /// The resolved schema failed validation.
    #[error("invalid schema: {}", join_errors(.0))]
    InvalidSchema(Vec<ValidationError>),

    /// A required setting is absent from both file and environment.
    #[error("missing setting: {0}")]
    MissingSetting(&'static str),

    /// An environment override could not be parsed.
    #[error("invalid value for {key}: {value}")]
    InvalidOverride {
        /// Environment variable name.
        key: &'static str,
        /// Offending value.
        value: String,
    },
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Convenience alias for results with [`StoreError`].
pub type Result<T> = std::result::Result<T, StoreError>;
