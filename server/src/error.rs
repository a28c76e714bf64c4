use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use intake_ledger_core::ValidationError;
use intake_ledger_sheets::SheetsError;
use intake_ledger_store::{ConfigError, StoreError};
use serde_json::json;
use thiserror::Error;
use tracing::warn;

/// Request failures, rendered as `{"error": "..."}` with a matching status.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Malformed id: {0}")]
    MalformedId(String),

    #[error("Invalid submission: {}", join(.0))]
    Validation(Vec<ValidationError>),

    #[error("Unauthorized: {0}")]
    Unauthorized(&'static str),

    #[error(transparent)]
    Store(#[from] StoreError),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MalformedPayload(_) | AppError::MalformedId(_) | AppError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Store(StoreError::NotFound { .. }) => StatusCode::NOT_FOUND,
            AppError::Store(StoreError::StoreUnavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!("{self}");
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Startup failures.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Sheets(#[from] SheetsError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
