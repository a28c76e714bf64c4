//! JSON bodies of the Sheets v4 values API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use intake_ledger_store::Rows;

/// `ValueRange` resource, as returned by `values.get` and sent to
/// `values.append`.
///
/// The API omits `values` entirely for an empty range.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    /// A1 range the values cover.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    /// `ROWS` or `COLUMNS`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major_dimension: Option<String>,
    /// Cell values, row-major.
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

impl ValueRange {
    /// Builds a single-row body for `values.append`.
    pub fn single_row(range: String, row: Vec<String>) -> Self {
        Self {
            range: Some(range),
            major_dimension: Some("ROWS".to_string()),
            values: vec![row.into_iter().map(Value::String).collect()],
        }
    }

    /// Converts every cell to its string form.
    pub fn into_rows(self) -> Rows {
        self.values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect()
    }
}

/// Renders one cell as a string.
///
/// Formatted reads return strings already; unformatted ones may carry
/// numbers and booleans, which are rendered the way the sheet shows them.
pub fn cell_to_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        Value::Bool(true) => "TRUE".to_string(),
        Value::Bool(false) => "FALSE".to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Google API error envelope: `{"error": {"code", "message", "status"}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
    /// Error details.
    pub error: ErrorBody,
}

/// Body of an [`ErrorEnvelope`].
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    /// HTTP status code echoed by the API.
    #[serde(default)]
    pub code: u16,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
    /// Canonical status name such as `PERMISSION_DENIED`.
    #[serde(default)]
    pub status: Option<String>,
}

/// Extracts a message from an error response body, falling back to the raw
/// text when it is not a Google error envelope.
pub fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => match envelope.error.status {
            Some(status) if !status.is_empty() => {
                format!("{status}: {}", envelope.error.message)
            }
            _ => envelope.error.message,
        },
        Err(_) => body.trim().to_string(),
    }
}
