//! [`TabularSource`] backed by the Google Sheets v4 values API.

use std::time::Duration;

use intake_ledger_core::{ColumnRange, Credential};
use intake_ledger_store::{Rows, SourceConfig, SourceError, TabularSource};
use reqwest::{Client, Request, RequestBuilder, Response, Url};
use tracing::{debug, warn};

use crate::error::{Result, SheetsError};
use crate::wire::{ValueRange, error_message};

/// Sheets-backed source for one spreadsheet.
///
/// Reads use `values.get`; appends use `values.append` with
/// `insertDataOption=INSERT_ROWS`, which places the row after the last
/// non-empty row on the server in one request.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use intake_ledger_core::ColumnRange;
/// use intake_ledger_sheets::SheetsSource;
///
/// let source =
///     SheetsSource::new("https://sheets.googleapis.com", "1AbC", Duration::from_secs(5)).unwrap();
/// let range = ColumnRange::new(Some("Responses"), 0, 7);
///
/// assert_eq!(
///     source.values_url(&range).as_str(),
///     "https://sheets.googleapis.com/v4/spreadsheets/1AbC/values/Responses!A:H?majorDimension=ROWS"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct SheetsSource {
    client: Client,
    base_url: Url,
    spreadsheet_id: String,
}

impl SheetsSource {
    /// Creates a source talking to `base_url` with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`SheetsError::InvalidBaseUrl`] if `base_url` is not an
    /// absolute http(s) URL, [`SheetsError::MissingSpreadsheetId`] if
    /// `spreadsheet_id` is blank, and [`SheetsError::ClientError`] if the
    /// HTTP client cannot be built.
    pub fn new(base_url: &str, spreadsheet_id: &str, timeout: Duration) -> Result<Self> {
        let invalid = |reason: &str| SheetsError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: reason.to_string(),
        };
        let parsed = Url::parse(base_url).map_err(|e| invalid(&e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid("scheme must be http or https"));
        }
        if parsed.cannot_be_a_base() {
            return Err(invalid("URL cannot carry a path"));
        }

        let spreadsheet_id = spreadsheet_id.trim();
        if spreadsheet_id.is_empty() {
            return Err(SheetsError::MissingSpreadsheetId);
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("intake-ledger/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: parsed,
            spreadsheet_id: spreadsheet_id.to_string(),
        })
    }

    /// Creates a source from the `source` section of the configuration.
    pub fn from_config(config: &SourceConfig) -> Result<Self> {
        Self::new(
            &config.base_url,
            &config.spreadsheet_id,
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Returns the spreadsheet id.
    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    /// URL of `values.get` for `range`.
    pub fn values_url(&self, range: &ColumnRange) -> Url {
        let mut url = self.range_url(&range.to_string());
        url.query_pairs_mut().append_pair("majorDimension", "ROWS");
        url
    }

    /// URL of `values.append` for `range`.
    pub fn append_url(&self, range: &ColumnRange) -> Url {
        let mut url = self.range_url(&format!("{range}:append"));
        url.query_pairs_mut()
            .append_pair("valueInputOption", "RAW")
            .append_pair("insertDataOption", "INSERT_ROWS");
        url
    }

    /// Builds the read request without sending it.
    pub fn read_request(
        &self,
        credential: &Credential,
        range: &ColumnRange,
    ) -> std::result::Result<Request, SourceError> {
        let builder = self.client.get(self.values_url(range));
        authorize(builder, credential)
            .build()
            .map_err(|e| SourceError::Transport(e.to_string()))
    }

    /// Builds the append request without sending it.
    pub fn append_request(
        &self,
        credential: &Credential,
        range: &ColumnRange,
        row: Vec<String>,
    ) -> std::result::Result<Request, SourceError> {
        let body = ValueRange::single_row(range.to_string(), row);
        let builder = self.client.post(self.append_url(range)).json(&body);
        authorize(builder, credential)
            .build()
            .map_err(|e| SourceError::Transport(e.to_string()))
    }

    fn range_url(&self, range: &str) -> Url {
        let mut url = self.base_url.clone();
        // validated in `new`, so the base always accepts path segments
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend([
                "v4",
                "spreadsheets",
                self.spreadsheet_id.as_str(),
                "values",
                range,
            ]);
        }
        url
    }

    async fn send(&self, request: Request) -> std::result::Result<Response, SourceError> {
        let method = request.method().clone();
        let response = self.client.execute(request).await.map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            debug!(%method, %status, "sheets request succeeded");
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body);
        warn!(%method, %status, message = %message, "sheets request failed");
        Err(SourceError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

/// Attaches the credential: API keys travel as the `key` query parameter,
/// access tokens as a bearer header.
fn authorize(builder: RequestBuilder, credential: &Credential) -> RequestBuilder {
    match credential {
        Credential::ApiKey(key) => builder.query(&[("key", key.as_str())]),
        Credential::BearerToken(token) => builder.bearer_auth(token),
    }
}

fn transport_error(err: reqwest::Error) -> SourceError {
    if err.is_timeout() {
        SourceError::Transport(format!("request timed out: {err}"))
    } else {
        SourceError::Transport(err.to_string())
    }
}

impl TabularSource for SheetsSource {
    async fn read_range(
        &self,
        credential: &Credential,
        range: &ColumnRange,
    ) -> std::result::Result<Rows, SourceError> {
        let request = self.read_request(credential, range)?;
        let response = self.send(request).await?;
        let value_range: ValueRange = response
            .json()
            .await
            .map_err(|e| SourceError::Malformed(e.to_string()))?;

        let rows = value_range.into_rows();
        debug!(range = %range, rows = rows.len(), "read sheet range");
        Ok(rows)
    }

    async fn append_row(
        &self,
        credential: &Credential,
        range: &ColumnRange,
        row: Vec<String>,
    ) -> std::result::Result<(), SourceError> {
        let cells = row.len();
        let request = self.append_request(credential, range, row)?;
        self.send(request).await?;
        debug!(range = %range, cells, "appended sheet row");
        Ok(())
    }
}
