//! Google Sheets backend for the intake ledger.
//!
//! [`SheetsSource`] implements
//! [`TabularSource`](intake_ledger_store::TabularSource) over the Sheets v4
//! values API:
//!
//! - **read**: `GET /v4/spreadsheets/{id}/values/{range}`
//! - **append**: `POST /v4/spreadsheets/{id}/values/{range}:append` with
//!   `valueInputOption=RAW` and `insertDataOption=INSERT_ROWS`
//!
//! Writes are stored verbatim (`RAW`), so a phone number such as
//! `010-1234` is never reinterpreted as a formula or a date.
//!
//! # Quick start
//!
//! ```no_run
//! use intake_ledger_core::{Credential, intake_v3};
//! use intake_ledger_sheets::SheetsSource;
//! use intake_ledger_store::{IntakeConfig, RecordStore};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = IntakeConfig::load("intake.yml")?;
//! let source = SheetsSource::from_config(&config.source)?;
//! let store = RecordStore::new(source, intake_v3(), config.source.sheet.as_deref());
//!
//! let credential = Credential::BearerToken("ya29...".into());
//! for record in store.list_records(&credential).await? {
//!     println!("{} {:?}", record.id, record.get("name"));
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
pub mod wire;

pub use client::SheetsSource;
pub use error::{Result, SheetsError};
