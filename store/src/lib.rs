//! Record store over a remote rectangular table.
//!
//! This crate turns rows of a remote table into keyed records:
//!
//! - [`TabularSource`]: the outbound contract (read a column range, append
//!   one row atomically).
//! - [`RecordStore`]: list, get-by-id and append over any source.
//! - [`decode_row`] / [`encode_row`]: schema-driven row conversion.
//! - [`MemorySource`]: in-process source for tests and local runs.
//! - [`IntakeConfig`]: YAML configuration with environment overrides.
//!
//! # Example
//!
//! ```
//! use intake_ledger_core::{Credential, intake_v1};
//! use intake_ledger_store::{MemorySource, RecordStore, StoreError};
//!
//! # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! # rt.block_on(async {
//! let source = MemorySource::with_header(["name", "phone", "date"]);
//! source.push_row(["Kim", "010-1234", "2024-01-01", "fair", "dry", "oily skin"]);
//!
//! let store = RecordStore::new(source, intake_v1(), None);
//! let credential = Credential::ApiKey("key".into());
//!
//! let record = store.get_record(&credential, 1).await.unwrap();
//! assert_eq!(record.get("skinType"), Some("dry"));
//!
//! let missing = store.get_record(&credential, 2).await;
//! assert!(matches!(missing, Err(StoreError::NotFound { id: 2 })));
//! # });
//! ```

mod codec;
mod config;
mod error;
mod memory;
mod record_store;
mod source;

pub use codec::{decode_row, encode_row};
pub use config::{
    DEFAULT_BASE_URL, ENV_ACCESS_TOKEN, ENV_API_KEY, ENV_PORT, ENV_SPREADSHEET_ID, IntakeConfig,
    SchemaConfig, ServerConfig, SourceConfig, credential_from, credential_from_env,
};
pub use error::{ConfigError, Result, SourceError, StoreError};
pub use memory::MemorySource;
pub use record_store::RecordStore;
pub use source::{Rows, TabularSource};
