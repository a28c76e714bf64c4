//! Core schema, record and validation types for the intake ledger.
//!
//! The intake ledger keeps survey submissions as rows of a remote
//! spreadsheet. This crate holds everything about that layout that does not
//! touch the network:
//!
//! - [`RecordSchema`] / [`FieldSchema`]: versioned key-to-column tables.
//! - [`Record`]: one decoded row with its positional id.
//! - [`ColumnRange`]: A1-style whole-column addresses.
//! - [`Credential`]: authorization passed explicitly into each remote call.
//! - [`SchemaCatalog`]: the built-in layouts (`v1`, `v2`, `v3`).
//!
//! Validation ([`validate_schema`], [`validate_submission`]) and evolution
//! checks ([`check_evolution`]) guard the contract between write time and
//! read time.
//!
//! # Example
//!
//! ```
//! use intake_ledger_core::*;
//!
//! let schema = RecordSchema::new("custom")
//!     .with_field(FieldSchema::new("name", 0).required())
//!     .with_field(FieldSchema::new("concerns", 5));
//!
//! assert!(validate_schema(&schema).is_empty());
//! assert_eq!(schema.column_range(None).to_string(), "A:F");
//!
//! let v3 = SchemaCatalog::builtin().get("v3").cloned().unwrap();
//! assert!(check_evolution(&intake_v2(), &v3).is_empty());
//! ```

mod browse;
mod catalog;
mod credential;
mod evolve;
mod range;
mod submission;
mod types;
mod validate;

pub use browse::{RecordSummary, matches_query};
pub use catalog::{LATEST_VERSION, SchemaCatalog, intake_v1, intake_v2, intake_v3};
pub use credential::Credential;
pub use evolve::{EvolutionIssue, check_evolution, is_additive};
pub use range::{ColumnRange, MAX_COLUMN, column_letters, parse_column_letters};
pub use submission::Submission;
pub use types::*;
pub use validate::{ValidationError, validate_schema, validate_submission};
