//! Schema and submission validation.
//!
//! Schema validation catches layouts that would make reads or appends
//! ambiguous (duplicate keys, two keys on one column). Submission validation
//! belongs to the form-collection layer; the record store itself never
//! validates what it writes.
//!
//! # Examples
//!
//! ```
//! use intake_ledger_core::*;
//!
//! let schema = RecordSchema::new("v1")
//!     .with_field(FieldSchema::new("name", 0))
//!     .with_field(FieldSchema::new("phone", 1));
//! assert!(validate_schema(&schema).is_empty());
//!
//! // Two keys on the same column
//! let bad = schema.clone().with_field(FieldSchema::new("mobile", 1));
//! assert_eq!(
//!     validate_schema(&bad),
//!     vec![ValidationError::DuplicateColumn {
//!         column: 1,
//!         first: "phone".into(),
//!         second: "mobile".into(),
//!     }]
//! );
//! ```

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::{FieldValues, ID_FIELD, MAX_COLUMN, RecordSchema};

/// Schema and submission validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Schema version tag is empty or whitespace-only.
    #[error("schema version cannot be empty")]
    EmptyVersion,
    /// Schema declares no fields.
    #[error("schema must declare at least one field")]
    NoFields,
    /// A field key is empty or whitespace-only.
    #[error("field key cannot be empty (column {0})")]
    EmptyFieldKey(usize),
    /// Two fields share a key.
    #[error("duplicate field key: {0}")]
    DuplicateFieldKey(String),
    /// Two fields are mapped to the same column.
    #[error("column {column} is assigned to both '{first}' and '{second}'")]
    DuplicateColumn {
        /// Contested column index.
        column: usize,
        /// Key that claimed the column first.
        first: String,
        /// Key that claimed it again.
        second: String,
    },
    /// A field uses a key that records already serialize for their id.
    #[error("field key '{0}' is reserved for the record id")]
    ReservedFieldKey(String),
    /// A field sits beyond the last column a sheet can address.
    #[error("field '{key}' column {column} is beyond the last sheet column ({max})", max = MAX_COLUMN)]
    ColumnOutOfRange {
        /// Offending key.
        key: String,
        /// Requested column index.
        column: usize,
    },
    /// A required submission field is missing or blank.
    #[error("required field is missing: {0}")]
    MissingRequiredField(String),
}

/// Validates a record schema, returning every problem found.
pub fn validate_schema(schema: &RecordSchema) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if schema.version.trim().is_empty() {
        errors.push(ValidationError::EmptyVersion);
    }
    if schema.fields.is_empty() {
        errors.push(ValidationError::NoFields);
        return errors;
    }

    let mut seen_keys: HashSet<&str> = HashSet::new();
    let mut columns: HashMap<usize, &str> = HashMap::new();

    for field in &schema.fields {
        let key = field.key.trim();
        if key.is_empty() {
            errors.push(ValidationError::EmptyFieldKey(field.column));
            continue;
        }
        if key == ID_FIELD {
            errors.push(ValidationError::ReservedFieldKey(key.to_string()));
        }
        if !seen_keys.insert(key) {
            errors.push(ValidationError::DuplicateFieldKey(key.to_string()));
        }
        if field.column > MAX_COLUMN {
            errors.push(ValidationError::ColumnOutOfRange {
                key: key.to_string(),
                column: field.column,
            });
            continue;
        }
        match columns.entry(field.column) {
            Entry::Occupied(owner) => errors.push(ValidationError::DuplicateColumn {
                column: field.column,
                first: owner.get().to_string(),
                second: key.to_string(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(key);
            }
        }
    }

    errors
}

/// Checks that every required field of `schema` has a non-blank value.
///
/// Returns one [`ValidationError::MissingRequiredField`] per offending key,
/// in schema order. Keys the schema does not know are ignored.
///
/// # Examples
///
/// ```
/// use intake_ledger_core::*;
///
/// let schema = RecordSchema::new("v1")
///     .with_field(FieldSchema::new("name", 0).required())
///     .with_field(FieldSchema::new("notes", 1));
///
/// let mut fields = FieldValues::new();
/// fields.insert("name".into(), "   ".into());
///
/// assert_eq!(
///     validate_submission(&schema, &fields),
///     vec![ValidationError::MissingRequiredField("name".into())]
/// );
/// ```
pub fn validate_submission(schema: &RecordSchema, fields: &FieldValues) -> Vec<ValidationError> {
    schema
        .fields
        .iter()
        .filter(|field| field.required)
        .filter(|field| {
            fields
                .get(&field.key)
                .is_none_or(|value| value.trim().is_empty())
        })
        .map(|field| ValidationError::MissingRequiredField(field.key.clone()))
        .collect()
}
