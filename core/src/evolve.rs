//! Schema evolution checks.
//!
//! Rows written under an older schema must stay decodable after the schema
//! changes. That only holds when a new version is additive by column: every
//! old key keeps its column, and new keys only claim columns the old version
//! never used.
//!
//! # Example
//!
//! ```
//! use intake_ledger_core::*;
//!
//! let old = RecordSchema::new("v2")
//!     .with_field(FieldSchema::new("name", 0))
//!     .with_field(FieldSchema::new("concerns", 5));
//!
//! let extended = old.clone().with_field(FieldSchema::new("analysis", 8));
//! assert!(check_evolution(&old, &extended).is_empty());
//!
//! let mut renumbered = extended.clone();
//! renumbered.fields[1].column = 3;
//! assert_eq!(
//!     check_evolution(&old, &renumbered),
//!     vec![EvolutionIssue::FieldMoved { key: "concerns".into(), from: 5, to: 3 }]
//! );
//! ```

use thiserror::Error;

use crate::RecordSchema;

/// A change between two schema versions that breaks decoding of old rows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvolutionIssue {
    /// A key present in the old schema is missing from the new one.
    #[error("field '{key}' (column {column}) was dropped")]
    FieldDropped {
        /// Dropped key.
        key: String,
        /// Column it used to occupy.
        column: usize,
    },
    /// A key kept its name but moved to another column.
    #[error("field '{key}' moved from column {from} to column {to}")]
    FieldMoved {
        /// Renumbered key.
        key: String,
        /// Old column.
        from: usize,
        /// New column.
        to: usize,
    },
    /// A new key took over a column the old schema assigned to another key.
    #[error("column {column} reassigned from '{old_key}' to '{new_key}'")]
    ColumnReused {
        /// Contested column.
        column: usize,
        /// Key that owned it in the old schema.
        old_key: String,
        /// Key that claims it in the new schema.
        new_key: String,
    },
}

/// Lists every non-additive change from `old` to `new`.
///
/// Issues for old keys come first (in the old schema's order), followed by
/// column reuse by new keys (in the new schema's order).
pub fn check_evolution(old: &RecordSchema, new: &RecordSchema) -> Vec<EvolutionIssue> {
    let mut issues = Vec::new();

    for field in &old.fields {
        match new.field(&field.key) {
            None => issues.push(EvolutionIssue::FieldDropped {
                key: field.key.clone(),
                column: field.column,
            }),
            Some(current) if current.column != field.column => {
                issues.push(EvolutionIssue::FieldMoved {
                    key: field.key.clone(),
                    from: field.column,
                    to: current.column,
                })
            }
            Some(_) => {}
        }
    }

    for field in &new.fields {
        if old.field(&field.key).is_some() {
            continue;
        }
        if let Some(owner) = old.fields.iter().find(|f| f.column == field.column) {
            issues.push(EvolutionIssue::ColumnReused {
                column: field.column,
                old_key: owner.key.clone(),
                new_key: field.key.clone(),
            });
        }
    }

    issues
}

/// Returns `true` if `new` only adds columns on top of `old`.
pub fn is_additive(old: &RecordSchema, new: &RecordSchema) -> bool {
    check_evolution(old, new).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FieldSchema;

    fn base() -> RecordSchema {
        RecordSchema::new("a")
            .with_field(FieldSchema::new("name", 0))
            .with_field(FieldSchema::new("phone", 1))
    }

    #[test]
    fn test_identical_schemas_are_additive() {
        assert!(is_additive(&base(), &base()));
    }

    #[test]
    fn test_dropped_field_is_reported() {
        let new = RecordSchema::new("b").with_field(FieldSchema::new("name", 0));
        assert_eq!(
            check_evolution(&base(), &new),
            vec![EvolutionIssue::FieldDropped {
                key: "phone".into(),
                column: 1,
            }]
        );
    }

    #[test]
    fn test_column_reuse_by_new_key_is_reported() {
        let new = RecordSchema::new("b")
            .with_field(FieldSchema::new("name", 0))
            .with_field(FieldSchema::new("phone", 2))
            .with_field(FieldSchema::new("mobile", 1));

        assert_eq!(
            check_evolution(&base(), &new),
            vec![
                EvolutionIssue::FieldMoved {
                    key: "phone".into(),
                    from: 1,
                    to: 2,
                },
                EvolutionIssue::ColumnReused {
                    column: 1,
                    old_key: "phone".into(),
                    new_key: "mobile".into(),
                },
            ]
        );
    }

    #[test]
    fn test_reordering_fields_without_renumbering_is_fine() {
        let new = RecordSchema::new("b")
            .with_field(FieldSchema::new("phone", 1))
            .with_field(FieldSchema::new("name", 0));
        assert!(is_additive(&base(), &new));
    }
}
