//! Survey submissions as collected by the intake form.

use chrono::NaiveDate;

use crate::{DATE_FIELD, FieldValues, RecordSchema, ValidationError, validate_submission};

/// A validated set of field values ready to be appended.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use intake_ledger_core::*;
///
/// let mut raw = FieldValues::new();
/// raw.insert("name".into(), " Kim ".into());
/// raw.insert("phone".into(), "010-1234".into());
/// raw.insert("skinTone".into(), "fair".into());
/// raw.insert("skinType".into(), "dry".into());
/// raw.insert("concerns".into(), "oily skin".into());
///
/// let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let submission = Submission::prepare(&intake_v2(), raw, today).unwrap();
///
/// assert_eq!(submission.get("name"), Some("Kim"));
/// assert_eq!(submission.get("date"), Some("2024-01-01"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    fields: FieldValues,
}

impl Submission {
    /// Trims every value, stamps the registration date when the schema has
    /// a `date` field left blank, then checks required fields.
    ///
    /// # Errors
    ///
    /// Returns every [`ValidationError::MissingRequiredField`] found.
    pub fn prepare(
        schema: &RecordSchema,
        raw: FieldValues,
        today: NaiveDate,
    ) -> Result<Self, Vec<ValidationError>> {
        let mut fields: FieldValues = raw
            .into_iter()
            .map(|(key, value)| (key, value.trim().to_string()))
            .collect();

        if schema.field(DATE_FIELD).is_some() {
            let date = fields.entry(DATE_FIELD.to_string()).or_default();
            if date.is_empty() {
                *date = today.format("%Y-%m-%d").to_string();
            }
        }

        let errors = validate_submission(schema, &fields);
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Self { fields })
    }

    /// Looks up a prepared value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Borrows the prepared values.
    pub fn fields(&self) -> &FieldValues {
        &self.fields
    }
}
