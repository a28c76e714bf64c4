//! Schema and record type definitions.
//!
//! A [`RecordSchema`] is the single contract between the code that writes
//! rows and the code that reads them back: it maps every field key to an
//! explicit zero-based column index. A [`Record`] is one decoded row plus
//! its positional identifier.

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::range::ColumnRange;

/// Field values keyed by schema field key, as submitted by a caller.
pub type FieldValues = BTreeMap<String, String>;

/// Key of the field that carries the registration date.
pub const DATE_FIELD: &str = "date";

/// Key under which a record's positional id is serialized; no field may use it.
pub const ID_FIELD: &str = "id";

/// Descriptor for one field of a [`RecordSchema`].
///
/// # Examples
///
/// ```
/// use intake_ledger_core::FieldSchema;
///
/// let field = FieldSchema::new("phone", 1).required().with_label("Phone");
/// assert_eq!(field.column, 1);
/// assert!(field.required);
/// assert_eq!(field.default, "");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    /// Field key, unique within the schema.
    pub key: String,
    /// Zero-based column index in the source table.
    pub column: usize,
    /// Value used when a row is too short to reach `column`.
    #[serde(default)]
    pub default: String,
    /// Whether a submission must provide a non-blank value.
    #[serde(default)]
    pub required: bool,
    /// Human-readable label for displays.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl FieldSchema {
    /// Creates an optional field with an empty-string default.
    pub fn new(key: &str, column: usize) -> Self {
        Self {
            key: key.to_string(),
            column,
            default: String::new(),
            required: false,
            label: None,
        }
    }

    /// Marks the field as required for submissions.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Adds a display label.
    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    /// Overrides the short-row default.
    pub fn with_default(mut self, default: &str) -> Self {
        self.default = default.to_string();
        self
    }
}

/// Versioned key-to-column table describing how records are laid out in a
/// row.
///
/// Field order is the logical order used when records are displayed or
/// serialized; it does not have to follow column order.
///
/// # Examples
///
/// ```
/// use intake_ledger_core::{FieldSchema, RecordSchema};
///
/// let schema = RecordSchema::new("v2")
///     .with_field(FieldSchema::new("name", 0))
///     .with_field(FieldSchema::new("skinTone", 7))
///     .with_field(FieldSchema::new("concerns", 5));
///
/// assert_eq!(schema.max_column(), Some(7));
/// assert_eq!(schema.width(), 8);
/// assert_eq!(schema.field("concerns").unwrap().column, 5);
/// assert_eq!(schema.column_range(Some("Responses")).to_string(), "Responses!A:H");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSchema {
    /// Version tag (e.g. `"v2"`).
    pub version: String,
    /// Field descriptors in logical order.
    pub fields: Vec<FieldSchema>,
}

impl RecordSchema {
    /// Creates an empty schema with the given version tag.
    pub fn new(version: &str) -> Self {
        Self {
            version: version.to_string(),
            fields: Vec::new(),
        }
    }

    /// Appends a field descriptor.
    pub fn with_field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }

    /// Finds a field by key.
    pub fn field(&self, key: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// Returns the highest declared column index, or `None` for an empty
    /// schema.
    pub fn max_column(&self) -> Option<usize> {
        self.fields.iter().map(|f| f.column).max()
    }

    /// Number of cells in a row written with this schema (column 0 through
    /// the highest declared column).
    pub fn width(&self) -> usize {
        self.max_column().map_or(0, |max| max + 1)
    }

    /// Returns the column range covering every field of this schema.
    pub fn column_range(&self, sheet: Option<&str>) -> ColumnRange {
        ColumnRange::new(sheet, 0, self.max_column().unwrap_or(0))
    }

    /// Header cells for a fresh table: each field's label (or its key when
    /// unlabelled) on its column, unmapped columns empty.
    ///
    /// ```
    /// use intake_ledger_core::{FieldSchema, RecordSchema};
    ///
    /// let schema = RecordSchema::new("t")
    ///     .with_field(FieldSchema::new("name", 0).with_label("Name"))
    ///     .with_field(FieldSchema::new("concerns", 2));
    /// assert_eq!(schema.header_row(), vec!["Name", "", "concerns"]);
    /// ```
    pub fn header_row(&self) -> Vec<String> {
        let mut header = vec![String::new(); self.width()];
        for field in &self.fields {
            header[field.column] = field.label.clone().unwrap_or_else(|| field.key.clone());
        }
        header
    }

    /// Returns the keys of all required fields, in logical order.
    pub fn required_keys(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.key.as_str())
            .collect()
    }
}

/// One record decoded from a row.
///
/// `id` is the record's 1-based position among the data rows at read time.
/// It is stable for one snapshot of the table only: inserting or deleting
/// rows above a record shifts its id.
///
/// Serializes as a flat object with `id` first and the fields in schema
/// order:
///
/// ```
/// use intake_ledger_core::Record;
///
/// let mut record = Record::new(3);
/// record.push("name", "Kim");
/// record.push("phone", "010-1234");
///
/// let json = serde_json::to_string(&record).unwrap();
/// assert_eq!(json, r#"{"id":3,"name":"Kim","phone":"010-1234"}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Positional pseudo-identifier.
    pub id: u64,
    fields: Vec<(String, String)>,
}

impl Record {
    /// Creates a record with no fields.
    pub fn new(id: u64) -> Self {
        Self {
            id,
            fields: Vec::new(),
        }
    }

    /// Appends a field value. Keys are expected to be unique.
    pub fn push(&mut self, key: &str, value: &str) {
        self.fields.push((key.to_string(), value.to_string()));
    }

    /// Looks up a field value by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterates over `(key, value)` pairs in schema order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of fields (excluding `id`).
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the record carries no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Copies the fields into a [`FieldValues`] map.
    pub fn to_values(&self) -> FieldValues {
        self.fields.iter().cloned().collect()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 1))?;
        map.serialize_entry(ID_FIELD, &self.id)?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
