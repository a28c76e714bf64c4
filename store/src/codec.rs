//! Row ↔ record conversion.
//!
//! Decoding always goes through the schema's column index, never through the
//! position of a field in the schema. That keeps rows written under an older
//! layout readable as long as old columns are never renumbered.

use intake_ledger_core::{FieldValues, Record, RecordSchema};

/// Builds the record for one data row.
///
/// Cells beyond the end of `row` take the field's default (an empty string
/// unless the schema says otherwise). Cells the schema does not map are
/// ignored.
///
/// # Examples
///
/// ```
/// use intake_ledger_core::intake_v2;
/// use intake_ledger_store::decode_row;
///
/// let row: Vec<String> = ["Kim", "010-1234", "2024-01-01", "", "", "oily skin", "dry", "fair"]
///     .map(String::from)
///     .to_vec();
/// let record = decode_row(&intake_v2(), 1, &row);
///
/// assert_eq!(record.get("concerns"), Some("oily skin"));
/// assert_eq!(record.get("skinType"), Some("dry"));
/// assert_eq!(record.get("skinTone"), Some("fair"));
/// ```
pub fn decode_row(schema: &RecordSchema, id: u64, row: &[String]) -> Record {
    let mut record = Record::new(id);
    for field in &schema.fields {
        let value = row.get(field.column).unwrap_or(&field.default);
        record.push(&field.key, value);
    }
    record
}

/// Builds the row to append for a set of field values.
///
/// The row spans column 0 through the schema's highest column. Each field's
/// value lands on its column; unmapped columns and fields absent from
/// `fields` are written as empty strings. Keys the schema does not know are
/// dropped.
///
/// # Examples
///
/// ```
/// use intake_ledger_core::{FieldSchema, FieldValues, RecordSchema};
/// use intake_ledger_store::encode_row;
///
/// let schema = RecordSchema::new("t")
///     .with_field(FieldSchema::new("name", 0))
///     .with_field(FieldSchema::new("concerns", 3));
///
/// let mut fields = FieldValues::new();
/// fields.insert("name".into(), "Kim".into());
/// fields.insert("concerns".into(), "dryness".into());
/// fields.insert("unknown".into(), "ignored".into());
///
/// assert_eq!(encode_row(&schema, &fields), vec!["Kim", "", "", "dryness"]);
/// ```
pub fn encode_row(schema: &RecordSchema, fields: &FieldValues) -> Vec<String> {
    let mut row = vec![String::new(); schema.width()];
    for field in &schema.fields {
        if let Some(value) = fields.get(&field.key) {
            row[field.column] = value.clone();
        }
    }
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_ledger_core::{FieldSchema, intake_v1, intake_v2};

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_decode_reference_row() {
        let schema = RecordSchema::new("ref")
            .with_field(FieldSchema::new("name", 0))
            .with_field(FieldSchema::new("phone", 1))
            .with_field(FieldSchema::new("date", 2))
            .with_field(FieldSchema::new("concerns", 5))
            .with_field(FieldSchema::new("skinType", 6))
            .with_field(FieldSchema::new("skinTone", 7));

        let record = decode_row(
            &schema,
            1,
            &row(&["Kim", "010-1234", "2024-01-01", "", "", "oily skin", "dry", "fair"]),
        );

        let fields: Vec<(&str, &str)> = record.fields().collect();
        assert_eq!(
            fields,
            vec![
                ("name", "Kim"),
                ("phone", "010-1234"),
                ("date", "2024-01-01"),
                ("concerns", "oily skin"),
                ("skinType", "dry"),
                ("skinTone", "fair"),
            ]
        );
    }

    #[test]
    fn test_short_row_uses_defaults() {
        let record = decode_row(&intake_v2(), 4, &row(&["Lee", "010-9999"]));
        assert_eq!(record.id, 4);
        assert_eq!(record.get("name"), Some("Lee"));
        assert_eq!(record.get("date"), Some(""));
        assert_eq!(record.get("skinTone"), Some(""));
        assert_eq!(record.len(), 6);
    }

    #[test]
    fn test_custom_default_applies_only_when_cell_is_absent() {
        let schema = RecordSchema::new("t")
            .with_field(FieldSchema::new("name", 0))
            .with_field(FieldSchema::new("status", 2).with_default("new"));

        assert_eq!(decode_row(&schema, 1, &row(&["a"])).get("status"), Some("new"));
        assert_eq!(
            decode_row(&schema, 1, &row(&["a", "", ""])).get("status"),
            Some("")
        );
    }

    #[test]
    fn test_encode_fills_gaps_and_missing_fields() {
        let mut fields = FieldValues::new();
        fields.insert("name".into(), "Kim".into());
        fields.insert("skinTone".into(), "fair".into());

        let encoded = encode_row(&intake_v2(), &fields);
        assert_eq!(encoded, row(&["Kim", "", "", "", "", "", "", "fair"]));
    }

    #[test]
    fn test_encode_then_decode_with_v1() {
        let mut fields = FieldValues::new();
        for (key, value) in [
            ("name", "Kim"),
            ("phone", "010-1234"),
            ("date", "2024-01-01"),
            ("skinTone", "fair"),
            ("skinType", "dry"),
            ("concerns", "oily skin"),
        ] {
            fields.insert(key.into(), value.into());
        }

        let decoded = decode_row(&intake_v1(), 1, &encode_row(&intake_v1(), &fields));
        assert_eq!(decoded.to_values(), fields);
    }
}
