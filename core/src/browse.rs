//! Derived display fields and search for the staff list view.

use serde::Serialize;

use crate::{DATE_FIELD, Record};

/// Compact row shown in the customer list.
///
/// # Examples
///
/// ```
/// use intake_ledger_core::*;
///
/// let mut record = Record::new(2);
/// record.push("name", "Kim");
/// record.push("phone", "010-1234-5678");
/// record.push("date", "2024-01-01");
///
/// let summary = RecordSummary::from_record(&record);
/// assert_eq!(summary.phone_suffix, "5678");
/// assert_eq!(
///     serde_json::to_value(&summary).unwrap(),
///     serde_json::json!({"id": 2, "name": "Kim", "phoneSuffix": "5678", "date": "2024-01-01"})
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSummary {
    /// Positional id of the record.
    pub id: u64,
    /// Customer name.
    pub name: String,
    /// Last four characters of the phone number.
    pub phone_suffix: String,
    /// Registration date.
    pub date: String,
}

impl RecordSummary {
    /// Builds the summary; absent fields become empty strings.
    pub fn from_record(record: &Record) -> Self {
        Self {
            id: record.id,
            name: record.get("name").unwrap_or_default().to_string(),
            phone_suffix: phone_suffix(record.get("phone").unwrap_or_default()),
            date: record.get(DATE_FIELD).unwrap_or_default().to_string(),
        }
    }
}

/// Returns the last four characters of a phone number.
fn phone_suffix(phone: &str) -> String {
    let count = phone.chars().count();
    phone.chars().skip(count.saturating_sub(4)).collect()
}

/// Staff search: case-insensitive match on name, plain substring match on
/// the phone suffix and the date. An empty (or blank) query matches
/// everything.
///
/// # Examples
///
/// ```
/// use intake_ledger_core::*;
///
/// let mut record = Record::new(1);
/// record.push("name", "Kim Minji");
/// record.push("phone", "010-1234-5678");
/// record.push("date", "2024-01-01");
///
/// assert!(matches_query(&record, "minji"));
/// assert!(matches_query(&record, "678"));
/// assert!(matches_query(&record, "2024-01"));
/// assert!(!matches_query(&record, "1234")); // only the suffix is searchable
/// ```
pub fn matches_query(record: &Record, query: &str) -> bool {
    let query = query.trim();
    if query.is_empty() {
        return true;
    }
    let summary = RecordSummary::from_record(record);
    summary.name.to_lowercase().contains(&query.to_lowercase())
        || summary.phone_suffix.contains(query)
        || summary.date.contains(query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_phone_keeps_everything() {
        assert_eq!(phone_suffix("12"), "12");
        assert_eq!(phone_suffix(""), "");
        assert_eq!(phone_suffix("01012345678"), "5678");
    }

    #[test]
    fn test_summary_of_sparse_record() {
        let record = Record::new(9);
        let summary = RecordSummary::from_record(&record);
        assert_eq!(summary.id, 9);
        assert!(summary.name.is_empty());
        assert!(summary.phone_suffix.is_empty());
    }

    #[test]
    fn test_blank_query_matches() {
        assert!(matches_query(&Record::new(1), "   "));
        assert!(!matches_query(&Record::new(1), "kim"));
    }
}
