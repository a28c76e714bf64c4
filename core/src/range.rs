//! A1-style addressing for column ranges.
//!
//! Records are always read as whole columns (`Sheet1!A:H`): every row of the
//! table, from column 0 up to the schema's highest column. Column indices are
//! zero-based throughout the crate; letters only appear when a range is
//! rendered for a remote API.

use std::fmt;

/// Highest zero-based column index a sheet can address (`ZZZ`).
pub const MAX_COLUMN: usize = 18_277;

/// Converts a zero-based column index to spreadsheet letters.
///
/// # Examples
///
/// ```
/// use intake_ledger_core::column_letters;
///
/// assert_eq!(column_letters(0), "A");
/// assert_eq!(column_letters(25), "Z");
/// assert_eq!(column_letters(26), "AA");
/// assert_eq!(column_letters(701), "ZZ");
/// assert_eq!(column_letters(702), "AAA");
/// assert_eq!(column_letters(intake_ledger_core::MAX_COLUMN), "ZZZ");
/// ```
pub fn column_letters(index: usize) -> String {
    let mut letters = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Parses spreadsheet letters (case-insensitive) into a zero-based column
/// index.
///
/// Returns `None` for empty input or anything other than ASCII letters.
///
/// # Examples
///
/// ```
/// use intake_ledger_core::parse_column_letters;
///
/// assert_eq!(parse_column_letters("A"), Some(0));
/// assert_eq!(parse_column_letters("h"), Some(7));
/// assert_eq!(parse_column_letters("AA"), Some(26));
/// assert_eq!(parse_column_letters("A1"), None);
/// ```
pub fn parse_column_letters(letters: &str) -> Option<usize> {
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    letters
        .to_ascii_uppercase()
        .bytes()
        .map(|b| (b - b'A') as usize + 1)
        .try_fold(0usize, |acc, digit| acc.checked_mul(26)?.checked_add(digit))
        .map(|column| column - 1)
}

/// A rectangular address spanning whole columns of one sheet.
///
/// # Examples
///
/// ```
/// use intake_ledger_core::ColumnRange;
///
/// assert_eq!(ColumnRange::new(None, 0, 5).to_string(), "A:F");
/// assert_eq!(ColumnRange::new(Some("Sheet1"), 0, 7).to_string(), "Sheet1!A:H");
/// assert_eq!(
///     ColumnRange::new(Some("Intake 2024"), 0, 0).to_string(),
///     "'Intake 2024'!A:A"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRange {
    /// Sheet (tab) name; `None` addresses the first sheet.
    pub sheet: Option<String>,
    /// First column, zero-based, inclusive.
    pub first: usize,
    /// Last column, zero-based, inclusive.
    pub last: usize,
}

impl ColumnRange {
    /// Creates a range. `first` and `last` are swapped if given in reverse.
    pub fn new(sheet: Option<&str>, first: usize, last: usize) -> Self {
        let (first, last) = if first <= last {
            (first, last)
        } else {
            (last, first)
        };
        Self {
            sheet: sheet.map(String::from),
            first,
            last,
        }
    }

    /// Number of columns covered.
    pub fn width(&self) -> usize {
        self.last - self.first + 1
    }

    /// Returns `true` if `column` falls inside the range.
    pub fn contains(&self, column: usize) -> bool {
        (self.first..=self.last).contains(&column)
    }
}

impl fmt::Display for ColumnRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(sheet) = &self.sheet {
            write!(f, "{}!", quote_sheet_name(sheet))?;
        }
        write!(
            f,
            "{}:{}",
            column_letters(self.first),
            column_letters(self.last)
        )
    }
}

/// Quotes a sheet name for A1 notation when it contains anything other than
/// alphanumerics and underscores. Embedded single quotes are doubled.
fn quote_sheet_name(name: &str) -> String {
    if !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        name.to_string()
    } else {
        format!("'{}'", name.replace('\'', "''"))
    }
}
