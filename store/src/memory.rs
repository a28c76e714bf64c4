//! In-process [`TabularSource`] with atomic appends.
//!
//! Mirrors what a spreadsheet API returns for a column range: only the
//! requested columns, with trailing empty cells dropped. Useful for tests,
//! demos and the `--memory` server mode.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use intake_ledger_core::{ColumnRange, Credential};
use tracing::debug;

use crate::error::SourceError;
use crate::source::{Rows, TabularSource};

/// Mutex-guarded table whose appends happen under a single lock acquisition.
///
/// # Examples
///
/// ```
/// use intake_ledger_store::MemorySource;
///
/// let source = MemorySource::with_header(["name", "phone"]);
/// source.push_row(["Kim", "010-1234"]);
/// assert_eq!(source.len(), 2);
/// assert_eq!(source.rows()[1], vec!["Kim", "010-1234"]);
/// ```
#[derive(Debug, Default)]
pub struct MemorySource {
    rows: Mutex<Rows>,
    unavailable: AtomicBool,
}

impl MemorySource {
    /// Creates an empty table (no header row).
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table whose first row is `header`.
    pub fn with_header<I, T>(header: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let source = Self::new();
        source.push_row(header);
        source
    }

    /// Appends a row directly, bypassing the [`TabularSource`] interface.
    pub fn push_row<I, T>(&self, row: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.lock().push(row.into_iter().map(Into::into).collect());
    }

    /// Returns a copy of every stored row, header included.
    pub fn rows(&self) -> Rows {
        self.lock().clone()
    }

    /// Number of stored rows, header included.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if the table holds no rows at all.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Makes every subsequent call fail with a transport error (or succeed
    /// again when `false`).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), SourceError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(SourceError::Transport(
                "memory source marked unavailable".to_string(),
            ));
        }
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Rows> {
        self.rows.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Cuts a stored row down to `range`, dropping trailing empty cells.
fn clip_row(row: &[String], range: &ColumnRange) -> Vec<String> {
    let end = row.len().min(range.last + 1);
    let mut clipped: Vec<String> = row.get(range.first..end).unwrap_or_default().to_vec();
    while clipped.last().is_some_and(String::is_empty) {
        clipped.pop();
    }
    clipped
}

impl TabularSource for MemorySource {
    async fn read_range(
        &self,
        _credential: &Credential,
        range: &ColumnRange,
    ) -> Result<Rows, SourceError> {
        self.check_available()?;
        let rows: Rows = self.lock().iter().map(|row| clip_row(row, range)).collect();
        debug!(range = %range, rows = rows.len(), "memory source read");
        Ok(rows)
    }

    async fn append_row(
        &self,
        _credential: &Credential,
        range: &ColumnRange,
        row: Vec<String>,
    ) -> Result<(), SourceError> {
        self.check_available()?;
        let mut rows = self.lock();
        rows.push(row);
        debug!(range = %range, rows = rows.len(), "memory source append");
        Ok(())
    }
}
