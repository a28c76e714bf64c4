//! The outbound contract: a remote rectangular table of strings.

use std::future::Future;
use std::sync::Arc;

use intake_ledger_core::{ColumnRange, Credential};

use crate::error::SourceError;

/// Rows as returned by a source: each row is a sequence of cell strings.
///
/// Rows may be shorter than the requested range; trailing empty cells are
/// commonly omitted by remote providers.
pub type Rows = Vec<Vec<String>>;

/// A remote table that can be read by column range and appended to.
///
/// Every call receives the credential to use; implementations must not keep
/// an implicit session.
///
/// # Append semantics
///
/// [`append_row`](Self::append_row) must place the row after the current
/// last row *atomically on the source side*. An implementation that reads
/// the current length and then writes at that offset lets two concurrent
/// appends land on the same row, silently losing one of them.
pub trait TabularSource: Send + Sync {
    /// Reads every row within `range`. A table with no rows yields an empty
    /// vector, not an error.
    fn read_range(
        &self,
        credential: &Credential,
        range: &ColumnRange,
    ) -> impl Future<Output = Result<Rows, SourceError>> + Send;

    /// Appends one row after the current last row.
    fn append_row(
        &self,
        credential: &Credential,
        range: &ColumnRange,
        row: Vec<String>,
    ) -> impl Future<Output = Result<(), SourceError>> + Send;
}

impl<S: TabularSource> TabularSource for Arc<S> {
    fn read_range(
        &self,
        credential: &Credential,
        range: &ColumnRange,
    ) -> impl Future<Output = Result<Rows, SourceError>> + Send {
        (**self).read_range(credential, range)
    }

    fn append_row(
        &self,
        credential: &Credential,
        range: &ColumnRange,
        row: Vec<String>,
    ) -> impl Future<Output = Result<(), SourceError>> + Send {
        (**self).append_row(credential, range, row)
    }
}
