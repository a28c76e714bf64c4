//! Record collection over a remote table.
//!
//! [`RecordStore`] turns "rows in a remote rectangular table" into "a
//! collection of keyed records" and supports list, get-by-id and append.
//!
//! # Identifiers
//!
//! A record's id is its 1-based position among the data rows (row 0 is the
//! header). Ids are stable for one snapshot of the table and nothing more:
//! a row inserted or deleted above a record shifts its id. Appends do not
//! report the id of the new row, because concurrent writers make that
//! position unpredictable for the client.
//!
//! # State
//!
//! The store caches nothing. Every read fetches the full configured column
//! range again, and every failure of the source is returned to the caller
//! unchanged; there are no retries.

use intake_ledger_core::{ColumnRange, Credential, FieldValues, Record, RecordSchema};
use tracing::debug;

use crate::codec::{decode_row, encode_row};
use crate::error::{Result, StoreError};
use crate::source::TabularSource;

/// Spreadsheet-row-backed record store.
///
/// # Examples
///
/// ```
/// use intake_ledger_core::{Credential, FieldValues, intake_v2};
/// use intake_ledger_store::{MemorySource, RecordStore};
///
/// # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
/// # rt.block_on(async {
/// let source = MemorySource::with_header(["name", "phone", "date"]);
/// let store = RecordStore::new(source, intake_v2(), Some("Responses"));
/// let credential = Credential::ApiKey("key".into());
///
/// let mut fields = FieldValues::new();
/// fields.insert("name".into(), "Kim".into());
/// store.append_record(&credential, &fields).await.unwrap();
///
/// let records = store.list_records(&credential).await.unwrap();
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].id, 1);
/// assert_eq!(records[0].get("name"), Some("Kim"));
/// # });
/// ```
#[derive(Debug)]
pub struct RecordStore<S> {
    source: S,
    schema: RecordSchema,
    range: ColumnRange,
}

impl<S: TabularSource> RecordStore<S> {
    /// Creates a store reading and appending `schema`'s column range on
    /// `sheet` (the first sheet when `None`).
    pub fn new(source: S, schema: RecordSchema, sheet: Option<&str>) -> Self {
        let range = schema.column_range(sheet);
        Self {
            source,
            schema,
            range,
        }
    }

    /// Returns the schema used to decode and encode rows.
    pub fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    /// Returns the column range the store reads and appends.
    pub fn range(&self) -> &ColumnRange {
        &self.range
    }

    /// Returns the underlying source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Lists every record in row order.
    ///
    /// A table with no rows, or with only the header row, yields an empty
    /// vector. Ids run `1..=N` without gaps.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::StoreUnavailable`] if the source read fails.
    pub async fn list_records(&self, credential: &Credential) -> Result<Vec<Record>> {
        let rows = self.source.read_range(credential, &self.range).await?;
        debug!(range = %self.range, rows = rows.len(), "listing records");

        let records = rows
            .iter()
            .skip(1)
            .enumerate()
            .map(|(index, row)| decode_row(&self.schema, index as u64 + 1, row))
            .collect();
        Ok(records)
    }

    /// Fetches the record with positional id `id`.
    ///
    /// Looks the row up directly instead of decoding the whole table; the
    /// result is identical to the matching element of
    /// [`list_records`](Self::list_records).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if `id` is below 1 or beyond the
    /// last data row, and [`StoreError::StoreUnavailable`] if the source read
    /// fails. Ids below 1 are rejected without contacting the source.
    pub async fn get_record(&self, credential: &Credential, id: i64) -> Result<Record> {
        let Ok(index) = usize::try_from(id) else {
            return Err(StoreError::NotFound { id });
        };
        if index == 0 {
            return Err(StoreError::NotFound { id });
        }

        let rows = self.source.read_range(credential, &self.range).await?;
        debug!(range = %self.range, rows = rows.len(), id, "fetching record");

        // row 0 is the header, so data row `id` sits at index `id`
        rows.get(index)
            .map(|row| decode_row(&self.schema, index as u64, row))
            .ok_or(StoreError::NotFound { id })
    }

    /// Appends one record built from `fields`.
    ///
    /// The row spans column 0 through the schema's highest column; gaps and
    /// missing fields are written empty, unknown keys are dropped. The row
    /// is handed to the source's atomic append, so no row number is computed
    /// here. Performs no validation and no retries; calling twice with the
    /// same input writes two rows.
    ///
    /// Row 0 is always read as the header. When the range holds no rows at
    /// all, the schema's [`header_row`](RecordSchema::header_row) is appended
    /// first so the record lands at id 1 instead of being hidden as the
    /// header. Two writers racing on a brand-new table may both write a
    /// header; the second one then shows up as a record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::StoreUnavailable`] if the source read or write
    /// fails.
    pub async fn append_record(&self, credential: &Credential, fields: &FieldValues) -> Result<()> {
        let existing = self.source.read_range(credential, &self.range).await?;
        if existing.is_empty() {
            debug!(range = %self.range, "writing header to empty table");
            self.source
                .append_row(credential, &self.range, self.schema.header_row())
                .await?;
        }

        let row = encode_row(&self.schema, fields);
        debug!(range = %self.range, cells = row.len(), "appending record");
        self.source
            .append_row(credential, &self.range, row)
            .await
            .map_err(StoreError::from)
    }
}
