//! Integration tests for the intake-ledger-store crate.

use std::sync::{Arc, Mutex};

use intake_ledger_core::{
    ColumnRange, Credential, FieldSchema, FieldValues, RecordSchema, intake_v1, intake_v2,
    intake_v3,
};
use intake_ledger_store::{
    MemorySource, RecordStore, Rows, SourceError, StoreError, TabularSource,
};

fn credential() -> Credential {
    Credential::ApiKey("test-key".to_string())
}

fn values(pairs: &[(&str, &str)]) -> FieldValues {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Table laid out as v2: answers after a two-column gap.
fn v2_source() -> MemorySource {
    let source = MemorySource::with_header([
        "Name", "Phone", "Date", "", "", "Concerns", "Skin type", "Skin tone",
    ]);
    source.push_row(["Kim", "010-1234-5678", "2024-01-01", "", "", "oily skin", "dry", "fair"]);
    source.push_row(["Lee", "010-2222-3333", "2024-01-02"]);
    source.push_row(["Park", "010-4444-5555", "2024-01-03", "", "", "redness", "combination", "medium"]);
    source
}

#[tokio::test]
async fn test_list_assigns_sequential_ids() {
    let store = RecordStore::new(v2_source(), intake_v2(), Some("Responses"));

    let records = store.list_records(&credential()).await.unwrap();
    let ids: Vec<u64> = records.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);

    assert_eq!(records[0].get("concerns"), Some("oily skin"));
    assert_eq!(records[0].get("skinTone"), Some("fair"));
    assert_eq!(records[2].get("name"), Some("Park"));
}

#[tokio::test]
async fn test_short_rows_decode_to_empty_fields() {
    let store = RecordStore::new(v2_source(), intake_v2(), None);

    let lee = store.get_record(&credential(), 2).await.unwrap();
    assert_eq!(lee.get("name"), Some("Lee"));
    assert_eq!(lee.get("concerns"), Some(""));
    assert_eq!(lee.get("skinType"), Some(""));
    assert_eq!(lee.len(), intake_v2().fields.len());
}

#[tokio::test]
async fn test_get_matches_list_for_every_id() {
    let store = RecordStore::new(v2_source(), intake_v2(), None);
    let records = store.list_records(&credential()).await.unwrap();

    for record in &records {
        let fetched = store.get_record(&credential(), record.id as i64).await.unwrap();
        assert_eq!(&fetched, record);
    }
}

#[tokio::test]
async fn test_get_out_of_range_is_not_found() {
    let store = RecordStore::new(v2_source(), intake_v2(), None);

    for id in [0, -3, 4, 1_000] {
        let result = store.get_record(&credential(), id).await;
        assert!(
            matches!(result, Err(StoreError::NotFound { id: missing }) if missing == id),
            "id {id} should be missing"
        );
    }
}

#[tokio::test]
async fn test_empty_and_header_only_tables_list_nothing() {
    let empty = RecordStore::new(MemorySource::new(), intake_v1(), None);
    assert!(empty.list_records(&credential()).await.unwrap().is_empty());
    assert!(matches!(
        empty.get_record(&credential(), 1).await,
        Err(StoreError::NotFound { id: 1 })
    ));

    let header_only = RecordStore::new(MemorySource::with_header(["Name"]), intake_v1(), None);
    assert!(header_only.list_records(&credential()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_append_then_list() {
    let store = RecordStore::new(v2_source(), intake_v2(), None);
    let before = store.list_records(&credential()).await.unwrap().len();

    let fields = values(&[
        ("name", "Choi"),
        ("phone", "010-7777-8888"),
        ("date", "2024-02-01"),
        ("concerns", "dryness"),
        ("skinType", "dry"),
        ("skinTone", "light"),
    ]);
    store.append_record(&credential(), &fields).await.unwrap();

    let records = store.list_records(&credential()).await.unwrap();
    assert_eq!(records.len(), before + 1);

    let last = records.last().unwrap();
    assert_eq!(last.id as usize, before + 1);
    assert_eq!(last.to_values(), fields);

    // the written row carries the gap columns as empty cells
    let raw = store.source().rows();
    assert_eq!(raw.last().unwrap().len(), 8);
    assert_eq!(raw.last().unwrap()[3], "");
}

#[tokio::test]
async fn test_append_to_empty_table_writes_header_first() {
    let store = RecordStore::new(MemorySource::new(), intake_v2(), None);

    store
        .append_record(&credential(), &values(&[("name", "Kim")]))
        .await
        .unwrap();

    let records = store.list_records(&credential()).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, 1);
    assert_eq!(records[0].get("name"), Some("Kim"));

    let raw = store.source().rows();
    assert_eq!(raw.len(), 2);
    assert_eq!(raw[0], intake_v2().header_row());

    // a second append finds the header and writes only the record
    store
        .append_record(&credential(), &values(&[("name", "Lee")]))
        .await
        .unwrap();
    assert_eq!(store.source().len(), 3);
    assert_eq!(store.get_record(&credential(), 2).await.unwrap().get("name"), Some("Lee"));
}

#[tokio::test]
async fn test_append_twice_writes_two_rows() {
    let store = RecordStore::new(v2_source(), intake_v2(), None);
    let fields = values(&[("name", "Twin")]);

    store.append_record(&credential(), &fields).await.unwrap();
    store.append_record(&credential(), &fields).await.unwrap();

    let records = store.list_records(&credential()).await.unwrap();
    let twins = records.iter().filter(|r| r.get("name") == Some("Twin")).count();
    assert_eq!(twins, 2);
}

#[tokio::test]
async fn test_v1_rows_read_with_v3_layout_misplace_answers() {
    // a v1 row decoded with the wrong version puts answers on the wrong keys
    let source = MemorySource::with_header(["Name"]);
    source.push_row(["Kim", "010-1234", "2024-01-01", "fair", "dry", "oily skin"]);

    let v1 = RecordStore::new(Arc::new(source), intake_v1(), None);
    let v3 = RecordStore::new(Arc::clone(v1.source()), intake_v3(), None);

    let as_v1 = v1.get_record(&credential(), 1).await.unwrap();
    let as_v3 = v3.get_record(&credential(), 1).await.unwrap();

    assert_eq!(as_v1.get("skinTone"), Some("fair"));
    assert_eq!(as_v3.get("skinTone"), Some(""));
    assert_eq!(as_v3.get("concerns"), Some("oily skin"));
}

#[tokio::test]
async fn test_unavailable_source_surfaces_store_unavailable() {
    let source = Arc::new(v2_source());
    let store = RecordStore::new(Arc::clone(&source), intake_v2(), None);
    source.set_unavailable(true);

    assert!(matches!(
        store.list_records(&credential()).await,
        Err(StoreError::StoreUnavailable(SourceError::Transport(_)))
    ));
    assert!(matches!(
        store.get_record(&credential(), 1).await,
        Err(StoreError::StoreUnavailable(_))
    ));
    assert!(matches!(
        store.append_record(&credential(), &values(&[("name", "x")])).await,
        Err(StoreError::StoreUnavailable(_))
    ));
    assert_eq!(source.len(), 4);
}

#[tokio::test]
async fn test_store_reads_only_schema_columns() {
    let schema = RecordSchema::new("narrow")
        .with_field(FieldSchema::new("name", 0))
        .with_field(FieldSchema::new("phone", 1));
    let store = RecordStore::new(v2_source(), schema, Some("Responses"));

    assert_eq!(store.range().to_string(), "Responses!A:B");
    let record = store.get_record(&credential(), 1).await.unwrap();
    assert_eq!(record.len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_appends_never_collide() {
    let store = Arc::new(RecordStore::new(
        MemorySource::with_header(["Name"]),
        intake_v2(),
        None,
    ));

    let mut handles = Vec::new();
    for n in 0..32 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            let name = format!("customer-{n}");
            let fields = values(&[("name", name.as_str())]);
            store.append_record(&credential(), &fields).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let records = store.list_records(&credential()).await.unwrap();
    assert_eq!(records.len(), 32);

    let mut names: Vec<&str> = records.iter().filter_map(|r| r.get("name")).collect();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), 32);
}

/// Source that appends by reading the current length and then writing at
/// that offset, yielding in between like a network round trip would.
#[derive(Default)]
struct ReadThenWriteSource {
    rows: Mutex<Rows>,
}

impl ReadThenWriteSource {
    fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

impl TabularSource for ReadThenWriteSource {
    async fn read_range(
        &self,
        _credential: &Credential,
        _range: &ColumnRange,
    ) -> Result<Rows, SourceError> {
        Ok(self.rows.lock().unwrap().clone())
    }

    async fn append_row(
        &self,
        _credential: &Credential,
        _range: &ColumnRange,
        row: Vec<String>,
    ) -> Result<(), SourceError> {
        let offset = self.len();
        tokio::task::yield_now().await;

        let mut rows = self.rows.lock().unwrap();
        if offset < rows.len() {
            rows[offset] = row;
        } else {
            rows.push(row);
        }
        Ok(())
    }
}

#[tokio::test]
async fn test_read_then_write_append_loses_rows() {
    let source = ReadThenWriteSource::default();
    source.rows.lock().unwrap().push(vec!["Name".to_string()]);
    let store = RecordStore::new(source, intake_v2(), None);
    let credential = credential();

    let first = values(&[("name", "first")]);
    let second = values(&[("name", "second")]);
    let (a, b) = tokio::join!(
        store.append_record(&credential, &first),
        store.append_record(&credential, &second),
    );
    a.unwrap();
    b.unwrap();

    // both writers targeted row 1; one submission is gone
    let records = store.list_records(&credential).await.unwrap();
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn test_atomic_append_keeps_both_rows() {
    let store = RecordStore::new(MemorySource::with_header(["Name"]), intake_v2(), None);
    let credential = credential();

    let first = values(&[("name", "first")]);
    let second = values(&[("name", "second")]);
    let (a, b) = tokio::join!(
        store.append_record(&credential, &first),
        store.append_record(&credential, &second),
    );
    a.unwrap();
    b.unwrap();

    let records = store.list_records(&credential).await.unwrap();
    assert_eq!(records.len(), 2);
}
