//! Tests for loader module

use super::*;
use crate::config::WriteOptions;
use crate::error::Error;
use crate::output::DatasetWriter;
use crate::schema::{event_record_schema, song_record_schema, Table};
use crate::storage::StorageLocation;
use arrow::array::{Array, ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::compute::concat_batches;
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use datafusion::dataframe::DataFrame;
use datafusion::prelude::{col, SessionContext};
use parquet::arrow::ArrowWriter;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

const SONG: &str = r#"{"num_songs": 1, "artist_id": "A1", "artist_latitude": null,
  "artist_longitude": null, "artist_location": "", "artist_name": "Art1",
  "song_id": "S1", "title": "T1", "duration": 210.5, "year": 2020}"#;

async fn put(location: &StorageLocation, relative: &str, body: &str) {
    location
        .write(relative, Bytes::from(body.to_string()))
        .await
        .unwrap();
}

/// All rows of a frame in one batch, ordered by `key`
async fn collect_sorted(frame: &DataFrame, key: &str) -> RecordBatch {
    let schema = Arc::new(frame.schema().as_arrow().clone());
    let batches = frame
        .clone()
        .sort(vec![col(key).sort(true, true)])
        .unwrap()
        .collect()
        .await
        .unwrap();
    concat_batches(&schema, &batches).unwrap()
}

fn column_strings(batch: &RecordBatch, name: &str) -> Vec<Option<String>> {
    batch
        .column_by_name(name)
        .unwrap()
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap()
        .iter()
        .map(|v| v.map(str::to_string))
        .collect()
}

// ============================================================================
// JSON Decoding Tests
// ============================================================================

#[test]
fn test_decode_single_object() {
    let records = decode_json_records(SONG.as_bytes(), "a.json").unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["song_id"], json!("S1"));
}

#[test]
fn test_decode_newline_delimited() {
    let body = "{\"a\": 1}\n{\"a\": 2}\n\n  {\"a\": 3}{\"a\": 4}\n";
    let records = decode_json_records(body.as_bytes(), "log.json").unwrap();
    assert_eq!(records.len(), 4);
    assert_eq!(records[3]["a"], json!(4));
}

#[test]
fn test_decode_flattens_arrays() {
    let body = r#"[{"a": 1}, {"a": 2}] {"a": 3}"#;
    let records = decode_json_records(body.as_bytes(), "x.json").unwrap();
    assert_eq!(records.len(), 3);
}

#[test]
fn test_decode_empty_body() {
    let records = decode_json_records(b"  \n", "empty.json").unwrap();
    assert!(records.is_empty());
}

#[test]
fn test_decode_malformed_names_file() {
    let err = decode_json_records(b"{\"a\": 1}\n{\"a\": ", "bad.json").unwrap_err();
    assert!(matches!(err, Error::MalformedRecord { ref path, .. } if path == "bad.json"));
}

#[test]
fn test_decode_rejects_scalars() {
    assert!(decode_json_records(b"42", "n.json").is_err());
    assert!(decode_json_records(b"[1, 2]", "n.json").is_err());
}

// ============================================================================
// JSON Dataset Tests
// ============================================================================

#[tokio::test]
async fn test_load_json_dataset_nested_files() {
    let session = SessionContext::new();
    let location = StorageLocation::in_memory();
    put(&location, "song_data/B/B/B/TRB.json", SONG).await;
    put(
        &location,
        "song_data/A/A/A/TRA.json",
        &SONG.replace("S1", "S0"),
    )
    .await;
    put(&location, "song_data/A/README.txt", "not json").await;

    let dataset = load_json_dataset(
        &session,
        &location,
        "song_data",
        "song_data",
        &song_record_schema(),
    )
    .await
    .unwrap();

    assert_eq!(dataset.files, 2);
    assert_eq!(dataset.records, 2);

    let batch = collect_sorted(&dataset.frame, "song_id").await;
    assert_eq!(
        column_strings(&batch, "song_id"),
        vec![Some("S0".to_string()), Some("S1".to_string())]
    );
}

#[tokio::test]
async fn test_load_json_dataset_registers_session_table() {
    let session = SessionContext::new();
    let location = StorageLocation::in_memory();
    put(&location, "song_data/a.json", SONG).await;

    load_json_dataset(&session, &location, "song_data", "song_data", &song_record_schema())
        .await
        .unwrap();
    // Loading again replaces the registered table
    let dataset =
        load_json_dataset(&session, &location, "song_data", "song_data", &song_record_schema())
            .await
            .unwrap();

    let registered = session.table("song_data").await.unwrap();
    assert_eq!(registered.count().await.unwrap(), 1);
    assert_eq!(dataset.frame.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_load_json_dataset_no_files() {
    let session = SessionContext::new();
    let location = StorageLocation::in_memory();
    put(&location, "log-data/readme.md", "nothing here").await;

    let err = load_json_dataset(&session, &location, "log-data", "log_data", &event_record_schema())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NoInputFiles { ref path } if path == "memory://log-data"));
}

#[tokio::test]
async fn test_load_json_dataset_malformed_file() {
    let session = SessionContext::new();
    let location = StorageLocation::in_memory();
    put(&location, "song_data/ok.json", SONG).await;
    put(&location, "song_data/broken.json", "{\"song_id\": ").await;

    let err = load_json_dataset(
        &session,
        &location,
        "song_data",
        "song_data",
        &song_record_schema(),
    )
    .await
    .unwrap_err();
    assert!(matches!(
        err,
        Error::MalformedRecord { ref path, .. } if path.ends_with("song_data/broken.json")
    ));
}

#[tokio::test]
async fn test_load_json_dataset_missing_field() {
    let session = SessionContext::new();
    let location = StorageLocation::in_memory();
    let event = json!({
        "artist": "Art1", "auth": "Logged In", "firstName": "Ann", "gender": "F",
        "lastName": "Lee", "level": "free", "location": "NY", "page": "NextSong",
        "sessionId": 42, "song": "T1", "ts": 1_583_920_800_000_i64, "userId": "7"
    });
    put(&location, "log-data/2018/11/events.json", &event.to_string()).await;

    let err = load_json_dataset(&session, &location, "log-data", "log_data", &event_record_schema())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::MissingField { ref dataset, ref field }
            if dataset == "log_data" && field == "userAgent"
    ));
}

#[tokio::test]
async fn test_load_json_dataset_only_empty_files() {
    let session = SessionContext::new();
    let location = StorageLocation::in_memory();
    put(&location, "log-data/empty.json", "\n").await;

    let dataset =
        load_json_dataset(&session, &location, "log-data", "log_data", &event_record_schema())
            .await
            .unwrap();
    assert_eq!(dataset.files, 1);
    assert_eq!(dataset.records, 0);
    assert_eq!(dataset.frame.count().await.unwrap(), 0);
}

// ============================================================================
// Parquet Table Tests
// ============================================================================

fn songs_frame(session: &SessionContext) -> DataFrame {
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(vec!["S1", "S2", "S3"])),
        Arc::new(StringArray::from(vec!["T1", "T2", "T3"])),
        Arc::new(StringArray::from(vec![Some("A1"), Some("A/2"), Some("A1")])),
        Arc::new(Int64Array::from(vec![Some(2020), None, Some(2020)])),
        Arc::new(Float64Array::from(vec![210.5, 180.0, 99.9])),
    ];
    let batch = RecordBatch::try_new(Table::Songs.schema(), columns).unwrap();
    session.read_batch(batch).unwrap()
}

async fn write_songs(location: &StorageLocation) {
    DatasetWriter::new(location.clone(), WriteOptions::default())
        .write_table(Table::Songs, songs_frame(&SessionContext::new()))
        .await
        .unwrap();
}

/// A small valid Parquet file with the `songs` data columns
fn songs_file() -> Bytes {
    let batch = RecordBatch::try_new(
        Table::Songs.data_schema(),
        vec![
            Arc::new(StringArray::from(vec!["S9"])) as ArrayRef,
            Arc::new(StringArray::from(vec!["T9"])),
            Arc::new(Float64Array::from(vec![1.0])),
        ],
    )
    .unwrap();
    let mut writer = ArrowWriter::try_new(Vec::new(), batch.schema(), None).unwrap();
    writer.write(&batch).unwrap();
    Bytes::from(writer.into_inner().unwrap())
}

#[tokio::test]
async fn test_load_table_reattaches_partitions() {
    let location = StorageLocation::in_memory();
    write_songs(&location).await;

    let session = SessionContext::new();
    let dataset = load_table(&session, &location, Table::Songs).await.unwrap();
    assert_eq!(dataset.files, 2);
    assert_eq!(dataset.records, 3);
    assert_eq!(
        Arc::new(dataset.frame.schema().as_arrow().clone()),
        Table::Songs.read_schema()
    );

    let batch = collect_sorted(&dataset.frame, "song_id").await;
    let years = batch
        .column_by_name("year")
        .unwrap()
        .as_any()
        .downcast_ref::<Int64Array>()
        .unwrap();
    assert_eq!(
        years.iter().collect::<Vec<_>>(),
        vec![Some(2020), None, Some(2020)]
    );
    // Escaped directory names come back unescaped
    assert_eq!(
        column_strings(&batch, "artist_id"),
        vec![
            Some("A1".to_string()),
            Some("A/2".to_string()),
            Some("A1".to_string())
        ]
    );
}

#[tokio::test]
async fn test_load_table_registers_table_name() {
    let location = StorageLocation::in_memory();
    write_songs(&location).await;

    let session = SessionContext::new();
    load_table(&session, &location, Table::Songs).await.unwrap();
    let registered = session.table("songs").await.unwrap();
    assert_eq!(registered.count().await.unwrap(), 3);
}

#[tokio::test]
async fn test_load_table_only_marker_is_empty() {
    let location = StorageLocation::in_memory();
    put(&location, "users/_SUCCESS", "").await;

    let session = SessionContext::new();
    let dataset = load_table(&session, &location, Table::Users).await.unwrap();
    assert_eq!(dataset.files, 0);
    assert_eq!(dataset.records, 0);
    assert_eq!(dataset.frame.schema().fields().len(), 5);
    assert_eq!(dataset.frame.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_load_table_missing() {
    let location = StorageLocation::in_memory();
    let err = load_table(&SessionContext::new(), &location, Table::Songs)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NoInputFiles { .. }));
}

#[tokio::test]
async fn test_load_table_skips_hidden_directories() {
    let location = StorageLocation::in_memory();
    write_songs(&location).await;
    // Leftovers of interrupted writers, at any depth under the table
    put(&location, "songs/_temporary/0/part-00000.parquet", "junk").await;
    put(&location, "songs/year=2020/.spark-staging/f.parquet", "junk").await;
    put(&location, "songs/year=2020/artist_id=A1/.f.parquet.crc", "junk").await;

    let dataset = load_table(&SessionContext::new(), &location, Table::Songs)
        .await
        .unwrap();
    assert_eq!(dataset.files, 2);
    assert_eq!(dataset.records, 3);
}

#[tokio::test]
async fn test_load_table_rejects_stray_file() {
    let location = StorageLocation::in_memory();
    write_songs(&location).await;
    put(&location, "songs/stray.parquet", "junk").await;

    let err = load_table(&SessionContext::new(), &location, Table::Songs)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidPartition { .. }));
}

#[tokio::test]
async fn test_load_table_default_partition_is_null() {
    let location = StorageLocation::in_memory();
    location
        .write(
            "songs/year=__HIVE_DEFAULT_PARTITION__/artist_id=AR1/f.parquet",
            songs_file(),
        )
        .await
        .unwrap();

    let dataset = load_table(&SessionContext::new(), &location, Table::Songs)
        .await
        .unwrap();
    let batch = collect_sorted(&dataset.frame, "song_id").await;
    assert_eq!(batch.column_by_name("year").unwrap().null_count(), 1);
    assert_eq!(column_strings(&batch, "artist_id"), vec![Some("AR1".to_string())]);
}

#[tokio::test]
async fn test_load_table_corrupt_file_names_path() {
    let location = StorageLocation::in_memory();
    put(&location, "users/Xk2w9d_0.parquet", "junk").await;

    let err = load_table(&SessionContext::new(), &location, Table::Users)
        .await
        .unwrap_err();
    assert!(err
        .to_string()
        .contains("Failed to decode memory://users/Xk2w9d_0.parquet"));
}

#[test]
fn test_decode_parquet_rejects_garbage() {
    assert!(decode_parquet(Bytes::from_static(b"not parquet")).is_err());
}

#[test]
fn test_decode_parquet_reads_whole_file() {
    let decoded = decode_parquet(songs_file()).unwrap();
    assert_eq!(decoded.num_rows(), 1);
    assert_eq!(decoded.schema().fields(), Table::Songs.data_schema().fields());
}
