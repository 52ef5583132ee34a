//! Tests for storage module

use super::*;
use crate::config::StorageCredentials;
use bytes::Bytes;

fn creds() -> StorageCredentials {
    StorageCredentials::aws("AKIAEXAMPLE", "secret").with_region("us-west-2")
}

// ============================================================================
// URL Parsing Tests
// ============================================================================

#[test]
fn test_parse_s3a_url() {
    let location = StorageLocation::open("s3a://udacity-dend/", &creds()).unwrap();
    assert_eq!(location.scheme(), "s3");
    assert_eq!(location.prefix(), "");
    assert_eq!(
        location.display("song_data"),
        "s3a://udacity-dend/song_data"
    );
}

#[test]
fn test_parse_s3_url_with_prefix() {
    let location = StorageLocation::open("s3://bucket/lake/output/", &creds()).unwrap();
    assert_eq!(location.prefix(), "lake/output");
    assert_eq!(
        location.path("songs").unwrap().as_ref(),
        "lake/output/songs"
    );
}

#[test]
fn test_parse_s3_missing_bucket() {
    // Single slash leaves the bucket empty
    let result = StorageLocation::open("s3a:/sparkify-output/", &creds());
    assert!(result.is_err());
}

#[test]
fn test_parse_unsupported_scheme() {
    let err = StorageLocation::open("ftp://host/data", &creds()).unwrap_err();
    assert!(err.to_string().contains("unsupported scheme"));
}

#[test]
fn test_parse_local_path() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().to_str().unwrap();
    let location = StorageLocation::open(path, &creds()).unwrap();
    assert_eq!(location.scheme(), "file");
    assert_eq!(location.prefix(), "");
}

#[tokio::test]
async fn test_file_url_is_percent_decoded() {
    let temp_dir = tempfile::tempdir().unwrap();
    let dir = temp_dir.path().join("sparkify out");
    std::fs::create_dir(&dir).unwrap();
    let url = url::Url::from_directory_path(&dir).unwrap().to_string();
    assert!(url.contains("sparkify%20out"));

    let location = StorageLocation::open(&url, &creds()).unwrap();
    location
        .write("users/_SUCCESS", Bytes::new())
        .await
        .unwrap();

    assert!(dir.join("users/_SUCCESS").is_file());
    assert!(!temp_dir.path().join("sparkify%20out").exists());
}

#[test]
fn test_file_url_missing_dir_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    let url = url::Url::from_directory_path(temp_dir.path().join("gone"))
        .unwrap()
        .to_string();
    assert!(StorageLocation::open(&url, &creds()).is_err());
    assert!(StorageLocation::open_or_create(&url, &creds()).is_ok());
    assert!(temp_dir.path().join("gone").is_dir());
}

#[test]
fn test_open_missing_local_dir_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    let missing = temp_dir.path().join("does-not-exist");
    let result = StorageLocation::open(missing.to_str().unwrap(), &creds());
    assert!(result.is_err());
}

#[test]
fn test_open_or_create_local_dir() {
    let temp_dir = tempfile::tempdir().unwrap();
    let target = temp_dir.path().join("out");
    let location =
        StorageLocation::open_or_create(target.to_str().unwrap(), &creds()).unwrap();
    assert!(target.is_dir());
    assert_eq!(location.scheme(), "file");
}

#[test]
fn test_memory_url() {
    let location = StorageLocation::open("memory://lake/raw", &creds()).unwrap();
    assert_eq!(location.scheme(), "memory");
    assert_eq!(location.prefix(), "lake/raw");
}

#[test]
fn test_memory_url_paths() {
    let location = StorageLocation::open("memory://lake/output", &creds()).unwrap();
    assert_eq!(location.path("songs").unwrap().as_ref(), "lake/output/songs");
    assert_eq!(location.display("songs"), "memory://lake/output/songs");
}

// ============================================================================
// Query Runtime Tests
// ============================================================================

#[test]
fn test_session_url() {
    let location = StorageLocation::open("s3://bucket/lake/output/", &creds()).unwrap();
    assert_eq!(
        location.session_url("output", "songs"),
        "lake://output/lake/output/songs/"
    );
    assert_eq!(
        StorageLocation::in_memory().session_url("output", "users"),
        "lake://output/users/"
    );
}

#[test]
fn test_register_with_runtime() {
    let runtime = datafusion::execution::runtime_env::RuntimeEnv::default();
    let location = StorageLocation::in_memory();
    location.register_with(&runtime, "output").unwrap();

    let url = url::Url::parse("lake://output/songs/").unwrap();
    assert!(runtime.object_store_registry.get_store(&url).is_ok());

    let other = url::Url::parse("lake://input/").unwrap();
    assert!(runtime.object_store_registry.get_store(&other).is_err());
}

// ============================================================================
// Object Operation Tests
// ============================================================================

#[tokio::test]
async fn test_write_list_read() {
    let location = StorageLocation::open("memory://lake/root", &creds()).unwrap();
    location
        .write("songs/b.json", Bytes::from_static(b"{}"))
        .await
        .unwrap();
    location
        .write("songs/a.json", Bytes::from_static(b"[]"))
        .await
        .unwrap();
    location
        .write("other/c.json", Bytes::from_static(b"{}"))
        .await
        .unwrap();

    let objects = location.list("songs").await.unwrap();
    let names: Vec<&str> = objects
        .iter()
        .map(|meta| location.relative(&meta.location))
        .collect();
    assert_eq!(names, vec!["songs/a.json", "songs/b.json"]);

    let bytes = location.read(&objects[0].location).await.unwrap();
    assert_eq!(bytes.as_ref(), b"[]");
}

#[tokio::test]
async fn test_exists_and_delete_prefix() {
    let location = StorageLocation::in_memory();
    assert!(!location.exists("songs").await.unwrap());

    location
        .write("songs/year=2020/part-0.parquet", Bytes::from_static(b"x"))
        .await
        .unwrap();
    location
        .write("songs/_SUCCESS", Bytes::new())
        .await
        .unwrap();
    location
        .write("songsx/keep.parquet", Bytes::from_static(b"y"))
        .await
        .unwrap();
    assert!(location.exists("songs").await.unwrap());

    let removed = location.delete_prefix("songs").await.unwrap();
    assert_eq!(removed, 2);
    assert!(!location.exists("songs").await.unwrap());
    assert!(location.exists("songsx").await.unwrap());
}

#[tokio::test]
async fn test_local_write_and_list() {
    let temp_dir = tempfile::tempdir().unwrap();
    let location =
        StorageLocation::open_or_create(temp_dir.path().to_str().unwrap(), &creds()).unwrap();

    location
        .write("time/year=2018/month=11/part-00000.parquet", Bytes::from_static(b"p"))
        .await
        .unwrap();

    assert!(temp_dir
        .path()
        .join("time/year=2018/month=11/part-00000.parquet")
        .is_file());
    let objects = location.list("time").await.unwrap();
    assert_eq!(objects.len(), 1);
    assert_eq!(
        location.relative(&objects[0].location),
        "time/year=2018/month=11/part-00000.parquet"
    );
}
