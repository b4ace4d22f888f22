//! Error propagation from adapters and path validation

use std::error::Error as _;

use bucket_fs::{
    AdapterError, BoundedFilesystem, Error, FilesystemConfig, MemoryAdapter, WriteOptions,
};
use bucket_test_utils::{FailingAdapter, seeded_memory};
use rstest::rstest;

fn failing_reads(paths: &[&str]) -> BoundedFilesystem {
    BoundedFilesystem::new(
        FailingAdapter::reads(seeded_memory(paths), "bucket unreachable"),
        FilesystemConfig::default(),
    )
}

#[test]
fn listing_failure_carries_directory_and_source() {
    let filesystem = failing_reads(&["docs/a.txt"]);

    let err = filesystem.list_contents("docs", true).unwrap_err();

    match &err {
        Error::Store { path, source } => {
            assert_eq!(path, "docs");
            assert!(matches!(source, AdapterError::Remote { message } if message == "bucket unreachable"));
        }
        other => panic!("expected Store error, got {other:?}"),
    }
    assert!(err.source().is_some());
    assert!(err.to_string().contains("docs"));
}

#[test]
fn listing_failure_is_not_cached_as_empty() {
    use std::sync::Arc;

    use bucket_fs::{CacheConfig, CachedAdapter, MemoryCache};

    let cache = MemoryCache::new();
    let failing = CachedAdapter::new(
        FailingAdapter::new("timeout"),
        Arc::new(cache.clone()),
        CacheConfig::new("files", 3600),
    );
    let filesystem = BoundedFilesystem::new(failing, FilesystemConfig::default());
    assert!(filesystem.list_contents("", false).is_err());

    let healthy = CachedAdapter::new(
        seeded_memory(&["a.txt"]),
        Arc::new(cache),
        CacheConfig::new("files", 3600),
    );
    let filesystem = BoundedFilesystem::new(healthy, FilesystemConfig::default());
    assert_eq!(filesystem.list_contents("", false).unwrap().len(), 1);
}

#[rstest]
#[case("../escape")]
#[case("a/../../b")]
fn paths_above_root_are_rejected(#[case] raw: &str) {
    let filesystem = BoundedFilesystem::new(MemoryAdapter::new(), FilesystemConfig::default());
    let err = filesystem.list_contents(raw, false).unwrap_err();
    assert!(matches!(err, Error::InvalidPath { .. }));
}

#[test]
fn metadata_failure_is_store_error() {
    let err = failing_reads(&["a.txt"]).get("a.txt").unwrap_err();
    assert!(matches!(err, Error::Store { ref path, .. } if path == "a.txt"));
}

#[test]
fn missing_object_is_not_found() {
    let filesystem = BoundedFilesystem::new(seeded_memory(&["a.txt"]), FilesystemConfig::default());

    assert!(matches!(filesystem.get("b.txt"), Err(Error::NotFound { .. })));
    assert!(matches!(filesystem.read("b.txt"), Err(Error::NotFound { .. })));
    assert!(!filesystem.has("b.txt").unwrap());
}

#[test]
fn write_failure_leaves_store_untouched() {
    let filesystem = BoundedFilesystem::new(
        FailingAdapter::writes(seeded_memory(&["a.txt"]), "read-only bucket"),
        FilesystemConfig::default(),
    );

    let err = filesystem
        .write("b.txt", "b", WriteOptions::default())
        .unwrap_err();

    assert!(matches!(err, Error::Store { ref path, .. } if path == "b.txt"));
    assert!(!filesystem.has("b.txt").unwrap());
    assert_eq!(filesystem.list_contents("", false).unwrap().len(), 1);
}

#[rstest]
#[case::write("write")]
#[case::delete("delete")]
#[case::set_visibility("set_visibility")]
fn root_is_not_a_file(#[case] operation: &str) {
    let filesystem = BoundedFilesystem::new(MemoryAdapter::new(), FilesystemConfig::default());
    let result = match operation {
        "write" => filesystem.write("/", "x", WriteOptions::default()),
        "delete" => filesystem.delete(""),
        _ => filesystem.set_visibility(".", bucket_fs::Visibility::Private),
    };
    assert!(matches!(result, Err(Error::InvalidPath { .. })));
}

#[test]
fn handle_reports_detached_filesystem() {
    let filesystem = BoundedFilesystem::new(seeded_memory(&["a.txt"]), FilesystemConfig::default());
    let handles = filesystem.list_contents("", false).unwrap();
    drop(filesystem);

    let err = handles[0].read().unwrap_err();
    assert!(matches!(err, Error::Detached { ref path } if path == "a.txt"));
}
