//! End-to-end tests for a bucket-backed filesystem
//!
//! Exercises the complete flow: settings file -> adapter -> cache wrapper ->
//! bounded filesystem -> typed handles -> decoded content.

use std::fs;
use std::io::Cursor;
use std::sync::Arc;

use assert_fs::prelude::*;
use bucket_content::{ImageExt, JsonFileExt, YamlFileExt};
use bucket_fs::{
    BoundedFilesystem, CacheBackend, CachedAdapter, ClassifiedType, LocalAdapter, MemoryCache,
    Settings, WriteOptions,
};
use bucket_test_utils::{RecordingAdapter, TestStore};
use image::{ImageFormat, RgbImage};
use pretty_assertions::assert_eq;
use predicates::prelude::*;

fn png(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Cursor::new(Vec::new());
    RgbImage::new(width, height)
        .write_to(&mut bytes, ImageFormat::Png)
        .unwrap();
    bytes.into_inner()
}

/// Build the filesystem the way a host does at startup.
fn mount(settings: &Settings, adapter: LocalAdapter, cache: &MemoryCache) -> BoundedFilesystem {
    let backend: Arc<dyn CacheBackend> = Arc::new(cache.clone());
    let cached = CachedAdapter::new(adapter, backend, settings.cache_config());
    BoundedFilesystem::builder(cached)
        .config(settings.filesystem_config())
        .mount_point(settings.filesystem_name.clone())
        .build()
}

fn settings_file(dir: &assert_fs::TempDir, limit: usize) -> Settings {
    let file = dir.child("bucketfs.toml");
    file.write_str(&format!(
        r#"
enabled = true
bucket_region = "eu-central-1"
bucket_name = "site-assets"
filesystem_prefix = "public"
filesystem_name = "assets"
file_list_limit = {limit}
cache_ttl = 600
"#
    ))
    .unwrap();
    Settings::load(file.path()).unwrap()
}

#[test]
fn test_settings_to_typed_listing() {
    let config_dir = assert_fs::TempDir::new().unwrap();
    let settings = settings_file(&config_dir, 0);

    let store = TestStore::new();
    store.put("img/logo.png", &png(16, 8));
    store.put("data/menu.json", br#"{"items": ["home", "about"]}"#);
    store.put("data/site.yaml", b"title: Home\nlang: en\n");
    store.put("docs/terms.pdf", b"%PDF-1.4");
    store.put("raw/blob.bin", &[0, 1, 2]);

    let filesystem = mount(&settings, store.adapter(), &MemoryCache::new());
    let handles = filesystem.list_contents("", true).unwrap();

    let listing: Vec<String> = handles
        .iter()
        .map(|h| format!("{} {}", h.classified_type(), h.full_path()))
        .collect();
    assert_eq!(
        listing,
        vec![
            "dir assets://data",
            "json assets://data/menu.json",
            "yaml assets://data/site.yaml",
            "dir assets://docs",
            "document assets://docs/terms.pdf",
            "dir assets://img",
            "image assets://img/logo.png",
            "dir assets://raw",
            "file assets://raw/blob.bin",
        ]
    );

    let find = |path: &str| handles.iter().find(|h| h.path().as_str() == path).unwrap();

    let menu = find("data/menu.json").as_json().unwrap().parse().unwrap();
    assert_eq!(menu["items"][0], "home");

    let site = find("data/site.yaml").as_yaml().unwrap().to_json().unwrap();
    assert_eq!(site, serde_json::json!({"lang": "en", "title": "Home"}));

    let logo = find("img/logo.png").as_image().unwrap().info().unwrap();
    assert_eq!((logo.width, logo.height), (16, 8));

    assert_eq!(
        settings.asset_url(find("img/logo.png").path()).as_deref(),
        Some("https://s3.eu-central-1.amazonaws.com/site-assets/public/img/logo.png")
    );
}

#[test]
fn test_configured_limit_truncates_listing() {
    let config_dir = assert_fs::TempDir::new().unwrap();
    let settings = settings_file(&config_dir, 2);

    let store = TestStore::new();
    for name in ["c.txt", "a.txt", "b.txt", "d.txt"] {
        store.put(&format!("inbox/{name}"), b"x");
    }

    let filesystem = mount(&settings, store.adapter(), &MemoryCache::new());
    let handles = filesystem.list_contents("inbox", false).unwrap();
    let paths: Vec<&str> = handles.iter().map(|h| h.path().as_str()).collect();

    assert_eq!(paths, vec!["inbox/a.txt", "inbox/b.txt"]);
    assert_eq!(filesystem.listing_limit(), 2);
}

#[test]
fn test_edits_through_handles_are_visible_in_listings() {
    let config_dir = assert_fs::TempDir::new().unwrap();
    let settings = settings_file(&config_dir, 0);
    let store = TestStore::new();
    store.put("data/counter.json", br#"{"hits": 1}"#);

    let filesystem = mount(&settings, store.adapter(), &MemoryCache::new());
    let before = filesystem.list_contents("data", false).unwrap();
    assert_eq!(before.len(), 1);

    let counter = before[0].as_json().unwrap();
    counter.dump(&serde_json::json!({"hits": 2})).unwrap();
    counter.rename("archive/counter.json").unwrap();
    filesystem
        .write("data/fresh.yml", "k: v\n", WriteOptions::default())
        .unwrap();

    let data: Vec<String> = filesystem
        .list_contents("data", false)
        .unwrap()
        .iter()
        .map(|h| h.path().to_string())
        .collect();
    assert_eq!(data, vec!["data/fresh.yml"]);

    let archived = filesystem.get("archive/counter.json").unwrap();
    assert_eq!(archived.classified_type(), &ClassifiedType::Json);
    let moved = store.root().join("archive/counter.json");
    assert!(predicate::path::is_file().eval(&moved));
    assert!(fs::read_to_string(moved).unwrap().contains("\"hits\": 2"));
}

#[test]
fn test_two_mounts_share_cache_by_name() {
    let config_dir = assert_fs::TempDir::new().unwrap();
    let settings = settings_file(&config_dir, 0);
    let cache = MemoryCache::new();

    let store = TestStore::new();
    store.put("a.txt", b"a");

    let first_adapter = Arc::new(RecordingAdapter::new(store.adapter()));
    let second_adapter = Arc::new(RecordingAdapter::new(store.adapter()));
    let first = BoundedFilesystem::new(
        CachedAdapter::new(first_adapter.clone(), Arc::new(cache.clone()), settings.cache_config()),
        settings.filesystem_config(),
    );
    let second = BoundedFilesystem::new(
        CachedAdapter::new(second_adapter.clone(), Arc::new(cache.clone()), settings.cache_config()),
        settings.filesystem_config(),
    );

    assert_eq!(first.list_contents("", false).unwrap().len(), 1);
    assert_eq!(second.list_contents("", false).unwrap().len(), 1);

    assert_eq!(first_adapter.list_count(), 1);
    assert_eq!(second_adapter.list_count(), 0);
}

#[test]
fn test_missing_region_is_rejected_at_startup() {
    let config_dir = assert_fs::TempDir::new().unwrap();
    let file = config_dir.child("bucketfs.yaml");
    file.write_str("enabled: true\nbucket_name: site-assets\n").unwrap();

    let err = Settings::load(file.path()).unwrap_err();

    assert!(matches!(err, bucket_fs::Error::Configuration { .. }));
}
