//! Seeded stores for test setup.

use std::path::Path;

use bucket_fs::{LocalAdapter, MemoryAdapter, ObjectStoreAdapter, StorePath, WriteOptions};
use tempfile::TempDir;

/// A [`MemoryAdapter`] holding one object per path, each containing its own
/// path as text.
pub fn seeded_memory(paths: &[&str]) -> MemoryAdapter {
    let adapter = MemoryAdapter::new();
    for path in paths {
        let key = StorePath::parse(path).unwrap();
        adapter
            .write(&key, path.as_bytes(), &WriteOptions::default())
            .unwrap();
    }
    adapter
}

/// A [`LocalAdapter`] rooted in a temporary directory that lives as long as
/// the `TestStore`.
///
/// # Example
///
/// ```rust,no_run
/// use bucket_test_utils::TestStore;
///
/// let store = TestStore::new();
/// store.put("img/logo.png", b"\x89PNG");
/// assert!(store.root().join("img/logo.png").exists());
/// ```
pub struct TestStore {
    temp_dir: TempDir,
    adapter: LocalAdapter,
}

impl Default for TestStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TestStore {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let adapter = LocalAdapter::new(temp_dir.path()).unwrap();
        Self { temp_dir, adapter }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// A fresh adapter over the same directory.
    pub fn adapter(&self) -> LocalAdapter {
        self.adapter.clone()
    }

    /// Write a file directly, bypassing any cache.
    pub fn put(&self, path: &str, contents: &[u8]) {
        let key = StorePath::parse(path).unwrap();
        self.adapter
            .write(&key, contents, &WriteOptions::default())
            .unwrap();
    }
}
