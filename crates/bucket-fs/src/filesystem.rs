//! Bounded-listing filesystem facade
//!
//! Orchestrates adapter calls, classification and handle construction, and
//! enforces the listing ceiling.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use crate::adapter::ObjectStoreAdapter;
use crate::{
    Classifier, Entry, Error, FilesystemConfig, Handle, ListingFormatter, Result, StorePath,
    Visibility, WriteOptions,
};

pub(crate) struct Shared {
    adapter: Box<dyn ObjectStoreAdapter>,
    config: FilesystemConfig,
    classifier: Classifier,
    listing_limit: AtomicUsize,
    mount_point: Option<String>,
}

/// Filesystem over an object-store adapter.
///
/// Cloning is cheap and clones share state. Handles returned from listings
/// hold a weak reference back to it.
#[derive(Clone)]
pub struct BoundedFilesystem {
    shared: Arc<Shared>,
}

/// Builder for [`BoundedFilesystem`].
pub struct FilesystemBuilder {
    adapter: Box<dyn ObjectStoreAdapter>,
    config: FilesystemConfig,
    mount_point: Option<String>,
}

impl FilesystemBuilder {
    pub fn config(mut self, config: FilesystemConfig) -> Self {
        self.config = config;
        self
    }

    /// Name the host mounts this filesystem under.
    pub fn mount_point(mut self, mount_point: impl Into<String>) -> Self {
        self.mount_point = Some(mount_point.into());
        self
    }

    pub fn build(self) -> BoundedFilesystem {
        let classifier = Classifier::new(self.config.document_extensions.iter().cloned());
        BoundedFilesystem {
            shared: Arc::new(Shared {
                adapter: self.adapter,
                listing_limit: AtomicUsize::new(self.config.listing_limit),
                config: self.config,
                classifier,
                mount_point: self.mount_point,
            }),
        }
    }
}

impl BoundedFilesystem {
    /// Create a filesystem over an already constructed (and typically
    /// cache-wrapped) adapter.
    pub fn new(adapter: impl ObjectStoreAdapter + 'static, config: FilesystemConfig) -> Self {
        Self::builder(adapter).config(config).build()
    }

    pub fn builder(adapter: impl ObjectStoreAdapter + 'static) -> FilesystemBuilder {
        FilesystemBuilder {
            adapter: Box::new(adapter),
            config: FilesystemConfig::default(),
            mount_point: None,
        }
    }

    pub(crate) fn from_shared(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    pub(crate) fn downgrade(&self) -> Weak<Shared> {
        Arc::downgrade(&self.shared)
    }

    pub fn config(&self) -> &FilesystemConfig {
        &self.shared.config
    }

    pub fn classifier(&self) -> &Classifier {
        &self.shared.classifier
    }

    pub fn mount_point(&self) -> Option<&str> {
        self.shared.mount_point.as_deref()
    }

    pub fn listing_limit(&self) -> usize {
        self.shared.listing_limit.load(Ordering::Relaxed)
    }

    /// Cap the number of handles a listing returns; `0` removes the cap.
    ///
    /// Set before the filesystem is used for listing. Listings already in
    /// flight may observe either value.
    pub fn set_listing_limit(&self, limit: usize) {
        self.shared.listing_limit.store(limit, Ordering::Relaxed);
    }

    fn adapter(&self) -> &dyn ObjectStoreAdapter {
        self.shared.adapter.as_ref()
    }

    /// List the contents of `directory` as typed handles.
    ///
    /// The listing is formatted, classified and converted to handles, then cut
    /// to the configured limit, keeping listing order. The limit applies to
    /// the flattened result of recursive listings. Any adapter failure fails
    /// the whole call.
    pub fn list_contents(&self, directory: &str, recursive: bool) -> Result<Vec<Handle>> {
        let directory = StorePath::parse(directory)?;

        let raw = self
            .adapter()
            .list_contents(&directory, recursive)
            .map_err(|source| Error::Store {
                path: directory.to_string(),
                source,
            })?;

        let listing = ListingFormatter::new(&directory, recursive).format(raw);
        let found = listing.len();
        let limit = self.listing_limit();
        let cap = if limit == 0 { usize::MAX } else { limit };

        let handles: Vec<Handle> = listing
            .into_iter()
            .map(|entry| self.create_handle(entry))
            .take(cap)
            .collect();

        if handles.len() < found {
            tracing::debug!(
                %directory,
                found,
                returned = handles.len(),
                limit,
                "Listing truncated to limit"
            );
        }

        Ok(handles)
    }

    fn create_handle(&self, entry: Entry) -> Handle {
        let classified = self.shared.classifier.classify(&entry);
        Handle::create(entry, classified, self)
    }

    /// Handle for a single path, typed from its metadata.
    pub fn get(&self, path: &str) -> Result<Handle> {
        let entry = self.metadata(path)?;
        Ok(self.create_handle(entry))
    }

    pub fn metadata(&self, path: &str) -> Result<Entry> {
        let path = StorePath::parse(path)?;
        self.adapter()
            .metadata(&path)
            .map_err(|e| Error::store(path.as_str(), e))?
            .ok_or_else(|| Error::NotFound {
                path: path.to_string(),
            })
    }

    pub fn has(&self, path: &str) -> Result<bool> {
        let path = StorePath::parse(path)?;
        if path.is_root() {
            return Ok(true);
        }
        self.adapter()
            .has(&path)
            .map_err(|e| Error::store(path.as_str(), e))
    }

    pub fn read(&self, path: &str) -> Result<Vec<u8>> {
        let path = StorePath::parse(path)?;
        self.adapter()
            .read(&path)
            .map_err(|e| Error::store(path.as_str(), e))
    }

    pub fn read_to_string(&self, path: &str) -> Result<String> {
        let bytes = self.read(path)?;
        String::from_utf8(bytes).map_err(|_| Error::NotUtf8 {
            path: path.to_string(),
        })
    }

    /// Create or overwrite an object. Without an explicit visibility the
    /// configured default applies.
    pub fn write(&self, path: &str, contents: impl AsRef<[u8]>, options: WriteOptions) -> Result<()> {
        let path = Self::file_path(path)?;
        let options = WriteOptions {
            visibility: Some(options.visibility.unwrap_or(self.shared.config.visibility)),
            ..options
        };
        self.adapter()
            .write(&path, contents.as_ref(), &options)
            .map_err(|e| Error::store(path.as_str(), e))
    }

    pub fn rename(&self, from: &str, to: &str) -> Result<()> {
        let from = Self::file_path(from)?;
        let to = Self::file_path(to)?;
        self.adapter()
            .rename(&from, &to)
            .map_err(|e| Error::store(from.as_str(), e))
    }

    pub fn copy(&self, from: &str, to: &str) -> Result<()> {
        let from = Self::file_path(from)?;
        let to = Self::file_path(to)?;
        self.adapter()
            .copy(&from, &to)
            .map_err(|e| Error::store(from.as_str(), e))
    }

    pub fn delete(&self, path: &str) -> Result<()> {
        let path = Self::file_path(path)?;
        self.adapter()
            .delete(&path)
            .map_err(|e| Error::store(path.as_str(), e))
    }

    /// Delete a directory and everything beneath it. The root is refused.
    pub fn delete_dir(&self, path: &str) -> Result<()> {
        let path = Self::file_path(path)?;
        self.adapter()
            .delete_dir(&path)
            .map_err(|e| Error::store(path.as_str(), e))
    }

    /// Create a directory. Created directories are always public, whatever
    /// visibility the caller asked for.
    pub fn create_dir(&self, path: &str, options: WriteOptions) -> Result<()> {
        let path = StorePath::parse(path)?;
        let options = options.with_visibility(Visibility::Public);
        self.adapter()
            .create_dir(&path, &options)
            .map_err(|e| Error::store(path.as_str(), e))
    }

    pub fn visibility(&self, path: &str) -> Result<Visibility> {
        let entry = self.metadata(path)?;
        Ok(entry.visibility.unwrap_or(self.shared.config.visibility))
    }

    pub fn set_visibility(&self, path: &str, visibility: Visibility) -> Result<()> {
        let path = Self::file_path(path)?;
        self.adapter()
            .set_visibility(&path, visibility)
            .map_err(|e| Error::store(path.as_str(), e))
    }

    /// Parse a path that must name something below the root.
    fn file_path(raw: &str) -> Result<StorePath> {
        let path = StorePath::parse(raw)?;
        if path.is_root() {
            return Err(Error::invalid_path(raw, "operation not allowed on the root"));
        }
        Ok(path)
    }
}

impl fmt::Debug for BoundedFilesystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedFilesystem")
            .field("mount_point", &self.shared.mount_point)
            .field("listing_limit", &self.listing_limit())
            .field("config", &self.shared.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryAdapter;

    fn filesystem() -> BoundedFilesystem {
        BoundedFilesystem::new(MemoryAdapter::new(), FilesystemConfig::default())
    }

    #[test]
    fn listing_limit_defaults_from_config() {
        let filesystem = BoundedFilesystem::new(
            MemoryAdapter::new(),
            FilesystemConfig::default().with_listing_limit(7),
        );
        assert_eq!(filesystem.listing_limit(), 7);
        filesystem.set_listing_limit(0);
        assert_eq!(filesystem.listing_limit(), 0);
    }

    #[test]
    fn write_applies_default_visibility() {
        let filesystem = filesystem();
        filesystem.write("a.txt", "a", WriteOptions::default()).unwrap();
        assert_eq!(filesystem.visibility("a.txt").unwrap(), Visibility::Public);

        filesystem
            .write("b.txt", "b", WriteOptions::new().with_visibility(Visibility::Private))
            .unwrap();
        assert_eq!(filesystem.visibility("b.txt").unwrap(), Visibility::Private);
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = filesystem().read("missing.txt").unwrap_err();
        assert!(matches!(err, Error::NotFound { path } if path == "missing.txt"));
    }

    #[test]
    fn root_cannot_be_deleted() {
        let err = filesystem().delete_dir("/").unwrap_err();
        assert!(matches!(err, Error::InvalidPath { .. }));
    }

    #[test]
    fn invalid_utf8_is_reported() {
        let filesystem = filesystem();
        filesystem
            .write("bin.dat", [0xffu8, 0xfe], WriteOptions::default())
            .unwrap();
        let err = filesystem.read_to_string("bin.dat").unwrap_err();
        assert!(matches!(err, Error::NotUtf8 { .. }));
    }

    #[test]
    fn get_types_handle_from_metadata() {
        let filesystem = filesystem();
        filesystem
            .write("conf/app.yml", "a: 1", WriteOptions::default())
            .unwrap();
        assert!(filesystem.get("conf/app.yml").unwrap().as_yaml().is_some());
        assert!(filesystem.get("conf").unwrap().is_dir());
    }
}
