//! Object store adapter abstraction
//!
//! An adapter translates filesystem-style calls into raw store operations.
//! Everything above it (caching, classification, limits) is store-agnostic.

mod local;
mod memory;

pub use local::LocalAdapter;
pub use memory::MemoryAdapter;

use std::path::PathBuf;
use std::sync::Arc;

use crate::cache::CacheError;
use crate::{Entry, StorePath, Visibility, WriteOptions};

/// Result type for adapter operations
pub type AdapterResult<T> = std::result::Result<T, AdapterError>;

/// Failures reported by an adapter
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error("object not found: {path}")]
    NotFound { path: String },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cache backend failure: {0}")]
    Cache(#[from] CacheError),

    #[error("remote store error: {message}")]
    Remote { message: String },
}

impl AdapterError {
    pub fn not_found(path: &StorePath) -> Self {
        Self::NotFound {
            path: path.to_string(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote {
            message: message.into(),
        }
    }
}

/// Raw operations against a bucket or prefix.
///
/// Calls are blocking; cancellation and retries belong to the store client
/// behind the implementation.
pub trait ObjectStoreAdapter: Send + Sync {
    /// List entries under `directory`, descending into subdirectories when
    /// `recursive` is set.
    fn list_contents(&self, directory: &StorePath, recursive: bool) -> AdapterResult<Vec<Entry>>;

    /// Metadata for a single object, `None` when absent.
    fn metadata(&self, path: &StorePath) -> AdapterResult<Option<Entry>>;

    fn has(&self, path: &StorePath) -> AdapterResult<bool> {
        Ok(self.metadata(path)?.is_some())
    }

    fn read(&self, path: &StorePath) -> AdapterResult<Vec<u8>>;

    /// Create or overwrite an object.
    fn write(&self, path: &StorePath, contents: &[u8], options: &WriteOptions) -> AdapterResult<()>;

    fn rename(&self, from: &StorePath, to: &StorePath) -> AdapterResult<()>;

    fn copy(&self, from: &StorePath, to: &StorePath) -> AdapterResult<()>;

    fn delete(&self, path: &StorePath) -> AdapterResult<()>;

    /// Delete a directory and everything beneath it.
    fn delete_dir(&self, path: &StorePath) -> AdapterResult<()>;

    fn create_dir(&self, path: &StorePath, options: &WriteOptions) -> AdapterResult<()>;

    fn set_visibility(&self, path: &StorePath, visibility: Visibility) -> AdapterResult<()>;
}

impl<A: ObjectStoreAdapter + ?Sized> ObjectStoreAdapter for Arc<A> {
    fn list_contents(&self, directory: &StorePath, recursive: bool) -> AdapterResult<Vec<Entry>> {
        (**self).list_contents(directory, recursive)
    }

    fn metadata(&self, path: &StorePath) -> AdapterResult<Option<Entry>> {
        (**self).metadata(path)
    }

    fn has(&self, path: &StorePath) -> AdapterResult<bool> {
        (**self).has(path)
    }

    fn read(&self, path: &StorePath) -> AdapterResult<Vec<u8>> {
        (**self).read(path)
    }

    fn write(&self, path: &StorePath, contents: &[u8], options: &WriteOptions) -> AdapterResult<()> {
        (**self).write(path, contents, options)
    }

    fn rename(&self, from: &StorePath, to: &StorePath) -> AdapterResult<()> {
        (**self).rename(from, to)
    }

    fn copy(&self, from: &StorePath, to: &StorePath) -> AdapterResult<()> {
        (**self).copy(from, to)
    }

    fn delete(&self, path: &StorePath) -> AdapterResult<()> {
        (**self).delete(path)
    }

    fn delete_dir(&self, path: &StorePath) -> AdapterResult<()> {
        (**self).delete_dir(path)
    }

    fn create_dir(&self, path: &StorePath, options: &WriteOptions) -> AdapterResult<()> {
        (**self).create_dir(path, options)
    }

    fn set_visibility(&self, path: &StorePath, visibility: Visibility) -> AdapterResult<()> {
        (**self).set_visibility(path, visibility)
    }
}
