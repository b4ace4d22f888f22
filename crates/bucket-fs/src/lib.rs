//! Bounded, cached filesystem over object-store adapters
//!
//! Decorates an [`ObjectStoreAdapter`] with a keyed listing/metadata cache,
//! classifies listed objects into typed [`Handle`]s and caps every listing at
//! a configured ceiling.

pub mod adapter;
pub mod cache;
pub mod classify;
pub mod config;
pub mod entry;
pub mod error;
pub mod filesystem;
pub mod handle;
pub mod listing;
pub mod logging;
pub mod path;

pub use adapter::{AdapterError, AdapterResult, LocalAdapter, MemoryAdapter, ObjectStoreAdapter};
pub use cache::{CacheBackend, CacheConfig, CacheError, CachedAdapter, MemoryCache};
pub use classify::{ClassifiedType, Classifier};
pub use config::{FilesystemConfig, Settings};
pub use entry::{Entry, EntryKind, Visibility, WriteOptions};
pub use error::{Error, Result};
pub use filesystem::{BoundedFilesystem, FilesystemBuilder};
pub use handle::{
    DirectoryHandle, FileHandle, Handle, HandleCore, ImageHandle, JsonFileHandle, YamlFileHandle,
};
pub use listing::ListingFormatter;
pub use path::StorePath;
