//! Keyed, time-bounded caching of adapter results
//!
//! The backend is a plain key-value store with optional per-entry TTL, so an
//! in-process map and a networked store are interchangeable.

mod cached;
mod memory;

pub use cached::CachedAdapter;
pub use memory::MemoryCache;

use std::time::Duration;

use sha2::{Digest, Sha256};

/// Failure reported by a cache backend
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct CacheError {
    pub message: String,
}

impl CacheError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Key-value storage for serialized adapter results.
///
/// Implementations must tolerate concurrent reads and writes to the same key;
/// last writer wins.
pub trait CacheBackend: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store `value` under `key`. `None` means the entry never expires.
    fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<(), CacheError>;

    fn delete(&self, key: &str) -> Result<(), CacheError>;
}

/// Settings for a [`CachedAdapter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Logical filesystem name every key is derived from. Instances sharing a
    /// namespace share entries.
    pub namespace: String,
    pub ttl: Option<Duration>,
}

impl CacheConfig {
    /// A TTL of `0` seconds keeps entries until evicted or invalidated.
    pub fn new(namespace: impl Into<String>, ttl_secs: u64) -> Self {
        Self {
            namespace: namespace.into(),
            ttl: (ttl_secs > 0).then(|| Duration::from_secs(ttl_secs)),
        }
    }
}

/// Cached operations, used as part of the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operation {
    List,
    Metadata,
}

impl Operation {
    fn as_str(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Metadata => "meta",
        }
    }
}

/// Build a deterministic key: `"{namespace}:{generation}:{operation}:{sha256}"`.
///
/// Arguments are hashed so arbitrary object keys never leak separators or
/// unbounded length into the cache key.
pub(crate) fn cache_key(namespace: &str, generation: u64, operation: Operation, args: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for arg in args {
        hasher.update(arg.as_bytes());
        hasher.update([0u8]);
    }
    format!(
        "{}:{}:{}:{:x}",
        namespace,
        generation,
        operation.as_str(),
        hasher.finalize()
    )
}

pub(crate) fn generation_key(namespace: &str) -> String {
    format!("{namespace}:generation")
}
