//! Adapter decorator serving listings and metadata from a cache

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::{CacheBackend, CacheConfig, Operation, cache_key, generation_key};
use crate::adapter::{AdapterResult, ObjectStoreAdapter};
use crate::{Entry, StorePath, Visibility, WriteOptions};

/// Wraps an adapter so listing and metadata calls are memoized.
///
/// Mutations are delegated first and then invalidate every cached listing
/// that could contain the mutated path.
///
/// Subtree mutations (directory delete or rename) advance a namespace
/// generation instead. Generations only move forward: a generation key lost
/// from the backend is replaced by a fresh time-based value, never by a value
/// an older key was written under.
pub struct CachedAdapter<A> {
    inner: A,
    backend: Arc<dyn CacheBackend>,
    config: CacheConfig,
    last_generation: AtomicU64,
}

impl<A: ObjectStoreAdapter> CachedAdapter<A> {
    pub fn new(inner: A, backend: Arc<dyn CacheBackend>, config: CacheConfig) -> Self {
        Self {
            inner,
            backend,
            config,
            last_generation: AtomicU64::new(0),
        }
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn generation(&self) -> AdapterResult<u64> {
        let key = generation_key(&self.config.namespace);
        let stored = self
            .backend
            .get(&key)?
            .and_then(|value| value.parse::<u64>().ok());

        match stored {
            Some(generation) => {
                self.last_generation.fetch_max(generation, Ordering::Relaxed);
                Ok(generation)
            }
            None => {
                let fresh = self.next_generation(self.last_generation.load(Ordering::Relaxed));
                self.backend.set(&key, fresh.to_string(), None)?;
                tracing::debug!(namespace = %self.config.namespace, generation = fresh, "Started cache generation");
                Ok(fresh)
            }
        }
    }

    /// A generation above `current` and above every time-based value handed
    /// out before now.
    fn next_generation(&self, current: u64) -> u64 {
        let now = Utc::now()
            .timestamp_nanos_opt()
            .and_then(|nanos| u64::try_from(nanos).ok())
            .unwrap_or(0);
        let next = now.max(current.saturating_add(1));
        self.last_generation.fetch_max(next, Ordering::Relaxed);
        next
    }

    fn list_key(&self, generation: u64, directory: &StorePath, recursive: bool) -> String {
        let flag = if recursive { "recursive" } else { "shallow" };
        cache_key(
            &self.config.namespace,
            generation,
            Operation::List,
            &[directory.as_str(), flag],
        )
    }

    fn metadata_key(&self, generation: u64, path: &StorePath) -> String {
        cache_key(
            &self.config.namespace,
            generation,
            Operation::Metadata,
            &[path.as_str()],
        )
    }

    /// Serve from cache when possible, otherwise load and remember.
    ///
    /// Backend failures degrade to a plain adapter call.
    fn cached<T, K, L, S>(&self, key_for: K, load: L, should_store: S) -> AdapterResult<T>
    where
        T: Serialize + DeserializeOwned,
        K: FnOnce(u64) -> String,
        L: FnOnce() -> AdapterResult<T>,
        S: FnOnce(&T) -> bool,
    {
        let key = match self.generation() {
            Ok(generation) => Some(key_for(generation)),
            Err(e) => {
                tracing::warn!(error = %e, "Cache unavailable, bypassing");
                None
            }
        };

        if let Some(key) = &key {
            match self.backend.get(key) {
                Ok(Some(payload)) => match serde_json::from_str(&payload) {
                    Ok(value) => {
                        tracing::debug!(%key, "Cache hit");
                        return Ok(value);
                    }
                    Err(e) => tracing::warn!(%key, error = %e, "Discarding undecodable cache entry"),
                },
                Ok(None) => tracing::debug!(%key, "Cache miss"),
                Err(e) => tracing::warn!(%key, error = %e, "Cache read failed"),
            }
        }

        let value = load()?;

        if let Some(key) = key {
            if should_store(&value) {
                match serde_json::to_string(&value) {
                    Ok(payload) => {
                        if let Err(e) = self.backend.set(&key, payload, self.config.ttl) {
                            tracing::warn!(%key, error = %e, "Cache write failed");
                        }
                    }
                    Err(e) => tracing::warn!(%key, error = %e, "Could not serialize result for cache"),
                }
            }
        }

        Ok(value)
    }

    /// Drop the metadata of `path` and every listing that could contain it.
    fn invalidate(&self, path: &StorePath) -> AdapterResult<()> {
        let generation = self.generation()?;
        let mut keys = vec![self.metadata_key(generation, path)];
        for dir in std::iter::once(path.clone()).chain(path.ancestors()) {
            keys.push(self.list_key(generation, &dir, true));
            keys.push(self.list_key(generation, &dir, false));
        }
        for key in &keys {
            self.backend.delete(key)?;
        }
        tracing::debug!(%path, keys = keys.len(), "Invalidated cached entries");
        Ok(())
    }

    /// Make every existing key of this namespace unreachable.
    fn bump_generation(&self) -> AdapterResult<()> {
        let next = self.next_generation(self.generation()?);
        self.backend
            .set(&generation_key(&self.config.namespace), next.to_string(), None)?;
        tracing::debug!(namespace = %self.config.namespace, generation = next, "Advanced cache generation");
        Ok(())
    }
}

impl<A: ObjectStoreAdapter> ObjectStoreAdapter for CachedAdapter<A> {
    fn list_contents(&self, directory: &StorePath, recursive: bool) -> AdapterResult<Vec<Entry>> {
        self.cached(
            |generation| self.list_key(generation, directory, recursive),
            || self.inner.list_contents(directory, recursive),
            |_| true,
        )
    }

    fn metadata(&self, path: &StorePath) -> AdapterResult<Option<Entry>> {
        self.cached(
            |generation| self.metadata_key(generation, path),
            || self.inner.metadata(path),
            Option::is_some,
        )
    }

    fn read(&self, path: &StorePath) -> AdapterResult<Vec<u8>> {
        self.inner.read(path)
    }

    fn write(&self, path: &StorePath, contents: &[u8], options: &WriteOptions) -> AdapterResult<()> {
        self.inner.write(path, contents, options)?;
        self.invalidate(path)
    }

    fn rename(&self, from: &StorePath, to: &StorePath) -> AdapterResult<()> {
        let moves_subtree = self.inner.metadata(from)?.is_some_and(|entry| entry.is_dir());
        self.inner.rename(from, to)?;
        if moves_subtree {
            // Keys below `from` cannot be enumerated.
            return self.bump_generation();
        }
        self.invalidate(from)?;
        self.invalidate(to)
    }

    fn copy(&self, from: &StorePath, to: &StorePath) -> AdapterResult<()> {
        self.inner.copy(from, to)?;
        self.invalidate(to)
    }

    fn delete(&self, path: &StorePath) -> AdapterResult<()> {
        self.inner.delete(path)?;
        self.invalidate(path)
    }

    fn delete_dir(&self, path: &StorePath) -> AdapterResult<()> {
        self.inner.delete_dir(path)?;
        self.bump_generation()
    }

    fn create_dir(&self, path: &StorePath, options: &WriteOptions) -> AdapterResult<()> {
        self.inner.create_dir(path, options)?;
        self.invalidate(path)
    }

    fn set_visibility(&self, path: &StorePath, visibility: Visibility) -> AdapterResult<()> {
        self.inner.set_visibility(path, visibility)?;
        self.invalidate(path)
    }
}
