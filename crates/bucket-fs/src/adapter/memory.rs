//! In-memory object store emulation

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};

use super::{AdapterError, AdapterResult, ObjectStoreAdapter};
use crate::{Entry, StorePath, Visibility, WriteOptions};

#[derive(Debug, Clone)]
struct StoredObject {
    contents: Vec<u8>,
    visibility: Visibility,
    mimetype: Option<String>,
    timestamp: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct State {
    /// Flat object keys, as a bucket holds them.
    objects: BTreeMap<String, StoredObject>,
    /// Explicit directory markers created through `create_dir`.
    markers: BTreeMap<String, Visibility>,
}

impl State {
    fn is_dir(&self, path: &StorePath) -> bool {
        if path.is_root() || self.markers.contains_key(path.as_str()) {
            return true;
        }
        let prefix = format!("{}/", path.as_str());
        self.objects.keys().any(|key| key.starts_with(&prefix))
            || self.markers.keys().any(|key| key.starts_with(&prefix))
    }

    fn file_entry(&self, key: &str, object: &StoredObject) -> Option<Entry> {
        let path = StorePath::parse(key).ok()?;
        let mut entry = Entry::file(path, object.contents.len() as u64)
            .with_timestamp(object.timestamp)
            .with_visibility(object.visibility);
        entry.mimetype = object.mimetype.clone();
        Some(entry)
    }

    fn dir_entry(&self, path: StorePath) -> Entry {
        let visibility = self
            .markers
            .get(path.as_str())
            .copied()
            .unwrap_or_default();
        Entry::dir(path).with_visibility(visibility)
    }
}

/// Object store held entirely in memory.
///
/// Keys are flat; directories exist implicitly through key prefixes or
/// explicitly through markers, and listings synthesize directory entries the
/// way remote buckets do. Thread-safe.
#[derive(Debug, Default)]
pub struct MemoryAdapter {
    state: RwLock<State>,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects, directory markers excluded.
    pub fn object_count(&self) -> usize {
        self.read_state().objects.len()
    }

    fn read_state(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Directories between `directory` and `path` that a listing should report.
fn implied_dirs(directory: &StorePath, path: &StorePath, recursive: bool) -> Vec<StorePath> {
    let mut dirs: Vec<StorePath> = path
        .ancestors()
        .into_iter()
        .filter(|ancestor| ancestor.starts_with_dir(directory))
        .collect();
    if !recursive {
        // Only the first level below the queried directory is visible.
        dirs.retain(|dir| dir.parent().as_ref() == Some(directory));
    }
    dirs
}

impl ObjectStoreAdapter for MemoryAdapter {
    fn list_contents(&self, directory: &StorePath, recursive: bool) -> AdapterResult<Vec<Entry>> {
        let state = self.read_state();
        let mut listing: BTreeMap<StorePath, Entry> = BTreeMap::new();

        for (key, object) in &state.objects {
            let Some(entry) = state.file_entry(key, object) else {
                continue;
            };
            if !entry.path.starts_with_dir(directory) {
                continue;
            }
            for dir in implied_dirs(directory, &entry.path, recursive) {
                listing
                    .entry(dir.clone())
                    .or_insert_with(|| state.dir_entry(dir));
            }
            if recursive || entry.path.parent().as_ref() == Some(directory) {
                listing.insert(entry.path.clone(), entry);
            }
        }

        for key in state.markers.keys() {
            let Ok(marker) = StorePath::parse(key) else {
                continue;
            };
            if !marker.starts_with_dir(directory) {
                continue;
            }
            let mut dirs = implied_dirs(directory, &marker, recursive);
            if recursive || marker.parent().as_ref() == Some(directory) {
                dirs.push(marker);
            }
            for dir in dirs {
                listing
                    .entry(dir.clone())
                    .or_insert_with(|| state.dir_entry(dir));
            }
        }

        Ok(listing.into_values().collect())
    }

    fn metadata(&self, path: &StorePath) -> AdapterResult<Option<Entry>> {
        let state = self.read_state();
        if let Some(object) = state.objects.get(path.as_str()) {
            return Ok(state.file_entry(path.as_str(), object));
        }
        if state.is_dir(path) {
            return Ok(Some(state.dir_entry(path.clone())));
        }
        Ok(None)
    }

    fn read(&self, path: &StorePath) -> AdapterResult<Vec<u8>> {
        self.read_state()
            .objects
            .get(path.as_str())
            .map(|object| object.contents.clone())
            .ok_or_else(|| AdapterError::not_found(path))
    }

    fn write(&self, path: &StorePath, contents: &[u8], options: &WriteOptions) -> AdapterResult<()> {
        let object = StoredObject {
            contents: contents.to_vec(),
            visibility: options.visibility.unwrap_or_default(),
            mimetype: options.mimetype.clone(),
            timestamp: Utc::now(),
        };
        self.write_state()
            .objects
            .insert(path.as_str().to_string(), object);
        Ok(())
    }

    fn rename(&self, from: &StorePath, to: &StorePath) -> AdapterResult<()> {
        let mut state = self.write_state();
        let object = state
            .objects
            .remove(from.as_str())
            .ok_or_else(|| AdapterError::not_found(from))?;
        state.objects.insert(to.as_str().to_string(), object);
        Ok(())
    }

    fn copy(&self, from: &StorePath, to: &StorePath) -> AdapterResult<()> {
        let mut state = self.write_state();
        let mut object = state
            .objects
            .get(from.as_str())
            .cloned()
            .ok_or_else(|| AdapterError::not_found(from))?;
        object.timestamp = Utc::now();
        state.objects.insert(to.as_str().to_string(), object);
        Ok(())
    }

    fn delete(&self, path: &StorePath) -> AdapterResult<()> {
        self.write_state()
            .objects
            .remove(path.as_str())
            .map(|_| ())
            .ok_or_else(|| AdapterError::not_found(path))
    }

    fn delete_dir(&self, path: &StorePath) -> AdapterResult<()> {
        let mut state = self.write_state();
        let inside = |key: &str| {
            StorePath::parse(key)
                .map(|key| key == *path || key.starts_with_dir(path))
                .unwrap_or(false)
        };
        state.objects.retain(|key, _| !inside(key));
        state.markers.retain(|key, _| !inside(key));
        Ok(())
    }

    fn create_dir(&self, path: &StorePath, options: &WriteOptions) -> AdapterResult<()> {
        self.write_state().markers.insert(
            path.as_str().to_string(),
            options.visibility.unwrap_or_default(),
        );
        Ok(())
    }

    fn set_visibility(&self, path: &StorePath, visibility: Visibility) -> AdapterResult<()> {
        let mut state = self.write_state();
        if let Some(object) = state.objects.get_mut(path.as_str()) {
            object.visibility = visibility;
            return Ok(());
        }
        if let Some(marker) = state.markers.get_mut(path.as_str()) {
            *marker = visibility;
            return Ok(());
        }
        Err(AdapterError::not_found(path))
    }
}
