//! Adapter mapping the store onto a local directory

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use fs2::FileExt;

use super::{AdapterError, AdapterResult, ObjectStoreAdapter};
use crate::{Entry, StorePath, Visibility, WriteOptions};

/// Store backed by a directory on the local filesystem.
///
/// Useful for development and tests where a bucket is not available.
#[derive(Debug, Clone)]
pub struct LocalAdapter {
    root: PathBuf,
}

impl LocalAdapter {
    /// Create an adapter rooted at `root`, creating the directory if needed.
    pub fn new(root: impl AsRef<Path>) -> AdapterResult<Self> {
        let root = root.as_ref();
        fs::create_dir_all(root).map_err(|e| AdapterError::io(root, e))?;
        let root = dunce::canonicalize(root).map_err(|e| AdapterError::io(root, e))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn native(&self, path: &StorePath) -> PathBuf {
        if path.is_root() {
            self.root.clone()
        } else {
            self.root.join(path.as_str())
        }
    }

    fn entry_for(&self, path: StorePath, metadata: &fs::Metadata) -> Entry {
        let mut entry = if metadata.is_dir() {
            Entry::dir(path)
        } else {
            Entry::file(path, metadata.len())
        };
        if let Ok(modified) = metadata.modified() {
            entry.timestamp = Some(DateTime::<Utc>::from(modified));
        }
        entry.visibility = visibility_of(metadata);
        entry
    }

    fn walk(
        &self,
        dir: &Path,
        prefix: &StorePath,
        recursive: bool,
        out: &mut Vec<Entry>,
    ) -> AdapterResult<()> {
        let read_dir = fs::read_dir(dir).map_err(|e| map_io(prefix, dir, e))?;
        for item in read_dir {
            let item = item.map_err(|e| AdapterError::io(dir, e))?;
            let name = item.file_name().to_string_lossy().into_owned();
            if is_temp_name(&name) {
                continue;
            }
            let Ok(path) = prefix.join(&name) else {
                continue;
            };
            let metadata = item
                .metadata()
                .map_err(|e| AdapterError::io(item.path(), e))?;
            let is_dir = metadata.is_dir();
            out.push(self.entry_for(path.clone(), &metadata));
            if recursive && is_dir {
                self.walk(&item.path(), &path, true, out)?;
            }
        }
        Ok(())
    }
}

const TEMP_SUFFIX: &str = ".bucketfs.tmp";

static TEMP_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Name of the staging file for one write: `.{name}.{pid}-{seq}.bucketfs.tmp`.
fn temp_name(file_name: &str) -> String {
    let seq = TEMP_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!(".{}.{}-{}{}", file_name, std::process::id(), seq, TEMP_SUFFIX)
}

/// Whether `name` has exactly the shape produced by [`temp_name`].
fn is_temp_name(name: &str) -> bool {
    let Some(body) = name
        .strip_prefix('.')
        .and_then(|rest| rest.strip_suffix(TEMP_SUFFIX))
    else {
        return false;
    };
    let Some((stem, tag)) = body.rsplit_once('.') else {
        return false;
    };
    let Some((pid, seq)) = tag.split_once('-') else {
        return false;
    };
    let is_number = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    !stem.is_empty() && is_number(pid) && is_number(seq)
}

fn map_io(path: &StorePath, native: &Path, err: std::io::Error) -> AdapterError {
    if err.kind() == ErrorKind::NotFound {
        AdapterError::not_found(path)
    } else {
        AdapterError::io(native, err)
    }
}

#[cfg(unix)]
fn visibility_of(metadata: &fs::Metadata) -> Option<Visibility> {
    use std::os::unix::fs::PermissionsExt;
    if metadata.permissions().mode() & 0o004 != 0 {
        Some(Visibility::Public)
    } else {
        Some(Visibility::Private)
    }
}

#[cfg(not(unix))]
fn visibility_of(_metadata: &fs::Metadata) -> Option<Visibility> {
    None
}

#[cfg(unix)]
fn apply_visibility(native: &Path, visibility: Visibility) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let is_dir = fs::metadata(native)?.is_dir();
    let mode = match (visibility, is_dir) {
        (Visibility::Public, true) => 0o755,
        (Visibility::Private, true) => 0o700,
        (Visibility::Public, false) => 0o644,
        (Visibility::Private, false) => 0o600,
    };
    fs::set_permissions(native, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn apply_visibility(_native: &Path, _visibility: Visibility) -> std::io::Result<()> {
    Ok(())
}

/// Write content atomically with an exclusive lock on the temp file.
///
/// Writes to a sibling temp file and renames it into place, so readers never
/// see a partial object.
fn write_atomic(native_path: &Path, content: &[u8]) -> AdapterResult<()> {
    if let Some(parent) = native_path.parent() {
        fs::create_dir_all(parent).map_err(|e| AdapterError::io(parent, e))?;
    }

    let file_name = native_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_path = native_path.with_file_name(temp_name(&file_name));

    // Every write stages into its own file, so concurrent writers never share one.
    let mut temp_file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&temp_path)
        .map_err(|e| AdapterError::io(&temp_path, e))?;

    FileExt::lock_exclusive(&temp_file).map_err(|e| AdapterError::io(&temp_path, e))?;
    temp_file
        .write_all(content)
        .map_err(|e| AdapterError::io(&temp_path, e))?;
    temp_file
        .sync_all()
        .map_err(|e| AdapterError::io(&temp_path, e))?;
    // Lock is released when the handle drops.
    drop(temp_file);

    fs::rename(&temp_path, native_path).map_err(|e| AdapterError::io(native_path, e))
}

impl ObjectStoreAdapter for LocalAdapter {
    fn list_contents(&self, directory: &StorePath, recursive: bool) -> AdapterResult<Vec<Entry>> {
        let native = self.native(directory);
        let mut entries = Vec::new();
        if !native.is_dir() {
            return Ok(entries);
        }
        self.walk(&native, directory, recursive, &mut entries)?;
        Ok(entries)
    }

    fn metadata(&self, path: &StorePath) -> AdapterResult<Option<Entry>> {
        let native = self.native(path);
        match fs::metadata(&native) {
            Ok(metadata) => Ok(Some(self.entry_for(path.clone(), &metadata))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AdapterError::io(native, e)),
        }
    }

    fn read(&self, path: &StorePath) -> AdapterResult<Vec<u8>> {
        let native = self.native(path);
        fs::read(&native).map_err(|e| map_io(path, &native, e))
    }

    fn write(&self, path: &StorePath, contents: &[u8], options: &WriteOptions) -> AdapterResult<()> {
        let native = self.native(path);
        write_atomic(&native, contents)?;
        if let Some(visibility) = options.visibility {
            apply_visibility(&native, visibility).map_err(|e| AdapterError::io(&native, e))?;
        }
        Ok(())
    }

    fn rename(&self, from: &StorePath, to: &StorePath) -> AdapterResult<()> {
        let source = self.native(from);
        let target = self.native(to);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| AdapterError::io(parent, e))?;
        }
        fs::rename(&source, &target).map_err(|e| map_io(from, &source, e))
    }

    fn copy(&self, from: &StorePath, to: &StorePath) -> AdapterResult<()> {
        let source = self.native(from);
        let target = self.native(to);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| AdapterError::io(parent, e))?;
        }
        fs::copy(&source, &target)
            .map(|_| ())
            .map_err(|e| map_io(from, &source, e))
    }

    fn delete(&self, path: &StorePath) -> AdapterResult<()> {
        let native = self.native(path);
        fs::remove_file(&native).map_err(|e| map_io(path, &native, e))
    }

    fn delete_dir(&self, path: &StorePath) -> AdapterResult<()> {
        let native = self.native(path);
        match fs::remove_dir_all(&native) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(AdapterError::io(native, e)),
            _ => Ok(()),
        }
    }

    fn create_dir(&self, path: &StorePath, options: &WriteOptions) -> AdapterResult<()> {
        let native = self.native(path);
        fs::create_dir_all(&native).map_err(|e| AdapterError::io(&native, e))?;
        if let Some(visibility) = options.visibility {
            apply_visibility(&native, visibility).map_err(|e| AdapterError::io(&native, e))?;
        }
        Ok(())
    }

    fn set_visibility(&self, path: &StorePath, visibility: Visibility) -> AdapterResult<()> {
        let native = self.native(path);
        apply_visibility(&native, visibility).map_err(|e| map_io(path, &native, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_names_are_unique_per_write() {
        let first = temp_name("a.json");
        let second = temp_name("a.json");
        assert_ne!(first, second);
        assert!(is_temp_name(&first));
        assert!(is_temp_name(&second));
    }

    #[test]
    fn ordinary_dot_files_are_not_temp_files() {
        assert!(!is_temp_name(".draft.tmp"));
        assert!(!is_temp_name(".cache.12.tmp"));
        assert!(!is_temp_name(".a.json.12.bucketfs.tmp"));
        assert!(!is_temp_name("..1-2.bucketfs.tmp"));
        assert!(is_temp_name(".a.json.12-3.bucketfs.tmp"));
    }
}
