//! [`RecordingAdapter`] for asserting on adapter traffic.

use std::sync::Mutex;

use bucket_fs::{AdapterResult, Entry, ObjectStoreAdapter, StorePath, Visibility, WriteOptions};

/// One call seen by a [`RecordingAdapter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List { directory: String, recursive: bool },
    Metadata { path: String },
    Read { path: String },
    Write { path: String, options: WriteOptions },
    Rename { from: String, to: String },
    Copy { from: String, to: String },
    Delete { path: String },
    DeleteDir { path: String },
    CreateDir { path: String, options: WriteOptions },
    SetVisibility { path: String, visibility: Visibility },
}

/// Decorates an adapter and records every call made through it.
///
/// Share it with `Arc` to keep a handle for assertions after it has been
/// moved into a cache wrapper or filesystem.
pub struct RecordingAdapter<A> {
    inner: A,
    calls: Mutex<Vec<Call>>,
}

impl<A: ObjectStoreAdapter> RecordingAdapter<A> {
    pub fn new(inner: A) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Number of `list_contents` calls that reached this adapter.
    pub fn list_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::List { .. }))
            .count()
    }

    pub fn metadata_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::Metadata { .. }))
            .count()
    }

    /// Options of every `create_dir` call, in order.
    pub fn create_dir_options(&self) -> Vec<WriteOptions> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::CreateDir { options, .. } => Some(options),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl<A: ObjectStoreAdapter> ObjectStoreAdapter for RecordingAdapter<A> {
    fn list_contents(&self, directory: &StorePath, recursive: bool) -> AdapterResult<Vec<Entry>> {
        self.record(Call::List {
            directory: directory.to_string(),
            recursive,
        });
        self.inner.list_contents(directory, recursive)
    }

    fn metadata(&self, path: &StorePath) -> AdapterResult<Option<Entry>> {
        self.record(Call::Metadata {
            path: path.to_string(),
        });
        self.inner.metadata(path)
    }

    fn read(&self, path: &StorePath) -> AdapterResult<Vec<u8>> {
        self.record(Call::Read {
            path: path.to_string(),
        });
        self.inner.read(path)
    }

    fn write(&self, path: &StorePath, contents: &[u8], options: &WriteOptions) -> AdapterResult<()> {
        self.record(Call::Write {
            path: path.to_string(),
            options: options.clone(),
        });
        self.inner.write(path, contents, options)
    }

    fn rename(&self, from: &StorePath, to: &StorePath) -> AdapterResult<()> {
        self.record(Call::Rename {
            from: from.to_string(),
            to: to.to_string(),
        });
        self.inner.rename(from, to)
    }

    fn copy(&self, from: &StorePath, to: &StorePath) -> AdapterResult<()> {
        self.record(Call::Copy {
            from: from.to_string(),
            to: to.to_string(),
        });
        self.inner.copy(from, to)
    }

    fn delete(&self, path: &StorePath) -> AdapterResult<()> {
        self.record(Call::Delete {
            path: path.to_string(),
        });
        self.inner.delete(path)
    }

    fn delete_dir(&self, path: &StorePath) -> AdapterResult<()> {
        self.record(Call::DeleteDir {
            path: path.to_string(),
        });
        self.inner.delete_dir(path)
    }

    fn create_dir(&self, path: &StorePath, options: &WriteOptions) -> AdapterResult<()> {
        self.record(Call::CreateDir {
            path: path.to_string(),
            options: options.clone(),
        });
        self.inner.create_dir(path, options)
    }

    fn set_visibility(&self, path: &StorePath, visibility: Visibility) -> AdapterResult<()> {
        self.record(Call::SetVisibility {
            path: path.to_string(),
            visibility,
        });
        self.inner.set_visibility(path, visibility)
    }
}
