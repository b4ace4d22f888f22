//! [`FailingAdapter`] for exercising error propagation.

use bucket_fs::{
    AdapterError, AdapterResult, Entry, MemoryAdapter, ObjectStoreAdapter, StorePath, Visibility,
    WriteOptions,
};

/// Adapter over a [`MemoryAdapter`] whose reads or writes can be made to fail
/// with a remote error.
pub struct FailingAdapter {
    inner: MemoryAdapter,
    fail_reads: bool,
    fail_writes: bool,
    message: String,
}

impl FailingAdapter {
    /// Every operation fails.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            inner: MemoryAdapter::new(),
            fail_reads: true,
            fail_writes: true,
            message: message.into(),
        }
    }

    /// Only listing, metadata and read calls fail.
    pub fn reads(inner: MemoryAdapter, message: impl Into<String>) -> Self {
        Self {
            inner,
            fail_reads: true,
            fail_writes: false,
            message: message.into(),
        }
    }

    /// Only mutating calls fail.
    pub fn writes(inner: MemoryAdapter, message: impl Into<String>) -> Self {
        Self {
            inner,
            fail_reads: false,
            fail_writes: true,
            message: message.into(),
        }
    }

    fn check_read(&self) -> AdapterResult<()> {
        if self.fail_reads {
            return Err(AdapterError::remote(self.message.clone()));
        }
        Ok(())
    }

    fn check_write(&self) -> AdapterResult<()> {
        if self.fail_writes {
            return Err(AdapterError::remote(self.message.clone()));
        }
        Ok(())
    }
}

impl ObjectStoreAdapter for FailingAdapter {
    fn list_contents(&self, directory: &StorePath, recursive: bool) -> AdapterResult<Vec<Entry>> {
        self.check_read()?;
        self.inner.list_contents(directory, recursive)
    }

    fn metadata(&self, path: &StorePath) -> AdapterResult<Option<Entry>> {
        self.check_read()?;
        self.inner.metadata(path)
    }

    fn read(&self, path: &StorePath) -> AdapterResult<Vec<u8>> {
        self.check_read()?;
        self.inner.read(path)
    }

    fn write(&self, path: &StorePath, contents: &[u8], options: &WriteOptions) -> AdapterResult<()> {
        self.check_write()?;
        self.inner.write(path, contents, options)
    }

    fn rename(&self, from: &StorePath, to: &StorePath) -> AdapterResult<()> {
        self.check_write()?;
        self.inner.rename(from, to)
    }

    fn copy(&self, from: &StorePath, to: &StorePath) -> AdapterResult<()> {
        self.check_write()?;
        self.inner.copy(from, to)
    }

    fn delete(&self, path: &StorePath) -> AdapterResult<()> {
        self.check_write()?;
        self.inner.delete(path)
    }

    fn delete_dir(&self, path: &StorePath) -> AdapterResult<()> {
        self.check_write()?;
        self.inner.delete_dir(path)
    }

    fn create_dir(&self, path: &StorePath, options: &WriteOptions) -> AdapterResult<()> {
        self.check_write()?;
        self.inner.create_dir(path, options)
    }

    fn set_visibility(&self, path: &StorePath, visibility: Visibility) -> AdapterResult<()> {
        self.check_write()?;
        self.inner.set_visibility(path, visibility)
    }
}
