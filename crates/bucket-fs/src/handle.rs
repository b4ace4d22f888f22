//! Typed handles produced from listings
//!
//! A handle is a path-bound accessor. It keeps only a weak reference to the
//! filesystem that produced it and delegates every I/O call back to it.

use std::ops::Deref;
use std::sync::Weak;

use crate::filesystem::{BoundedFilesystem, Shared};
use crate::{ClassifiedType, Entry, Error, Result, StorePath, Visibility, WriteOptions};

/// State and operations common to every handle variant.
#[derive(Debug, Clone)]
pub struct HandleCore {
    entry: Entry,
    classified: ClassifiedType,
    mount_point: Option<String>,
    filesystem: Weak<Shared>,
}

impl HandleCore {
    pub fn path(&self) -> &StorePath {
        &self.entry.path
    }

    /// Metadata as of the listing (or the last [`refresh`](Self::refresh)).
    pub fn entry(&self) -> &Entry {
        &self.entry
    }

    pub fn classified_type(&self) -> &ClassifiedType {
        &self.classified
    }

    pub fn mount_point(&self) -> Option<&str> {
        self.mount_point.as_deref()
    }

    /// Externally visible path, `"{mount}://{path}"` when mounted.
    pub fn full_path(&self) -> String {
        match &self.mount_point {
            Some(mount) => format!("{}://{}", mount, self.entry.path),
            None => self.entry.path.to_string(),
        }
    }

    /// The owning filesystem, if it is still alive.
    pub fn filesystem(&self) -> Result<BoundedFilesystem> {
        self.filesystem
            .upgrade()
            .map(BoundedFilesystem::from_shared)
            .ok_or_else(|| Error::Detached {
                path: self.full_path(),
            })
    }

    pub fn exists(&self) -> Result<bool> {
        self.filesystem()?.has(self.path().as_str())
    }

    /// Reload metadata from the store.
    pub fn refresh(&mut self) -> Result<()> {
        self.entry = self.filesystem()?.metadata(self.path().as_str())?;
        Ok(())
    }

    pub fn read(&self) -> Result<Vec<u8>> {
        self.filesystem()?.read(self.path().as_str())
    }

    pub fn read_to_string(&self) -> Result<String> {
        self.filesystem()?.read_to_string(self.path().as_str())
    }

    pub fn write(&self, contents: impl AsRef<[u8]>) -> Result<()> {
        self.filesystem()?
            .write(self.path().as_str(), contents, WriteOptions::default())
    }

    /// Delete the object, or the whole subtree for directories.
    pub fn delete(&self) -> Result<()> {
        let filesystem = self.filesystem()?;
        if self.classified == ClassifiedType::Directory {
            filesystem.delete_dir(self.path().as_str())
        } else {
            filesystem.delete(self.path().as_str())
        }
    }

    /// Move the object and return a handle for its new location.
    pub fn rename(&self, to: &str) -> Result<Handle> {
        let filesystem = self.filesystem()?;
        filesystem.rename(self.path().as_str(), to)?;
        filesystem.get(to)
    }

    pub fn visibility(&self) -> Result<Visibility> {
        self.filesystem()?.visibility(self.path().as_str())
    }

    pub fn set_visibility(&self, visibility: Visibility) -> Result<()> {
        self.filesystem()?
            .set_visibility(self.path().as_str(), visibility)
    }
}

macro_rules! handle_variant {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name(HandleCore);

        impl $name {
            pub fn into_core(self) -> HandleCore {
                self.0
            }
        }

        impl Deref for $name {
            type Target = HandleCore;

            fn deref(&self) -> &HandleCore {
                &self.0
            }
        }
    };
}

handle_variant!(
    /// Handle for a directory.
    DirectoryHandle
);
handle_variant!(
    /// Handle for an image file.
    ImageHandle
);
handle_variant!(
    /// Handle for a JSON document.
    JsonFileHandle
);
handle_variant!(
    /// Handle for a YAML document.
    YamlFileHandle
);
handle_variant!(
    /// Handle for any other file, documents included.
    FileHandle
);

impl DirectoryHandle {
    pub fn list(&self, recursive: bool) -> Result<Vec<Handle>> {
        self.filesystem()?
            .list_contents(self.path().as_str(), recursive)
    }

    pub fn create(&self) -> Result<()> {
        self.filesystem()?
            .create_dir(self.path().as_str(), WriteOptions::default())
    }
}

/// A handle of one of the fixed variants.
#[derive(Debug, Clone)]
pub enum Handle {
    Directory(DirectoryHandle),
    Image(ImageHandle),
    Json(JsonFileHandle),
    Yaml(YamlFileHandle),
    File(FileHandle),
}

impl Handle {
    /// Build the handle variant for a classified entry, bound to `filesystem`
    /// and tagged with its mount point.
    pub fn create(entry: Entry, classified: ClassifiedType, filesystem: &BoundedFilesystem) -> Self {
        let core = HandleCore {
            entry,
            classified,
            mount_point: filesystem.mount_point().map(str::to_string),
            filesystem: filesystem.downgrade(),
        };
        match core.classified {
            ClassifiedType::Directory => Self::Directory(DirectoryHandle(core)),
            ClassifiedType::Image => Self::Image(ImageHandle(core)),
            ClassifiedType::Json => Self::Json(JsonFileHandle(core)),
            ClassifiedType::Yaml => Self::Yaml(YamlFileHandle(core)),
            ClassifiedType::Document | ClassifiedType::File | ClassifiedType::Other(_) => {
                Self::File(FileHandle(core))
            }
        }
    }

    pub fn core(&self) -> &HandleCore {
        match self {
            Self::Directory(handle) => &handle.0,
            Self::Image(handle) => &handle.0,
            Self::Json(handle) => &handle.0,
            Self::Yaml(handle) => &handle.0,
            Self::File(handle) => &handle.0,
        }
    }

    pub fn into_core(self) -> HandleCore {
        match self {
            Self::Directory(handle) => handle.into_core(),
            Self::Image(handle) => handle.into_core(),
            Self::Json(handle) => handle.into_core(),
            Self::Yaml(handle) => handle.into_core(),
            Self::File(handle) => handle.into_core(),
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, Self::Directory(_))
    }

    pub fn as_directory(&self) -> Option<&DirectoryHandle> {
        match self {
            Self::Directory(handle) => Some(handle),
            _ => None,
        }
    }

    pub fn as_image(&self) -> Option<&ImageHandle> {
        match self {
            Self::Image(handle) => Some(handle),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&JsonFileHandle> {
        match self {
            Self::Json(handle) => Some(handle),
            _ => None,
        }
    }

    pub fn as_yaml(&self) -> Option<&YamlFileHandle> {
        match self {
            Self::Yaml(handle) => Some(handle),
            _ => None,
        }
    }

    pub fn as_file(&self) -> Option<&FileHandle> {
        match self {
            Self::File(handle) => Some(handle),
            _ => None,
        }
    }
}

impl Deref for Handle {
    type Target = HandleCore;

    fn deref(&self) -> &HandleCore {
        self.core()
    }
}
