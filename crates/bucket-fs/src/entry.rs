//! Raw listing records and write options

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::StorePath;

/// Raw type tag reported by the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntryKind {
    File,
    Dir,
    /// Any tag the store reports that is neither `file` nor `dir`.
    Other(String),
}

impl EntryKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::File => "file",
            Self::Dir => "dir",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for EntryKind {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "file" => Self::File,
            "dir" => Self::Dir,
            _ => Self::Other(raw),
        }
    }
}

impl From<EntryKind> for String {
    fn from(kind: EntryKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Access level of a stored object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => f.write_str("public"),
            Self::Private => f.write_str("private"),
        }
    }
}

/// A raw listing record as produced by an adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub path: StorePath,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mimetype: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Entry {
    pub fn new(path: StorePath, kind: EntryKind) -> Self {
        Self {
            path,
            kind,
            size: None,
            timestamp: None,
            visibility: None,
            mimetype: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn file(path: StorePath, size: u64) -> Self {
        Self {
            size: Some(size),
            ..Self::new(path, EntryKind::File)
        }
    }

    pub fn dir(path: StorePath) -> Self {
        Self::new(path, EntryKind::Dir)
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    /// Directory containing this entry (empty for top-level entries).
    pub fn dirname(&self) -> String {
        self.path
            .parent()
            .map(|p| p.as_str().to_string())
            .unwrap_or_default()
    }

    pub fn basename(&self) -> &str {
        self.path.file_name().unwrap_or("")
    }

    pub fn extension(&self) -> Option<&str> {
        self.path.extension()
    }

    /// File name without extension.
    pub fn filename(&self) -> &str {
        self.path.file_stem().unwrap_or("")
    }
}

/// Options passed along with write-type adapter calls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteOptions {
    pub visibility: Option<Visibility>,
    pub mimetype: Option<String>,
}

impl WriteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }

    pub fn with_mimetype(mut self, mimetype: impl Into<String>) -> Self {
        self.mimetype = Some(mimetype.into());
        self
    }
}
