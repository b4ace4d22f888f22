//! Store-relative path handling
//!
//! Object stores have no real directories, only keys. `StorePath` gives keys a
//! canonical shape so that equal locations always compare (and cache) equal.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Error, Result};

/// A normalized, store-relative path.
///
/// Internally uses forward slashes with no leading, trailing or repeated
/// separators. The empty string is the store root.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StorePath {
    inner: String,
}

impl StorePath {
    /// Parse and normalize a path.
    ///
    /// Backslashes become forward slashes, empty and `.` segments are dropped
    /// and `..` pops the previous segment. Climbing above the store root is
    /// rejected.
    pub fn parse(path: &str) -> Result<Self> {
        let unified = path.replace('\\', "/");
        let mut segments: Vec<&str> = Vec::new();

        for segment in unified.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    if segments.pop().is_none() {
                        return Err(Error::invalid_path(
                            path,
                            "path is outside of the defined root",
                        ));
                    }
                }
                other => segments.push(other),
            }
        }

        Ok(Self {
            inner: segments.join("/"),
        })
    }

    /// The store root.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Join a relative segment onto this path, normalizing the result.
    pub fn join(&self, segment: &str) -> Result<Self> {
        if self.is_root() {
            Self::parse(segment)
        } else {
            Self::parse(&format!("{}/{}", self.inner, segment))
        }
    }

    /// Get the parent directory. The root has none.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        match self.inner.rfind('/') {
            Some(idx) => Some(Self {
                inner: self.inner[..idx].to_string(),
            }),
            None => Some(Self::root()),
        }
    }

    /// Get the final path component.
    pub fn file_name(&self) -> Option<&str> {
        if self.is_root() {
            return None;
        }
        self.inner.rsplit('/').next()
    }

    /// Get the extension, exactly as stored.
    ///
    /// Everything after the last `.` of the file name; a dot-file like
    /// `.json` has the extension `json`.
    pub fn extension(&self) -> Option<&str> {
        let name = self.file_name()?;
        let idx = name.rfind('.')?;
        Some(&name[idx + 1..])
    }

    /// Get the file name without its extension.
    pub fn file_stem(&self) -> Option<&str> {
        let name = self.file_name()?;
        match name.rfind('.') {
            Some(idx) => Some(&name[..idx]),
            None => Some(name),
        }
    }

    /// Whether this path lies strictly beneath `dir`.
    pub fn starts_with_dir(&self, dir: &StorePath) -> bool {
        if dir.is_root() {
            return !self.is_root();
        }
        self.inner.len() > dir.inner.len()
            && self.inner.starts_with(&dir.inner)
            && self.inner.as_bytes()[dir.inner.len()] == b'/'
    }

    /// Parent chain from the immediate parent up to and including the root.
    pub fn ancestors(&self) -> Vec<StorePath> {
        let mut chain = Vec::new();
        let mut current = self.parent();
        while let Some(path) = current {
            current = path.parent();
            chain.push(path);
        }
        chain
    }
}

impl fmt::Display for StorePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl FromStr for StorePath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl AsRef<str> for StorePath {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

impl Serialize for StorePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.inner)
    }
}

impl<'de> Deserialize<'de> for StorePath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_separators() {
        let path = StorePath::parse("//a///b/").unwrap();
        assert_eq!(path.as_str(), "a/b");
    }

    #[test]
    fn empty_is_root() {
        assert!(StorePath::parse("").unwrap().is_root());
        assert!(StorePath::parse("/").unwrap().is_root());
        assert!(StorePath::parse("./").unwrap().is_root());
    }

    #[test]
    fn escaping_root_is_rejected() {
        let err = StorePath::parse("a/../../b").unwrap_err();
        assert!(matches!(err, Error::InvalidPath { .. }));
    }

    #[test]
    fn parent_of_top_level_is_root() {
        let path = StorePath::parse("file.txt").unwrap();
        assert_eq!(path.parent(), Some(StorePath::root()));
        assert_eq!(StorePath::root().parent(), None);
    }

    #[test]
    fn ancestors_end_at_root() {
        let path = StorePath::parse("a/b/c.txt").unwrap();
        let chain: Vec<String> = path.ancestors().iter().map(|p| p.to_string()).collect();
        assert_eq!(chain, vec!["a/b", "a", ""]);
    }

    #[test]
    fn extension_keeps_case() {
        let path = StorePath::parse("img/Photo.PNG").unwrap();
        assert_eq!(path.extension(), Some("PNG"));
        assert_eq!(path.file_stem(), Some("Photo"));
    }

    #[test]
    fn dot_file_extension() {
        let path = StorePath::parse("conf/.json").unwrap();
        assert_eq!(path.extension(), Some("json"));
        assert_eq!(StorePath::parse("Makefile").unwrap().extension(), None);
    }

    #[test]
    fn starts_with_dir_requires_separator() {
        let dir = StorePath::parse("a/b").unwrap();
        assert!(StorePath::parse("a/b/c").unwrap().starts_with_dir(&dir));
        assert!(!StorePath::parse("a/bc").unwrap().starts_with_dir(&dir));
        assert!(!dir.starts_with_dir(&dir));
        assert!(dir.starts_with_dir(&StorePath::root()));
    }
}
