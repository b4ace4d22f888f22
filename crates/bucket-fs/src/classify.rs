//! Content classification of listed entries
//!
//! Classification is an ordered rule list: directories first, then extension
//! rules in fixed priority, then the entry's raw type as the fallback.

use std::fmt;

use crate::{Entry, EntryKind};

/// Extensions treated as images.
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "gif", "jpeg", "jpg", "png", "swf", "psd", "bmp", "tiff", "jpc", "jp2", "jpx", "jb2", "swc",
    "iff", "wbmp", "xbm", "ico", "svg", "webp",
];

/// Extensions treated as documents unless configured otherwise.
pub const DEFAULT_DOCUMENT_EXTENSIONS: &[&str] = &[
    "doc", "docx", "txt", "md", "pdf", "xls", "xlsx", "ppt", "pptx", "csv",
];

/// Semantic category of a listed entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClassifiedType {
    Directory,
    Image,
    Json,
    Yaml,
    Document,
    /// Generic file.
    File,
    /// Raw store type that is neither `file` nor `dir`, passed through as-is.
    Other(String),
}

impl ClassifiedType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Directory => "dir",
            Self::Image => "image",
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Document => "document",
            Self::File => "file",
            Self::Other(raw) => raw,
        }
    }
}

impl fmt::Display for ClassifiedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extension rules, in the order they are tried.
#[derive(Debug, Clone, Copy)]
enum ExtensionRule {
    Image,
    Json,
    Yaml,
    Document,
}

const EXTENSION_RULES: [ExtensionRule; 4] = [
    ExtensionRule::Image,
    ExtensionRule::Json,
    ExtensionRule::Yaml,
    ExtensionRule::Document,
];

/// Assigns a [`ClassifiedType`] to entries.
///
/// Pure: the result depends only on the entry and the configured document
/// extensions. Extensions are matched exactly as stored, so `PNG` is not an
/// image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classifier {
    document_extensions: Vec<String>,
}

impl Classifier {
    pub fn new<I, S>(document_extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            document_extensions: document_extensions.into_iter().map(Into::into).collect(),
        }
    }

    pub fn document_extensions(&self) -> &[String] {
        &self.document_extensions
    }

    pub fn classify(&self, entry: &Entry) -> ClassifiedType {
        match &entry.kind {
            EntryKind::Dir => ClassifiedType::Directory,
            EntryKind::File => entry
                .extension()
                .and_then(|ext| self.classify_extension(ext))
                .unwrap_or(ClassifiedType::File),
            EntryKind::Other(raw) => ClassifiedType::Other(raw.clone()),
        }
    }

    /// Type implied by a file extension, if any rule matches.
    pub fn classify_extension(&self, ext: &str) -> Option<ClassifiedType> {
        EXTENSION_RULES
            .iter()
            .find(|rule| self.matches(**rule, ext))
            .map(|rule| match rule {
                ExtensionRule::Image => ClassifiedType::Image,
                ExtensionRule::Json => ClassifiedType::Json,
                ExtensionRule::Yaml => ClassifiedType::Yaml,
                ExtensionRule::Document => ClassifiedType::Document,
            })
    }

    fn matches(&self, rule: ExtensionRule, ext: &str) -> bool {
        match rule {
            ExtensionRule::Image => IMAGE_EXTENSIONS.contains(&ext),
            ExtensionRule::Json => ext == "json",
            ExtensionRule::Yaml => ext == "yaml" || ext == "yml",
            ExtensionRule::Document => self.document_extensions.iter().any(|d| d == ext),
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(DEFAULT_DOCUMENT_EXTENSIONS.iter().copied())
    }
}
