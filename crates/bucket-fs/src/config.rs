//! Filesystem configuration and host settings

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cache::CacheConfig;
use crate::classify::DEFAULT_DOCUMENT_EXTENSIONS;
use crate::{Error, Result, StorePath, Visibility};

/// Default cap on entries returned by one listing.
pub const DEFAULT_LISTING_LIMIT: usize = 1000;

/// Default cache lifetime in seconds.
pub const DEFAULT_CACHE_TTL: u64 = 3600;

/// Values fixed when a filesystem is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesystemConfig {
    /// Maximum handles per listing; `0` means unbounded.
    pub listing_limit: usize,
    /// Visibility applied to writes that do not specify one.
    pub visibility: Visibility,
    pub document_extensions: Vec<String>,
}

impl Default for FilesystemConfig {
    fn default() -> Self {
        Self {
            listing_limit: DEFAULT_LISTING_LIMIT,
            visibility: Visibility::Public,
            document_extensions: DEFAULT_DOCUMENT_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

impl FilesystemConfig {
    pub fn with_listing_limit(mut self, limit: usize) -> Self {
        self.listing_limit = limit;
        self
    }

    pub fn with_document_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.document_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }
}

/// Resolved host settings for a bucket-backed filesystem.
///
/// Loaded once at startup and handed to the components that need them; the
/// core never reads the environment itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub enabled: bool,
    pub bucket_region: Option<String>,
    pub bucket_name: Option<String>,
    pub filesystem_prefix: String,
    pub filesystem_name: String,
    pub file_list_limit: usize,
    /// Seconds; `0` keeps cache entries until evicted or invalidated.
    pub cache_ttl: u64,
    pub document_extensions: Option<Vec<String>>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: false,
            bucket_region: None,
            bucket_name: None,
            filesystem_prefix: String::new(),
            filesystem_name: "files".to_string(),
            file_list_limit: DEFAULT_LISTING_LIMIT,
            cache_ttl: DEFAULT_CACHE_TTL,
            document_extensions: None,
        }
    }
}

impl Settings {
    /// Load settings from a file.
    ///
    /// Format is detected from file extension:
    /// - `.toml` -> TOML
    /// - `.json` -> JSON
    /// - `.yaml`, `.yml` -> YAML
    ///
    /// The loaded settings are validated before being returned.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("");

        let parse_error = |format: &str, message: String| Error::ConfigParse {
            path: path.to_path_buf(),
            format: format.into(),
            message,
        };

        let settings: Self = match extension.to_lowercase().as_str() {
            "toml" => toml::from_str(&content).map_err(|e| parse_error("TOML", e.to_string()))?,
            "json" => {
                serde_json::from_str(&content).map_err(|e| parse_error("JSON", e.to_string()))?
            }
            "yaml" | "yml" => {
                serde_yaml::from_str(&content).map_err(|e| parse_error("YAML", e.to_string()))?
            }
            _ => {
                return Err(Error::UnsupportedFormat {
                    extension: extension.to_string(),
                });
            }
        };

        settings.validate()?;
        tracing::debug!(path = %path.display(), enabled = settings.enabled, "Loaded settings");
        Ok(settings)
    }

    /// Fail fast on settings that cannot work while the feature is enabled.
    pub fn validate(&self) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        if self.bucket_region.as_deref().is_none_or(str::is_empty) {
            return Err(Error::Configuration {
                message: "bucket_region is required when enabled".into(),
            });
        }
        if self.filesystem_name.is_empty() {
            return Err(Error::Configuration {
                message: "filesystem_name must not be empty".into(),
            });
        }
        Ok(())
    }

    pub fn filesystem_config(&self) -> FilesystemConfig {
        let config = FilesystemConfig::default().with_listing_limit(self.file_list_limit);
        match &self.document_extensions {
            Some(extensions) => config.with_document_extensions(extensions.iter().cloned()),
            None => config,
        }
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::new(format!("bucketfs-{}", self.filesystem_name), self.cache_ttl)
    }

    /// Public base URL assets are served from, when enabled and complete.
    pub fn asset_base_url(&self) -> Option<String> {
        if !self.enabled {
            return None;
        }
        let region = self.bucket_region.as_deref().filter(|r| !r.is_empty())?;
        let bucket = self.bucket_name.as_deref().filter(|b| !b.is_empty())?;

        let mut url = format!("https://s3.{region}.amazonaws.com/{bucket}/");
        let prefix = self.filesystem_prefix.trim_matches('/');
        if !prefix.is_empty() {
            url.push_str(prefix);
            url.push('/');
        }
        Some(url)
    }

    /// Public URL of a stored object.
    pub fn asset_url(&self, path: &StorePath) -> Option<String> {
        self.asset_base_url()
            .map(|base| format!("{}{}", base, path.as_str()))
    }
}
