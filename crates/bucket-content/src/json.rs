//! JSON document access

use bucket_fs::JsonFileHandle;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Error, Result};

/// Decode and rewrite JSON documents through their handle.
pub trait JsonFileExt {
    /// Parse the document into an untyped value.
    fn parse(&self) -> Result<Value>;

    fn parse_as<T: DeserializeOwned>(&self) -> Result<T>;

    /// Replace the document with `value`, pretty-printed.
    fn dump<T: Serialize>(&self, value: &T) -> Result<()>;
}

impl JsonFileExt for JsonFileHandle {
    fn parse(&self) -> Result<Value> {
        self.parse_as()
    }

    fn parse_as<T: DeserializeOwned>(&self) -> Result<T> {
        let bytes = self.read()?;
        serde_json::from_slice(&bytes).map_err(|e| Error::parse("JSON", self.full_path(), e.to_string()))
    }

    fn dump<T: Serialize>(&self, value: &T) -> Result<()> {
        let mut content = serde_json::to_string_pretty(value)
            .map_err(|e| Error::serialize("JSON", self.full_path(), e.to_string()))?;
        content.push('\n');
        self.write(content)?;
        tracing::debug!(path = %self.path(), "Wrote JSON document");
        Ok(())
    }
}
