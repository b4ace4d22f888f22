//! YAML document access

use bucket_fs::YamlFileHandle;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_yaml::Value as YamlValue;

use crate::error::{Error, Result};

/// Decode and rewrite YAML documents through their handle.
pub trait YamlFileExt {
    fn parse(&self) -> Result<YamlValue>;

    fn parse_as<T: DeserializeOwned>(&self) -> Result<T>;

    fn dump<T: Serialize>(&self, value: &T) -> Result<()>;

    /// The document as JSON with mapping keys sorted. Non-string keys are
    /// dropped and tags are unwrapped.
    fn to_json(&self) -> Result<serde_json::Value>;
}

impl YamlFileExt for YamlFileHandle {
    fn parse(&self) -> Result<YamlValue> {
        self.parse_as()
    }

    fn parse_as<T: DeserializeOwned>(&self) -> Result<T> {
        let source = self.read_to_string()?;
        serde_yaml::from_str(&source).map_err(|e| Error::parse("YAML", self.full_path(), e.to_string()))
    }

    fn dump<T: Serialize>(&self, value: &T) -> Result<()> {
        let content = serde_yaml::to_string(value)
            .map_err(|e| Error::serialize("YAML", self.full_path(), e.to_string()))?;
        self.write(content)?;
        tracing::debug!(path = %self.path(), "Wrote YAML document");
        Ok(())
    }

    fn to_json(&self) -> Result<serde_json::Value> {
        Ok(yaml_to_json_sorted(&self.parse()?))
    }
}

fn yaml_to_json_sorted(value: &YamlValue) -> serde_json::Value {
    match value {
        YamlValue::Null => serde_json::Value::Null,
        YamlValue::Bool(b) => serde_json::Value::Bool(*b),
        YamlValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                serde_json::Value::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                serde_json::Value::Number(u.into())
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map(serde_json::Value::Number)
                    .unwrap_or(serde_json::Value::Null)
            }
        }
        YamlValue::String(s) => serde_json::Value::String(s.clone()),
        YamlValue::Sequence(items) => {
            serde_json::Value::Array(items.iter().map(yaml_to_json_sorted).collect())
        }
        YamlValue::Mapping(map) => {
            let mut pairs: Vec<(&str, &YamlValue)> = map
                .iter()
                .filter_map(|(k, v)| k.as_str().map(|k| (k, v)))
                .collect();
            pairs.sort_by(|a, b| a.0.cmp(b.0));

            let mut object = serde_json::Map::new();
            for (key, value) in pairs {
                object.insert(key.to_string(), yaml_to_json_sorted(value));
            }
            serde_json::Value::Object(object)
        }
        YamlValue::Tagged(tagged) => yaml_to_json_sorted(&tagged.value),
    }
}
