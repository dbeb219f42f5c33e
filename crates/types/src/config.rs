//! Engine-wide configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Content-handler pattern used by HTML encoders writing plain output.
pub const CONTENT_HANDLER_KEY: &str = "reportflow.html.content-handler";
/// Content-handler pattern used by HTML encoders writing through a content repository.
pub const RESOURCE_CONTENT_HANDLER_KEY: &str = "reportflow.html.resource-content-handler";

const DEFAULT_PROPERTIES: &[(&str, &str)] = &[
    (CONTENT_HANDLER_KEY, "getImage?image={0}"),
    (RESOURCE_CONTENT_HANDLER_KEY, "getResource?resource={0}"),
];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error reading engine configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid engine configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Key/value configuration read by the orchestrator and handed to encoders.
///
/// Deserialized from JSON of the shape `{"properties": {"key": "value"}}`.
/// Built-in defaults are kept for every key the document does not mention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub properties: BTreeMap<String, String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            properties: DEFAULT_PROPERTIES
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let parsed: EngineConfig = serde_json::from_str(json)?;
        Ok(parsed.with_defaults())
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_json_str(&source)
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    fn with_defaults(mut self) -> Self {
        for (key, value) in DEFAULT_PROPERTIES {
            self.properties
                .entry(key.to_string())
                .or_insert_with(|| value.to_string());
        }
        self
    }
}
