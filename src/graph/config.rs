//! Graph store configuration

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading a configuration document
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Construction-time settings of a [`GraphStore`](super::GraphStore)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Vertex fields that get a secondary index
    pub indexed_fields: Vec<String>,
    /// First value handed out for vertices inserted without an id
    pub auto_id_start: u64,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            indexed_fields: Vec::new(),
            auto_id_start: 1,
        }
    }
}

impl GraphConfig {
    /// Parse a YAML document; missing keys fall back to defaults
    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(source)?)
    }

    /// Parse a JSON document; missing keys fall back to defaults
    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(source)?)
    }

    /// Add a field to the indexed set
    pub fn with_indexed_field(mut self, field: impl Into<String>) -> Self {
        let field = field.into();
        if !self.indexed_fields.contains(&field) {
            self.indexed_fields.push(field);
        }
        self
    }

    pub fn with_auto_id_start(mut self, start: u64) -> Self {
        self.auto_id_start = start;
        self
    }
}
