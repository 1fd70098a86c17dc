use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::services::{ImportOptions, DEFAULT_CHUNK_SIZE};

/// Optional YAML configuration; command line flags override every field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplyConfig {
    /// Database URL or SQLite file path
    pub database: Option<String>,
    pub log_level: Option<String>,
    pub import: ImportConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub chunk_size: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl SamplyConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    pub fn import_options(&self) -> ImportOptions {
        ImportOptions {
            chunk_size: self.import.chunk_size,
        }
    }
}
