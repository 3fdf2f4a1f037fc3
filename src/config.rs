use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::coalesce::DEFAULT_REFERENCE_TABLE;

/// Settings for the coalesce generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Table whose columns define what gets merged.
    pub reference_table: String,
    /// Database schema (dataset) the reference table lives in.
    pub reference_schema: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            reference_table: DEFAULT_REFERENCE_TABLE.to_string(),
            reference_schema: String::from("public"),
        }
    }
}

impl GeneratorConfig {
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("matchstats-sql")
    }

    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load from `path`, falling back to defaults when the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }
}
