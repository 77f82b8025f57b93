//! Application Configuration
//! Column names, tier size and export settings, loaded from an optional JSON file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "TIERVIEW_CONFIG";
/// Config file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "tierview.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("tier_size must be greater than zero")]
    ZeroTierSize,
    #[error("Column name for {0} must not be empty")]
    EmptyColumnName(&'static str),
}

/// Source column names expected in the uploaded summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    pub entity: String,
    pub total: String,
    pub period_prefix: String,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            entity: "Row Labels".to_string(),
            total: "Grand Total".to_string(),
            period_prefix: "Q".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub png_width: u32,
    pub png_height: u32,
    /// Open exported files with the system default application.
    pub open_after_export: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            png_width: 1400,
            png_height: 800,
            open_after_export: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub columns: ColumnConfig,
    /// Number of Sender IDs per tier. Fixed for the lifetime of the process.
    pub tier_size: usize,
    pub export: ExportConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            columns: ColumnConfig::default(),
            tier_size: 10,
            export: ExportConfig::default(),
        }
    }
}

impl AppConfig {
    /// Parse and validate a config document.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Resolve the config file: `$TIERVIEW_CONFIG`, then `./tierview.json`.
    /// Returns defaults when neither exists.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Self::from_file(Path::new(&path));
        }

        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.exists() {
            return Self::from_file(local);
        }

        Ok(Self::default())
    }

    /// Like [`AppConfig::load`], but logs and falls back to defaults on error.
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("{e}; using default configuration");
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tier_size == 0 {
            return Err(ConfigError::ZeroTierSize);
        }
        if self.columns.entity.trim().is_empty() {
            return Err(ConfigError::EmptyColumnName("entity"));
        }
        if self.columns.total.trim().is_empty() {
            return Err(ConfigError::EmptyColumnName("total"));
        }
        if self.columns.period_prefix.is_empty() {
            return Err(ConfigError::EmptyColumnName("period_prefix"));
        }
        Ok(())
    }
}
