//! YAML configuration file support.
//!
//! One YAML document configures feature extraction and the LSH parameters for
//! the whole run. It is loaded once, validated, and never changes afterwards.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1"
//! name: "movies"
//!
//! features:
//!   version: 1
//!   title_shingle_size: 2
//!   cast_limit: 2
//!   outer_separator: "|"
//!   inner_separator: " "
//!   default_query_language: "English"
//!
//! lsh:
//!   version: 1
//!   minhash_bands: 250
//!   minhash_rows_per_band: 4
//!   seed: 0
//!   use_parallel: false
//!
//! log_level: "info"
//! ```
//!
//! Every section is optional and falls back to its defaults.

use std::fs;
use std::path::Path;

use canonical::FeatureConfig;
use perceptual::PerceptualConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Top-level configuration for a matching run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LshMatchConfig {
    /// Configuration format version
    pub version: String,

    #[serde(default)]
    pub name: Option<String>,

    /// Feature blob layout and normalization knobs
    #[serde(default)]
    pub features: FeatureConfig,

    /// Banding parameters, hash seed and parallelism
    #[serde(default)]
    pub lsh: PerceptualConfig,

    /// Default tracing filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl LshMatchConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: LshMatchConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_lsh(mut self, lsh: PerceptualConfig) -> Self {
        self.lsh = lsh;
        self
    }

    pub fn with_features(mut self, features: FeatureConfig) -> Self {
        self.features = features;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.features
            .validate()
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;
        self.lsh
            .validate()
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;

        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            return Err(ConfigLoadError::Validation(format!(
                "log_level must be one of {LOG_LEVELS:?}, got {:?}",
                self.log_level
            )));
        }
        Ok(())
    }
}

impl Default for LshMatchConfig {
    fn default() -> Self {
        Self {
            version: "1".to_string(),
            name: None,
            features: FeatureConfig::default(),
            lsh: PerceptualConfig::default(),
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
