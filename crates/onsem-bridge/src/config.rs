//! Bridge configuration (onsem.toml)
//!
//! Every field has a default, so an empty file is a valid configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while loading the configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// Validation error
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

/// Bridge configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Recommendation lookups
    #[serde(default)]
    pub recommendations: RecommendationsConfig,

    /// Text generation
    #[serde(default)]
    pub text: TextConfig,

    /// Leak report
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
}

/// Recommendation lookup settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecommendationsConfig {
    /// Ids returned by one lookup (default: 3)
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Candidates examined by one lookup (default: 100)
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,
}

fn default_max_results() -> usize {
    3
}

fn default_search_limit() -> usize {
    100
}

impl Default for RecommendationsConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            search_limit: default_search_limit(),
        }
    }
}

/// Text generation settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TextConfig {
    /// Address the listener formally (default: true)
    #[serde(default = "default_true")]
    pub formal_address: bool,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            formal_address: true,
        }
    }
}

/// Leak report settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiagnosticsConfig {
    /// Mention how many linguistic databases were created (default: true)
    #[serde(default = "default_true")]
    pub report_database_creations: bool,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            report_database_creations: true,
        }
    }
}

fn default_true() -> bool {
    true
}

impl BridgeConfig {
    /// Load the configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse the configuration from a string
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: BridgeConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let rec = &self.recommendations;
        if rec.max_results == 0 {
            return Err(ConfigError::Validation(
                "recommendations.max_results must be at least 1".to_string(),
            ));
        }
        if rec.search_limit < rec.max_results {
            return Err(ConfigError::Validation(format!(
                "recommendations.search_limit ({}) is lower than recommendations.max_results ({})",
                rec.search_limit, rec.max_results
            )));
        }
        Ok(())
    }

    /// Render as TOML
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
