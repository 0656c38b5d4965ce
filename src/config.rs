//! Configuration types for Docket

use serde::{Deserialize, Serialize};

use crate::options::TitleTable;
use crate::{DocketError, Result};

/// Environment variable that enables doc collection unless configured otherwise
pub const DEFAULT_ENV_VAR: &str = "DOC";

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Environment variable gating doc collection
    #[serde(default = "default_env_var")]
    pub env_var: String,
    /// Force collection on or off, ignoring `env_var`
    #[serde(default)]
    pub enabled_override: Option<bool>,
    /// Fail before recording when no description can be derived
    #[serde(default = "default_strict")]
    pub strict_descriptions: bool,
    /// Module to group-title table
    #[serde(default)]
    pub titles: TitleTable,
    /// Resource limits
    #[serde(default)]
    pub limits: LimitsConfig,
}

fn default_env_var() -> String {
    DEFAULT_ENV_VAR.to_string()
}

fn default_strict() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            env_var: default_env_var(),
            enabled_override: None,
            strict_descriptions: default_strict(),
            titles: TitleTable::default(),
            limits: LimitsConfig::default(),
        }
    }
}

/// Resource limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum number of records held by a recorder
    pub max_records: usize,
    /// Maximum request or response body size in bytes
    pub max_body_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_records: 65_536,
            max_body_size: 16 * 1024 * 1024, // 16 MB
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DocketError::ConfigError(format!("Failed to read config file: {e}")))?;

        let config = Self::from_toml(&content)?;
        tracing::info!(
            "Loaded doc config from {} ({} titles)",
            path.display(),
            config.titles.len()
        );
        Ok(config)
    }

    /// Parse and validate configuration from a TOML string
    ///
    /// # Errors
    ///
    /// Returns error if the string cannot be parsed or fails validation
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| DocketError::ConfigError(format!("Failed to parse config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns error if configuration is invalid
    pub fn validate(&self) -> Result<()> {
        if self.env_var.is_empty() {
            return Err(DocketError::ConfigError(
                "env_var cannot be empty".to_string(),
            ));
        }

        for (i, entry) in self.titles.entries().iter().enumerate() {
            if entry.module.is_empty() {
                return Err(DocketError::ConfigError(format!(
                    "Title {i}: module cannot be empty"
                )));
            }

            if entry.title.is_empty() {
                return Err(DocketError::ConfigError(format!(
                    "Title {i}: title cannot be empty"
                )));
            }
        }

        if self.limits.max_records == 0 {
            return Err(DocketError::ConfigError(
                "max_records must be > 0".to_string(),
            ));
        }

        if self.limits.max_body_size == 0 {
            return Err(DocketError::ConfigError(
                "max_body_size must be > 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Whether docs should be collected in this process
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.is_enabled_with(|name| std::env::var(name).ok())
    }

    /// Like [`Config::is_enabled`], reading variables through `lookup`
    pub fn is_enabled_with(&self, lookup: impl Fn(&str) -> Option<String>) -> bool {
        if let Some(enabled) = self.enabled_override {
            return enabled;
        }

        lookup(&self.env_var).is_some_and(|value| {
            let value = value.trim();
            !value.is_empty() && value != "0" && !value.eq_ignore_ascii_case("false")
        })
    }
}
