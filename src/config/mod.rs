//! Configuration loading and validation.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// API region endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum, Default)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    #[default]
    Na,
    Eu,
    Ru,
    Asia,
}

impl Region {
    /// Base URL of the region's API endpoint. The trailing slash matters:
    /// endpoint paths are joined relative to it.
    pub fn base_url(&self) -> &'static str {
        match self {
            Region::Na => "https://api.worldoftanks.com/wot/",
            Region::Eu => "https://api.worldoftanks.eu/wot/",
            Region::Ru => "https://api.worldoftanks.ru/wot/",
            Region::Asia => "https://api.worldoftanks.asia/wot/",
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Region::Na => write!(f, "na"),
            Region::Eu => write!(f, "eu"),
            Region::Ru => write!(f, "ru"),
            Region::Asia => write!(f, "asia"),
        }
    }
}

/// Main application configuration.
///
/// Built once at startup and threaded explicitly through every component.
/// Nothing reads it as ambient/global state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Credential token sent on every request
    #[serde(default = "default_token")]
    pub token: String,

    /// Region endpoint
    #[serde(default)]
    pub region: Region,

    /// Emit per-window, per-tier and per-vehicle breakdown columns
    #[serde(default)]
    pub extended: bool,

    /// Low-tier window sizes (extended mode only)
    #[serde(default = "default_windows")]
    pub windows: Vec<usize>,

    /// Record per-player failures and continue instead of aborting the run
    #[serde(default)]
    pub skip_failures: bool,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_token() -> String {
    "WG-WoT_Assistant-1.3.2".to_string()
}

fn default_windows() -> Vec<usize> {
    vec![3, 5]
}

fn default_timeout() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            token: default_token(),
            region: Region::default(),
            extended: false,
            windows: default_windows(),
            skip_failures: false,
            timeout_seconds: default_timeout(),
            log_level: default_log_level(),
        }
    }
}

/// Per-invocation overrides layered on top of file configuration.
///
/// A `None` field means "not given on the command line": the file value
/// (or its default) stands.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub token: Option<String>,
    pub region: Option<Region>,
    pub extended: Option<bool>,
    pub windows: Option<Vec<usize>>,
    pub skip_failures: Option<bool>,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply command-line overrides. Only explicitly given values replace
    /// what the file (or defaults) provided.
    pub fn apply(&mut self, overrides: ConfigOverrides) {
        if let Some(token) = overrides.token {
            self.token = token;
        }
        if let Some(region) = overrides.region {
            self.region = region;
        }
        if let Some(extended) = overrides.extended {
            self.extended = extended;
        }
        if let Some(windows) = overrides.windows {
            self.windows = windows;
        }
        if let Some(skip_failures) = overrides.skip_failures {
            self.skip_failures = skip_failures;
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "Credential token must not be empty".to_string(),
            ));
        }

        if self.windows.is_empty() {
            return Err(ConfigError::ValidationError(
                "At least one window size is required".to_string(),
            ));
        }

        if self.windows.iter().any(|&k| k == 0) {
            return Err(ConfigError::ValidationError(
                "Window sizes must be greater than 0".to_string(),
            ));
        }

        let mut seen = std::collections::HashSet::new();
        if !self.windows.iter().all(|&k| seen.insert(k)) {
            return Err(ConfigError::ValidationError(
                "Window sizes must be distinct".to_string(),
            ));
        }

        if self.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "Request timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
