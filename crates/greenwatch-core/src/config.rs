//! Engine configuration.
//!
//! Loaded from TOML:
//!
//! ```toml
//! [source]
//! base_url = "https://example.supabase.co"
//! table = "receive_dados"
//! api_key = "..."
//! timeout_secs = 10
//!
//! [view]
//! page_size = 6
//! refetch_on_miss = true
//!
//! [thresholds]
//! hot_above = 30.0
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::paginate::DEFAULT_PAGE_SIZE;
use crate::thresholds::ThresholdConfig;

/// Table read when none is configured.
pub const DEFAULT_TABLE: &str = "receive_dados";

/// Request timeout used when none is configured, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Largest accepted page size.
pub const MAX_PAGE_SIZE: usize = 500;

/// Largest accepted request timeout, in seconds.
pub const MAX_TIMEOUT_SECS: u64 = 300;

/// Environment variable overriding `source.base_url`.
pub const ENV_BASE_URL: &str = "GREENWATCH_BASE_URL";

/// Environment variable overriding `source.api_key`.
pub const ENV_API_KEY: &str = "GREENWATCH_API_KEY";

/// Engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote source settings.
    pub source: SourceConfig,
    /// View settings.
    pub view: ViewConfig,
    /// Temperature thresholds.
    pub thresholds: ThresholdConfig,
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// Returns the defaults when no file exists there.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = default_config_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Read {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Save configuration to a file, creating parent directories.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;

        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        std::fs::write(path.as_ref(), content).map_err(|e| ConfigError::Write {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Validate the configuration and return every error found.
    ///
    /// This checks:
    /// - The base URL is present and uses http or https
    /// - The table name is not empty
    /// - The request timeout is within 1-300 seconds
    /// - The page size is within 1-500
    /// - The hot threshold is a finite number
    ///
    /// # Example
    ///
    /// ```
    /// use greenwatch_core::Config;
    ///
    /// let config = Config::default();
    /// config.validate().expect("Default config should be valid");
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        errors.extend(self.source.validate());
        errors.extend(self.view.validate());

        if !self.thresholds.hot_above.is_finite() {
            errors.push(ValidationError::new(
                "thresholds.hot_above",
                "must be a finite number",
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Load and validate configuration from a file.
    pub fn load_validated<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config = Self::load(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Override source settings from `GREENWATCH_BASE_URL` and
    /// `GREENWATCH_API_KEY`. Unset or empty variables leave the value alone.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Like [`apply_env`](Self::apply_env), reading variables through `lookup`.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_BASE_URL) {
            self.source.base_url = url;
        }
        if let Some(key) = get(ENV_API_KEY) {
            self.source.api_key = Some(key);
        }
    }
}

/// Remote source configuration.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Project base URL (e.g., "https://example.supabase.co").
    pub base_url: String,
    /// Table holding the readings.
    pub table: String,
    /// API key sent with every request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:54321".to_string(),
            table: DEFAULT_TABLE.to_string(),
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl std::fmt::Debug for SourceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceConfig")
            .field("base_url", &self.base_url)
            .field("table", &self.table)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl SourceConfig {
    /// Validate source configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        let url = self.base_url.trim();
        if url.is_empty() {
            errors.push(ValidationError::new(
                "source.base_url",
                "base URL cannot be empty",
            ));
        } else if !url.starts_with("http://") && !url.starts_with("https://") {
            errors.push(ValidationError::new(
                "source.base_url",
                format!("invalid URL '{}': must start with http:// or https://", url),
            ));
        }

        if self.table.trim().is_empty() {
            errors.push(ValidationError::new(
                "source.table",
                "table name cannot be empty",
            ));
        }

        if !(1..=MAX_TIMEOUT_SECS).contains(&self.timeout_secs) {
            errors.push(ValidationError::new(
                "source.timeout_secs",
                format!(
                    "timeout {} out of range: must be 1-{} seconds",
                    self.timeout_secs, MAX_TIMEOUT_SECS
                ),
            ));
        }

        errors
    }
}

/// View configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Readings per page.
    pub page_size: usize,
    /// Refresh once when a selected day is missing from the cache.
    pub refetch_on_miss: bool,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            refetch_on_miss: true,
        }
    }
}

impl ViewConfig {
    /// Validate view configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if !(1..=MAX_PAGE_SIZE).contains(&self.page_size) {
            errors.push(ValidationError::new(
                "view.page_size",
                format!(
                    "page size {} out of range: must be 1-{}",
                    self.page_size, MAX_PAGE_SIZE
                ),
            ));
        }

        errors
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),
    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    Validation(Vec<ValidationError>),
}

/// A single validation error with context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The field path (e.g., `view.page_size`).
    pub field: String,
    /// Description of the validation failure.
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Default configuration file path.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("greenwatch")
        .join("config.toml")
}
