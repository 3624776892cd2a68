//! Configuration handling for taskmaster
//!
//! Configuration is stored in `~/.config/taskmaster/config.toml` (or the
//! platform equivalent). Every field is optional.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::DEFAULT_MARKER;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Output format for commands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Todo file; a leading `~` is the home directory
    pub todo_file: PathBuf,

    /// Token introducing a subtask, repeated once per nesting level
    pub subtask_marker: String,

    /// Output format when `--format` is not given
    pub default_format: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            todo_file: PathBuf::from("~/todo.txt"),
            subtask_marker: DEFAULT_MARKER.to_string(),
            default_format: OutputFormat::Text,
        }
    }
}

impl Config {
    /// Returns the config directory
    pub fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "taskmaster", "taskmaster")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Returns the default config file location
    pub fn default_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("config.toml"))
    }

    /// Loads the configuration from `path`, or from the default location.
    /// A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(path) => path,
            None => return Ok(Self::default()),
        };

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config: {}", config_path.display()))?;

        Self::from_toml(&content)
            .with_context(|| format!("Failed to load config: {}", config_path.display()))
    }

    /// Parses and validates TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.subtask_marker.is_empty() {
            return Err(ConfigError::Invalid(
                "subtask_marker must not be empty".to_string(),
            ));
        }
        if self.subtask_marker.contains(char::is_whitespace) {
            return Err(ConfigError::Invalid(format!(
                "subtask_marker must not contain whitespace, got '{}'",
                self.subtask_marker
            )));
        }
        if self.todo_file.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("todo_file must not be empty".to_string()));
        }
        Ok(())
    }

    /// The todo file to use: `over` when given, else the configured one,
    /// with `~` expanded
    pub fn resolve_todo_file(&self, over: Option<&Path>) -> PathBuf {
        expand_tilde(over.unwrap_or(&self.todo_file))
    }

    /// Serializes the configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}

/// Replaces a leading `~` with the home directory
pub fn expand_tilde(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match BaseDirs::new() {
        Some(dirs) => dirs.home_dir().join(rest),
        None => path.to_path_buf(),
    }
}
