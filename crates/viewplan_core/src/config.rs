//! Per-mode study configuration.
//!
//! # Responsibility
//! - Load one JSON file holding `development`, `test` and `production`
//!   sections.
//! - Provide defaults for every generator parameter.
//!
//! # Invariants
//! - A missing file yields defaults; a present file must parse.
//! - Callers override loaded values, never the other way round.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Seed used when the config does not name one.
pub const DEFAULT_SEED: u64 = 42;

/// Configuration section selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigMode {
    Development,
    Test,
    Production,
}

impl ConfigMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Test => "test",
            Self::Production => "production",
        }
    }

    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "test" => Ok(Self::Test),
            "production" | "prod" => Ok(Self::Production),
            other => Err(ConfigError::InvalidMode(other.to_string())),
        }
    }
}

/// One mode's settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewPlanConfig {
    /// SQLite database file.
    pub database: Option<PathBuf>,
    /// Absolute directory for rolling log files; logging is off when unset.
    pub log_dir: Option<PathBuf>,
    pub log_level: Option<String>,
    /// `null` draws a fresh seed from the OS on every run.
    pub seed: Option<u64>,
    pub n_views: usize,
    pub delay: usize,
    pub n_batches: usize,
    pub batches_per_participant: usize,
}

impl Default for ViewPlanConfig {
    fn default() -> Self {
        Self {
            database: None,
            log_dir: None,
            log_level: None,
            seed: Some(DEFAULT_SEED),
            n_views: 5,
            delay: 5,
            n_batches: 5,
            batches_per_participant: 2,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: serde_json::Error },
    /// File exists but has no section for the requested mode.
    MissingMode(&'static str),
    InvalidMode(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config at {}: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse config at {}: {source}", path.display())
            }
            Self::MissingMode(mode) => write!(f, "config has no `{mode}` section"),
            Self::InvalidMode(value) => write!(
                f,
                "unsupported mode `{value}`; expected development|test|production"
            ),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::MissingMode(_) | Self::InvalidMode(_) => None,
        }
    }
}

/// Loads the section for `mode` from `path`.
pub fn load_config(path: &Path, mode: ConfigMode) -> Result<ViewPlanConfig, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Ok(ViewPlanConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    parse_config(&content, mode).map_err(|err| match err {
        ConfigError::Parse { source, .. } => ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })
}

/// Parses a config document and selects `mode`.
pub fn parse_config(content: &str, mode: ConfigMode) -> Result<ViewPlanConfig, ConfigError> {
    let mut sections: HashMap<String, ViewPlanConfig> =
        serde_json::from_str(content).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
    sections
        .remove(mode.as_str())
        .ok_or(ConfigError::MissingMode(mode.as_str()))
}
