//! # Configuration
//!
//! Settings are layered, later layers winning:
//!
//! 1. Built-in defaults (in-memory store, entropy-seeded RNG, text logs).
//! 2. An optional YAML file given with `--config`.
//! 3. Environment variables:
//!    - `MEDCRED_DATABASE_URL`: SQLite URL or path.
//!    - `MEDCRED_RNG_SEED`: unsigned 64-bit seed.
//!    - `MEDCRED_LOG_FORMAT`: `text` or `json`.
//! 4. Command-line flags.

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("expected `text` or `json`, got {other:?}")),
        }
    }
}

/// Resolved runtime configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MedcredConfig {
    /// SQLite database; `None` keeps issued credentials in memory.
    pub database_url: Option<String>,
    /// Fixed RNG seed for reproducible output.
    pub rng_seed: Option<u64>,
    /// Log output format.
    pub log_format: LogFormat,
}

/// Values supplied on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub database_url: Option<String>,
    pub rng_seed: Option<u64>,
    pub log_format: Option<LogFormat>,
}

impl MedcredConfig {
    /// Resolve configuration from every layer.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed, or an
    /// environment variable holds an invalid value.
    pub fn load(path: Option<&Path>, overrides: &Overrides) -> Result<Self, ConfigError> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        Ok(base
            .with_env(|var| std::env::var(var).ok())?
            .with_overrides(overrides))
    }

    /// Read a YAML configuration file.
    ///
    /// # Errors
    ///
    /// `ConfigError::Read` or `ConfigError::Parse`.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply environment variables obtained through `lookup`.
    ///
    /// # Errors
    ///
    /// `ConfigError::InvalidVar` for an unparseable seed or log format.
    pub fn with_env(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(url) = lookup("MEDCRED_DATABASE_URL").filter(|v| !v.trim().is_empty()) {
            self.database_url = Some(url);
        }
        if let Some(raw) = lookup("MEDCRED_RNG_SEED") {
            let seed = raw.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidVar {
                    var: "MEDCRED_RNG_SEED",
                    reason: e.to_string(),
                }
            })?;
            self.rng_seed = Some(seed);
        }
        if let Some(raw) = lookup("MEDCRED_LOG_FORMAT") {
            self.log_format = raw
                .parse()
                .map_err(|reason| ConfigError::InvalidVar {
                    var: "MEDCRED_LOG_FORMAT",
                    reason,
                })?;
        }
        Ok(self)
    }

    /// Apply command-line flags.
    pub fn with_overrides(mut self, overrides: &Overrides) -> Self {
        if let Some(url) = &overrides.database_url {
            self.database_url = Some(url.clone());
        }
        if let Some(seed) = overrides.rng_seed {
            self.rng_seed = Some(seed);
        }
        if let Some(format) = overrides.log_format {
            self.log_format = format;
        }
        self
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid value for {var}: {reason}")]
    InvalidVar { var: &'static str, reason: String },
}
