//! Configuration for doppel.
//!
//! ```toml
//! [mocks]
//! default_answer = "zero_values"   # or "call_real_methods"
//! verbose_logging = false
//!
//! [verification]
//! default_cardinality = "at_least_once"   # or "exactly_once"
//! ```
//!
//! The file is looked up at `$DOPPEL_CONFIG`, falling back to
//! `~/.doppel/config.toml`. A missing file is not an error.

use std::path::{Path, PathBuf};
use std::{env, fs, io};

use doppel_types::Times;
use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_ENV_VAR: &str = "DOPPEL_CONFIG";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DoppelConfig {
    pub mocks: Option<MocksConfig>,
    pub verification: Option<VerificationConfig>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

/// What an un-stubbed call does.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DefaultAnswer {
    /// Return the zero value of the method's return type.
    #[default]
    ZeroValues,
    /// Delegate to the real implementation (spies and partial mocks).
    CallRealMethods,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MocksConfig {
    #[serde(default)]
    pub default_answer: DefaultAnswer,
    /// Log every realized invocation at info level.
    #[serde(default)]
    pub verbose_logging: bool,
}

/// Cardinality used by `should()` when none is given.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DefaultCardinality {
    #[default]
    AtLeastOnce,
    ExactlyOnce,
}

impl DefaultCardinality {
    #[must_use]
    pub fn times(self) -> Times {
        match self {
            DefaultCardinality::AtLeastOnce => Times::at_least_once(),
            DefaultCardinality::ExactlyOnce => Times::once(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerificationConfig {
    #[serde(default)]
    pub default_cardinality: DefaultCardinality,
}

impl DoppelConfig {
    /// Load the config file, if there is one.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        let Some(path) = config_path() else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }
        Self::from_path(&path).map(Some)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match Self::parse(&content) {
            Ok(config) => Ok(config),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    #[must_use]
    pub fn default_answer(&self) -> DefaultAnswer {
        self.mocks
            .as_ref()
            .map(|m| m.default_answer)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn verbose_logging(&self) -> bool {
        self.mocks.as_ref().is_some_and(|m| m.verbose_logging)
    }

    #[must_use]
    pub fn default_times(&self) -> Times {
        self.verification
            .as_ref()
            .map(|v| v.default_cardinality)
            .unwrap_or_default()
            .times()
    }
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    if let Some(explicit) = env::var_os(CONFIG_ENV_VAR).filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(explicit));
    }
    dirs::home_dir().map(|home| home.join(".doppel").join("config.toml"))
}
