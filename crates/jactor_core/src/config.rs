//! JSON configuration for the persistence core.
//!
//! # Responsibility
//! - Describe database location, logging setup and the default acting user.
//! - Load configuration from a JSON file with every section optional.
//!
//! # Invariants
//! - A missing database path selects an in-memory database.
//! - A missing actor falls back to [`DEFAULT_ACTOR`].

use crate::logging::default_log_level;
use crate::model::persistent::Actor;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

/// Actor stamped on writes when no request-specific actor is given.
pub const DEFAULT_ACTOR: &str = "jactor";

#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, source: std::io::Error },
    Parse(serde_json::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config json: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file path; `None` means in-memory.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `trace|debug|info|warn|error`; defaults by build mode.
    pub level: Option<String>,
    /// Absolute directory for rolling log files; logging stays off when unset.
    pub log_dir: Option<String>,
}

impl LoggingConfig {
    pub fn effective_level(&self) -> &str {
        self.level.as_deref().unwrap_or(default_log_level())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub actor: Option<String>,
}

impl CoreConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: CoreConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Actor used by the persistence handler for writes.
    pub fn actor(&self) -> Actor {
        Actor::new(self.actor.as_deref().unwrap_or(DEFAULT_ACTOR))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(actor) = &self.actor {
            if actor.trim().is_empty() {
                return Err(ConfigError::Invalid("actor cannot be blank".to_string()));
            }
        }
        if let Some(path) = &self.database.path {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::Invalid(
                    "database.path cannot be empty; omit it for in-memory".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Reads and validates a JSON configuration file.
pub fn load_config(path: impl AsRef<Path>) -> Result<CoreConfig, ConfigError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    CoreConfig::from_json_str(&raw)
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig, DEFAULT_ACTOR};

    #[test]
    fn empty_object_uses_defaults() {
        let config = CoreConfig::from_json_str("{}").unwrap();
        assert_eq!(config.database.path, None);
        assert_eq!(config.actor().as_str(), DEFAULT_ACTOR);
        assert!(config.logging.log_dir.is_none());
    }

    #[test]
    fn blank_actor_is_rejected() {
        let err = CoreConfig::from_json_str(r#"{"actor": "  "}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = CoreConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
