//! Host-supplied catalog configuration.
//!
//! # Responsibility
//! - Resolve the catalog database location and logging settings from the
//!   process environment.
//!
//! # Invariants
//! - Blank environment values are treated as unset.
//! - `LIBRARIAN_LOG_DIR`, when set, must be absolute.

use crate::logging::{default_log_level, LoggingConfig};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DATABASE_ENV: &str = "LIBRARIAN_DATABASE";
pub const LOG_LEVEL_ENV: &str = "LIBRARIAN_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "LIBRARIAN_LOG_DIR";
pub const DEFAULT_DATABASE: &str = "librarian.db";

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    RelativeLogDir(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RelativeLogDir(value) => {
                write!(f, "{LOG_DIR_ENV} must be an absolute path, got `{value}`")
            }
        }
    }
}

impl Error for ConfigError {}

/// Catalog settings resolved at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    pub database_path: PathBuf,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl CatalogConfig {
    /// Reads settings from `LIBRARIAN_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`, falling back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let defaults = Self::default();
        let log_dir = match read(LOG_DIR_ENV) {
            Some(value) => {
                let path = PathBuf::from(&value);
                if !path.is_absolute() {
                    return Err(ConfigError::RelativeLogDir(value));
                }
                Some(path)
            }
            None => None,
        };

        Ok(Self {
            database_path: read(DATABASE_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            log_level: read(LOG_LEVEL_ENV).unwrap_or(defaults.log_level),
            log_dir,
        })
    }

    /// Logging settings derived from this configuration.
    pub fn logging(&self) -> LoggingConfig {
        LoggingConfig {
            level: self.log_level.clone(),
            log_dir: self.log_dir.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CatalogConfig, ConfigError, DATABASE_ENV, LOG_DIR_ENV, LOG_LEVEL_ENV};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_values_fall_back_to_defaults() {
        let config = CatalogConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, CatalogConfig::default());
        assert_eq!(config.database_path, PathBuf::from("librarian.db"));
    }

    #[test]
    fn blank_values_are_treated_as_unset() {
        let config =
            CatalogConfig::from_lookup(lookup_from(&[(DATABASE_ENV, "  "), (LOG_DIR_ENV, "")]))
                .unwrap();
        assert_eq!(config.database_path, PathBuf::from("librarian.db"));
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn reads_all_values() {
        let config = CatalogConfig::from_lookup(lookup_from(&[
            (DATABASE_ENV, "/srv/books/catalog.db"),
            (LOG_LEVEL_ENV, "warn"),
            (LOG_DIR_ENV, "/var/log/librarian"),
        ]))
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/srv/books/catalog.db"));
        let logging = config.logging();
        assert_eq!(logging.level, "warn");
        assert_eq!(logging.log_dir, Some(PathBuf::from("/var/log/librarian")));
    }

    #[test]
    fn relative_log_dir_is_rejected() {
        let err = CatalogConfig::from_lookup(lookup_from(&[(LOG_DIR_ENV, "logs")])).unwrap_err();
        assert_eq!(err, ConfigError::RelativeLogDir("logs".to_string()));
    }
}
