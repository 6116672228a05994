//! Environment-driven configuration for processes embedding the store.
//!
//! # Responsibility
//! - Resolve the storage URL and logging options from the environment.
//! - Fall back to stable defaults for blank or missing values.

use crate::logging::default_log_level;
use std::path::PathBuf;

pub const DATABASE_URL_ENV: &str = "UNFOLLOWER_DB_URL";
pub const LOG_LEVEL_ENV: &str = "UNFOLLOWER_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "UNFOLLOWER_LOG_DIR";
pub const DEFAULT_DATABASE_URL: &str = "sqlite:///unfollowers.db";

/// Resolved store configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Storage URL handed to `UnfollowerStore::open`.
    pub database_url: String,
    /// Log level name accepted by `init_logging`.
    pub log_level: String,
    /// Absolute log directory; logging stays off when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl StoreConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_blank = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            database_url: non_blank(DATABASE_URL_ENV).unwrap_or(defaults.database_url),
            log_level: non_blank(LOG_LEVEL_ENV).unwrap_or(defaults.log_level),
            log_dir: non_blank(LOG_DIR_ENV).map(PathBuf::from),
        }
    }
}
