//! Storage URL resolution.
//!
//! Accepts the SQLAlchemy-style SQLite URLs the bot has always been configured
//! with, plus bare file paths:
//!
//! | input                          | location              |
//! |--------------------------------|-----------------------|
//! | `sqlite://`, `sqlite:///`      | in-memory             |
//! | `sqlite://:memory:`            | in-memory             |
//! | `sqlite::memory:`, `:memory:`  | in-memory             |
//! | `sqlite:///data/bot.db`        | `data/bot.db`         |
//! | `sqlite:////var/lib/bot.db`    | `/var/lib/bot.db`     |
//! | `data/bot.db`                  | `data/bot.db`         |
//!
//! Any other scheme is rejected. Query strings on sqlite URLs are ignored.

use super::{DbError, DbResult};
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

const SQLITE_SCHEME: &str = "sqlite:";
const MEMORY_MARKER: &str = ":memory:";

/// Concrete SQLite location resolved from a storage URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageLocation {
    /// Private database living as long as the owning store.
    Memory,
    /// Database file on disk, created on first open.
    File(PathBuf),
}

impl StorageLocation {
    /// Resolves a storage URL or bare path.
    ///
    /// # Errors
    /// - `DbError::UnsupportedUrl` for empty input, non-sqlite schemes and
    ///   sqlite URLs carrying a host component.
    pub fn parse(url: &str) -> DbResult<Self> {
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Err(DbError::UnsupportedUrl(url.to_string()));
        }
        if trimmed == MEMORY_MARKER {
            return Ok(Self::Memory);
        }

        let Some(rest) = trimmed.strip_prefix(SQLITE_SCHEME) else {
            if trimmed.contains("://") {
                return Err(DbError::UnsupportedUrl(trimmed.to_string()));
            }
            return Ok(Self::File(PathBuf::from(trimmed)));
        };

        let rest = rest.split('?').next().unwrap_or_default();
        if rest == MEMORY_MARKER {
            return Ok(Self::Memory);
        }

        let Some(authority_and_path) = rest.strip_prefix("//") else {
            return Err(DbError::UnsupportedUrl(trimmed.to_string()));
        };
        if authority_and_path.is_empty() || authority_and_path == MEMORY_MARKER {
            return Ok(Self::Memory);
        }

        match authority_and_path.strip_prefix('/') {
            Some(path) if path.is_empty() || path == MEMORY_MARKER => Ok(Self::Memory),
            Some(path) => Ok(Self::File(PathBuf::from(path))),
            None => Err(DbError::UnsupportedUrl(trimmed.to_string())),
        }
    }

    /// Short label used in log events.
    pub fn mode(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::File(_) => "file",
        }
    }
}

impl Display for StorageLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Memory => write!(f, "{MEMORY_MARKER}"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}
