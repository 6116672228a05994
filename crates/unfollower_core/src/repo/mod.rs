//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define data access contracts for unfollower snapshots and user settings.
//! - Isolate SQLite query details from the store's transaction handling.
//!
//! # Invariants
//! - Repositories never open or commit transactions themselves; multi-statement
//!   writes are atomic only when the borrowed connection is a transaction.
//! - Persisted values that cannot be mapped back are reported as
//!   `RepoError::InvalidData`, never masked.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod settings_repo;
pub mod unfollower_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by unfollower and settings persistence.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
