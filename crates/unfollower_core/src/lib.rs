//! Persistence layer of the Instagram unfollower bot.
//!
//! Records which accounts unfollowed each monitored Instagram account, per
//! requesting bot user, and keeps per-user settings (linked account,
//! notification flag, language). Everything goes through [`UnfollowerStore`].

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::StoreConfig;
pub use db::{DbError, StorageLocation};
pub use logging::{default_log_level, flush_logging, init_logging, logging_status};
pub use model::settings::{AccountId, UnfollowerRecord, UserId, UserSettings};
pub use repo::settings_repo::{SettingsRepository, SqliteSettingsRepository};
pub use repo::unfollower_repo::{ReplaceOutcome, SqliteUnfollowerRepository, UnfollowerRepository};
pub use repo::{RepoError, RepoResult};
pub use service::unfollower_store::{StoreError, StoreResult, UnfollowerStore};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
