//! Transactional store over unfollower snapshots and user settings.
//!
//! # Responsibility
//! - Own the connection source resolved from one storage URL.
//! - Run every public operation as exactly one SQLite transaction.
//! - Map persistence failures to `StoreError`.
//!
//! # Invariants
//! - Each operation commits all of its writes or none of them; the
//!   transaction guard rolls back on every non-commit exit, panics included.
//! - Writes use `BEGIN IMMEDIATE`, so conflicting writers are serialized by
//!   SQLite and a first-write upsert cannot race another one.
//! - Lookups of unknown users yield empty values, never errors.

use crate::config::StoreConfig;
use crate::db::{self, StorageLocation};
use crate::model::settings::{AccountId, UnfollowerRecord, UserId, UserSettings};
use crate::repo::settings_repo::{SettingsRepository, SqliteSettingsRepository};
use crate::repo::unfollower_repo::{SqliteUnfollowerRepository, UnfollowerRepository};
use crate::repo::{RepoError, RepoResult};
use log::{debug, error, info};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced to store callers.
#[derive(Debug)]
pub enum StoreError {
    /// The database could not be opened, queried or committed.
    StorageUnavailable(RepoError),
    /// Reserved for caller-side validation; the store accepts any id.
    InvalidInput(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StorageUnavailable(err) => write!(f, "storage unavailable: {err}"),
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StorageUnavailable(err) => Some(err),
            Self::InvalidInput(_) => None,
        }
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::StorageUnavailable(value)
    }
}

impl From<db::DbError> for StoreError {
    fn from(value: db::DbError) -> Self {
        Self::StorageUnavailable(RepoError::Db(value))
    }
}

enum ConnectionSource {
    /// Single private connection; the lock spans one transaction.
    Memory(Mutex<Connection>),
    /// Migrated database file; every operation opens its own connection.
    File(PathBuf),
}

/// Explicitly owned storage handle for the monitoring bot.
///
/// The handle is `Send + Sync`; share it behind an `Arc` between command
/// handlers and the notification polling loop.
pub struct UnfollowerStore {
    location: StorageLocation,
    source: ConnectionSource,
}

impl UnfollowerStore {
    /// Opens the store at `url`, creating and migrating the schema if needed.
    ///
    /// See [`StorageLocation::parse`] for accepted URL forms.
    pub fn open(url: &str) -> StoreResult<Self> {
        let location = StorageLocation::parse(url)?;
        let source = match &location {
            StorageLocation::Memory => ConnectionSource::Memory(Mutex::new(db::open_db_in_memory()?)),
            StorageLocation::File(path) => {
                // Migrate once up front; per-operation connections skip it.
                drop(db::open_db(path)?);
                ConnectionSource::File(path.clone())
            }
        };
        info!(
            "event=store_open module=store status=ok mode={} location={}",
            location.mode(),
            location
        );
        Ok(Self { location, source })
    }

    /// Opens the store configured by `config.database_url`.
    pub fn from_config(config: &StoreConfig) -> StoreResult<Self> {
        Self::open(&config.database_url)
    }

    /// Storage location this store was opened on.
    pub fn location(&self) -> &StorageLocation {
        &self.location
    }

    /// Returns unfollower ids known for `user_id` across all monitored accounts.
    pub fn known_unfollowers(&self, user_id: UserId) -> StoreResult<HashSet<AccountId>> {
        self.run("known_unfollowers", TransactionBehavior::Deferred, |tx| {
            SqliteUnfollowerRepository::new(tx).known_unfollowers(user_id)
        })
    }

    /// Atomically replaces the snapshot of the (`user_id`, `monitored_account_id`) pair.
    ///
    /// An empty `unfollower_ids` leaves the pair without rows.
    pub fn replace_known_unfollowers(
        &self,
        user_id: UserId,
        monitored_account_id: AccountId,
        unfollower_ids: &HashSet<AccountId>,
    ) -> StoreResult<()> {
        let outcome = self.run(
            "replace_known_unfollowers",
            TransactionBehavior::Immediate,
            |tx| {
                SqliteUnfollowerRepository::new(tx).replace_unfollowers(
                    user_id,
                    monitored_account_id,
                    unfollower_ids,
                )
            },
        )?;
        debug!(
            "event=unfollowers_replaced module=store status=ok user_id={} account_id={} removed={} inserted={}",
            user_id, monitored_account_id, outcome.removed, outcome.inserted
        );
        Ok(())
    }

    /// Lists the stored snapshot of one (`user_id`, `monitored_account_id`) pair,
    /// ordered by unfollower id.
    pub fn unfollower_records(
        &self,
        user_id: UserId,
        monitored_account_id: AccountId,
    ) -> StoreResult<Vec<UnfollowerRecord>> {
        self.run("unfollower_records", TransactionBehavior::Deferred, |tx| {
            SqliteUnfollowerRepository::new(tx).list_records(user_id, monitored_account_id)
        })
    }

    /// Returns the linked account of `user_id`; never creates a settings row.
    pub fn linked_account_id(&self, user_id: UserId) -> StoreResult<Option<AccountId>> {
        let settings = self.settings_row("linked_account_id", user_id)?;
        Ok(settings.and_then(|settings| settings.linked_account_id))
    }

    /// Links `account_id` to `user_id`, creating the settings row if absent.
    pub fn set_linked_account_id(&self, user_id: UserId, account_id: AccountId) -> StoreResult<()> {
        self.run("set_linked_account_id", TransactionBehavior::Immediate, |tx| {
            SqliteSettingsRepository::new(tx).upsert_linked_account(user_id, account_id)
        })
    }

    /// Turns notifications on. Returns `false` when `user_id` has no settings row.
    pub fn enable_notifications(&self, user_id: UserId) -> StoreResult<bool> {
        self.toggle_notifications("enable_notifications", user_id, true)
    }

    /// Turns notifications off. Returns `false` when `user_id` has no settings row.
    pub fn disable_notifications(&self, user_id: UserId) -> StoreResult<bool> {
        self.toggle_notifications("disable_notifications", user_id, false)
    }

    /// Returns every user whose notifications are enabled.
    pub fn notification_enabled_user_ids(&self) -> StoreResult<HashSet<UserId>> {
        self.run(
            "notification_enabled_user_ids",
            TransactionBehavior::Deferred,
            |tx| SqliteSettingsRepository::new(tx).notification_enabled_user_ids(),
        )
    }

    /// Returns the language of `user_id`, if a row exists and one is set.
    pub fn language(&self, user_id: UserId) -> StoreResult<Option<String>> {
        let settings = self.settings_row("language", user_id)?;
        Ok(settings.and_then(|settings| settings.language))
    }

    /// Sets or clears (`None`) the language, creating the settings row if absent.
    pub fn set_language(&self, user_id: UserId, language: Option<&str>) -> StoreResult<()> {
        self.run("set_language", TransactionBehavior::Immediate, |tx| {
            SqliteSettingsRepository::new(tx).upsert_language(user_id, language)
        })
    }

    /// Returns the whole settings row of `user_id` without creating it.
    pub fn user_settings(&self, user_id: UserId) -> StoreResult<Option<UserSettings>> {
        self.settings_row("user_settings", user_id)
    }

    fn settings_row(&self, op: &'static str, user_id: UserId) -> StoreResult<Option<UserSettings>> {
        self.run(op, TransactionBehavior::Deferred, |tx| {
            SqliteSettingsRepository::new(tx).get_settings(user_id)
        })
    }

    fn toggle_notifications(
        &self,
        op: &'static str,
        user_id: UserId,
        enabled: bool,
    ) -> StoreResult<bool> {
        let updated = self.run(op, TransactionBehavior::Immediate, |tx| {
            SqliteSettingsRepository::new(tx).set_notifications(user_id, enabled)
        })?;
        if !updated {
            debug!(
                "event=notifications_toggle module=store status=skipped user_id={} reason=no_settings_row",
                user_id
            );
        }
        Ok(updated)
    }

    fn run<T>(
        &self,
        op: &'static str,
        behavior: TransactionBehavior,
        f: impl FnOnce(&Transaction<'_>) -> RepoResult<T>,
    ) -> StoreResult<T> {
        let started_at = Instant::now();
        let result = match &self.source {
            ConnectionSource::Memory(conn) => {
                // A panicking holder already rolled its transaction back.
                let mut conn = conn.lock().unwrap_or_else(PoisonError::into_inner);
                in_transaction(&mut conn, behavior, f)
            }
            ConnectionSource::File(path) => db::connect(path)
                .map_err(RepoError::from)
                .and_then(|mut conn| in_transaction(&mut conn, behavior, f)),
        };

        match result {
            Ok(value) => {
                debug!(
                    "event=store_op module=store status=ok op={} duration_ms={}",
                    op,
                    started_at.elapsed().as_millis()
                );
                Ok(value)
            }
            Err(err) => {
                error!(
                    "event=store_op module=store status=error op={} duration_ms={} error_code=storage_unavailable error={}",
                    op,
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(StoreError::StorageUnavailable(err))
            }
        }
    }
}

fn in_transaction<T>(
    conn: &mut Connection,
    behavior: TransactionBehavior,
    f: impl FnOnce(&Transaction<'_>) -> RepoResult<T>,
) -> RepoResult<T> {
    let tx = conn.transaction_with_behavior(behavior)?;
    let value = f(&tx)?;
    tx.commit()?;
    Ok(value)
}
