//! User settings repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Read and write the per-user settings row.
//! - Implement lazy row creation as an explicit update-then-insert.
//!
//! # Invariants
//! - `telegram_users.telegram_id` is unique; an insert racing another first
//!   write fails on the constraint instead of duplicating the row.
//! - Notification toggles never create rows.

use super::{RepoError, RepoResult};
use crate::model::settings::{AccountId, UserId, UserSettings};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashSet;

/// Repository interface for per-user settings.
pub trait SettingsRepository {
    /// Loads the settings row of `user_id`, if present.
    fn get_settings(&self, user_id: UserId) -> RepoResult<Option<UserSettings>>;
    /// Sets the linked account, creating the row with defaults when absent.
    fn upsert_linked_account(&self, user_id: UserId, account_id: AccountId) -> RepoResult<()>;
    /// Sets or clears the language, creating the row with defaults when absent.
    fn upsert_language(&self, user_id: UserId, language: Option<&str>) -> RepoResult<()>;
    /// Updates the notification flag of an existing row.
    ///
    /// Returns `false` when no row exists.
    fn set_notifications(&self, user_id: UserId, enabled: bool) -> RepoResult<bool>;
    /// Returns ids of every user with notifications enabled.
    fn notification_enabled_user_ids(&self) -> RepoResult<HashSet<UserId>>;
}

/// SQLite-backed settings repository.
pub struct SqliteSettingsRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSettingsRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn insert_default_with(
        &self,
        user_id: UserId,
        linked_account_id: Option<AccountId>,
        language: Option<&str>,
    ) -> RepoResult<()> {
        let defaults = UserSettings::new(user_id);
        self.conn.execute(
            "INSERT INTO telegram_users (
                telegram_id,
                instagram_id,
                is_notified,
                language
            ) VALUES (?1, ?2, ?3, ?4);",
            params![
                defaults.requesting_user_id,
                linked_account_id,
                bool_to_int(defaults.notifications_enabled),
                language,
            ],
        )?;
        Ok(())
    }
}

impl SettingsRepository for SqliteSettingsRepository<'_> {
    fn get_settings(&self, user_id: UserId) -> RepoResult<Option<UserSettings>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT telegram_id, instagram_id, is_notified, language
             FROM telegram_users
             WHERE telegram_id = ?1;",
        )?;
        let row = stmt
            .query_row([user_id], |row| Ok(parse_settings_row(row)))
            .optional()?;
        row.transpose()
    }

    fn upsert_linked_account(&self, user_id: UserId, account_id: AccountId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE telegram_users SET instagram_id = ?2 WHERE telegram_id = ?1;",
            params![user_id, account_id],
        )?;
        if changed == 0 {
            self.insert_default_with(user_id, Some(account_id), None)?;
        }
        Ok(())
    }

    fn upsert_language(&self, user_id: UserId, language: Option<&str>) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE telegram_users SET language = ?2 WHERE telegram_id = ?1;",
            params![user_id, language],
        )?;
        if changed == 0 {
            self.insert_default_with(user_id, None, language)?;
        }
        Ok(())
    }

    fn set_notifications(&self, user_id: UserId, enabled: bool) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE telegram_users SET is_notified = ?2 WHERE telegram_id = ?1;",
            params![user_id, bool_to_int(enabled)],
        )?;
        Ok(changed > 0)
    }

    fn notification_enabled_user_ids(&self) -> RepoResult<HashSet<UserId>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT telegram_id
             FROM telegram_users
             WHERE is_notified = 1;",
        )?;
        let ids = stmt
            .query_map([], |row| row.get::<_, UserId>(0))?
            .collect::<rusqlite::Result<HashSet<_>>>()?;
        Ok(ids)
    }
}

fn parse_settings_row(row: &Row<'_>) -> RepoResult<UserSettings> {
    let notifications_enabled = match row.get::<_, i64>("is_notified")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_notified value `{other}` in telegram_users.is_notified"
            )));
        }
    };

    Ok(UserSettings {
        requesting_user_id: row.get("telegram_id")?,
        linked_account_id: row.get("instagram_id")?,
        notifications_enabled,
        language: row.get("language")?,
    })
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
