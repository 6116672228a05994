//! Unfollower snapshot repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Read the union of known unfollowers of one requesting user.
//! - Replace the snapshot of one (user, monitored account) pair.
//!
//! # Invariants
//! - Replace is delete-then-insert; it never merges with the prior snapshot.
//! - Rows of other pairs are never touched by a replace.

use super::RepoResult;
use crate::model::settings::{AccountId, UnfollowerRecord, UserId};
use rusqlite::{params, Connection};
use std::collections::HashSet;

/// Row counts produced by one snapshot replace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaceOutcome {
    pub removed: usize,
    pub inserted: usize,
}

/// Repository interface for unfollower snapshots.
pub trait UnfollowerRepository {
    /// Returns unfollower ids across every monitored account of `user_id`.
    fn known_unfollowers(&self, user_id: UserId) -> RepoResult<HashSet<AccountId>>;
    /// Lists the raw records of one pair, ordered by unfollower id.
    fn list_records(
        &self,
        user_id: UserId,
        monitored_account_id: AccountId,
    ) -> RepoResult<Vec<UnfollowerRecord>>;
    /// Replaces the snapshot of one pair with `unfollower_ids`.
    fn replace_unfollowers(
        &self,
        user_id: UserId,
        monitored_account_id: AccountId,
        unfollower_ids: &HashSet<AccountId>,
    ) -> RepoResult<ReplaceOutcome>;
}

/// SQLite-backed unfollower repository.
pub struct SqliteUnfollowerRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUnfollowerRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl UnfollowerRepository for SqliteUnfollowerRepository<'_> {
    fn known_unfollowers(&self, user_id: UserId) -> RepoResult<HashSet<AccountId>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT DISTINCT instagram_unfollower_id
             FROM unfollowers
             WHERE telegram_author_id = ?1;",
        )?;
        let ids = stmt
            .query_map([user_id], |row| row.get::<_, AccountId>(0))?
            .collect::<rusqlite::Result<HashSet<_>>>()?;
        Ok(ids)
    }

    fn list_records(
        &self,
        user_id: UserId,
        monitored_account_id: AccountId,
    ) -> RepoResult<Vec<UnfollowerRecord>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT telegram_author_id, instagram_author_id, instagram_unfollower_id
             FROM unfollowers
             WHERE telegram_author_id = ?1
               AND instagram_author_id = ?2
             ORDER BY instagram_unfollower_id ASC, id ASC;",
        )?;
        let records = stmt
            .query_map(params![user_id, monitored_account_id], |row| {
                Ok(UnfollowerRecord {
                    requesting_user_id: row.get(0)?,
                    monitored_account_id: row.get(1)?,
                    unfollower_account_id: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    fn replace_unfollowers(
        &self,
        user_id: UserId,
        monitored_account_id: AccountId,
        unfollower_ids: &HashSet<AccountId>,
    ) -> RepoResult<ReplaceOutcome> {
        let removed = self.conn.execute(
            "DELETE FROM unfollowers
             WHERE telegram_author_id = ?1
               AND instagram_author_id = ?2;",
            params![user_id, monitored_account_id],
        )?;

        let mut insert = self.conn.prepare_cached(
            "INSERT INTO unfollowers (
                instagram_author_id,
                telegram_author_id,
                instagram_unfollower_id
            ) VALUES (?1, ?2, ?3);",
        )?;
        for unfollower_id in unfollower_ids {
            insert.execute(params![monitored_account_id, user_id, unfollower_id])?;
        }

        Ok(ReplaceOutcome {
            removed,
            inserted: unfollower_ids.len(),
        })
    }
}
