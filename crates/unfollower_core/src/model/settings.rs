//! Persisted records of the unfollower store.
//!
//! # Invariants
//! - At most one `UserSettings` exists per `requesting_user_id`.
//! - `UnfollowerRecord`s of one (user, account) pair form one snapshot and
//!   are only ever replaced as a whole.

use serde::{Deserialize, Serialize};

/// Platform id of the bot user who owns monitoring relationships and settings.
pub type UserId = i64;

/// Instagram account id (monitored account, linked account or unfollower).
pub type AccountId = i64;

/// One account observed to have unfollowed a monitored account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnfollowerRecord {
    pub requesting_user_id: UserId,
    pub monitored_account_id: AccountId,
    pub unfollower_account_id: AccountId,
}

/// Per-user preferences, created lazily on first write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSettings {
    /// Owning bot user; unique key.
    pub requesting_user_id: UserId,
    /// Instagram account linked by the user, if any.
    pub linked_account_id: Option<AccountId>,
    /// Whether background notification delivery is active.
    pub notifications_enabled: bool,
    /// Preferred display language code.
    pub language: Option<String>,
}

impl UserSettings {
    /// Creates the row shape used on first write: nothing linked,
    /// notifications off, no language.
    pub fn new(requesting_user_id: UserId) -> Self {
        Self {
            requesting_user_id,
            linked_account_id: None,
            notifications_enabled: false,
            language: None,
        }
    }
}
