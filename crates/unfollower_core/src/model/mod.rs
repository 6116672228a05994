//! Domain model for unfollower snapshots and per-user settings.
//!
//! # Responsibility
//! - Define the plain records exchanged between repositories and callers.
//! - Name the integer ids so signatures state which id is which.

pub mod settings;
