//! Caller-facing services.
//!
//! # Responsibility
//! - Wrap repository calls in transactions and expose them as one store API.
//! - Keep bot command handlers decoupled from SQL and connection handling.

pub mod unfollower_store;
