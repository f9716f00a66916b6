//! Database repositories for the murmur server.
//!
//! This module provides the Postgres-backed implementation of the
//! conversation store trait. User and session repositories live under
//! [`crate::auth::db`].

pub mod conversation;

pub use conversation::PgConversationStore;
