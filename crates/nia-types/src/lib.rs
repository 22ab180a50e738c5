//! Shared domain types for the NIA chat companion.
//!
//! Transcript messages, session handles, transcript events, error kinds and
//! the configuration model used across the workspace.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod event;
pub mod prompt;
