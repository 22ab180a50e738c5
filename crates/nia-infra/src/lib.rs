//! Infrastructure layer for the NIA companion.
//!
//! Contains implementations of the traits defined in `nia-core`: SQLite and
//! in-memory transcript persistence, the Gemini chat endpoint, plus config
//! and data directory helpers.

pub mod config;
pub mod filesystem;
pub mod llm;
pub mod sqlite;
pub mod storage;
