//! Chat session manager and collaborator traits for the NIA companion.
//!
//! This crate defines the "ports" (persistence and chat endpoint traits)
//! that the infrastructure layer implements, plus the session manager that
//! drives streaming turns over them. It depends only on `nia-types` -- never
//! on `nia-infra` or any database/HTTP crate.

pub mod chat;
pub mod event;
pub mod llm;
pub mod storage;
