//! Chat session management for the NIA companion.
//!
//! - `transcript`: ordered, persisted message history
//! - `handle`: remote session handle kept in sync with the transcript
//! - `manager`: streaming turn controller with cancellation

pub mod handle;
pub mod manager;
pub mod transcript;

#[cfg(test)]
pub(crate) mod testing;
