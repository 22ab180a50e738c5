//! Transcript persistence abstraction.

pub mod persistence;
