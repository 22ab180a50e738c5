//! Non-SQLite transcript persistence.

pub mod memory;
