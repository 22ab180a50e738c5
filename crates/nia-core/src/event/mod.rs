//! Transcript event broadcasting.

pub mod bus;
