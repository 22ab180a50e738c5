//! Interactive CLI chat with NIA.
//!
//! Streams replies as they arrive, shows a spinner until the first delta,
//! and lets Ctrl+C stop a reply mid-stream. Entry point:
//! `loop_runner::run_chat_loop`.

pub mod banner;
pub mod commands;
pub mod input;
pub mod loop_runner;
pub mod renderer;
