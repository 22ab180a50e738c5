//! Remote chat endpoint abstraction.
//!
//! - `ChatEndpoint`: session creation and streaming turns against the
//!   backend chat-completion API

pub mod endpoint;
