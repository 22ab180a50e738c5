//! Google Gemini chat endpoint.
//!
//! This module provides the [`GeminiEndpoint`] which implements the
//! [`ChatEndpoint`](nia_core::llm::endpoint::ChatEndpoint) trait for the
//! Generative Language REST API, including SSE streaming.

pub mod client;
pub mod streaming;
pub mod types;

pub use client::GeminiEndpoint;
