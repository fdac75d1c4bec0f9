//! Google Gemini completion client.
//!
//! Implements the `CompletionClient` trait via the Generative Language API.

mod api;
mod client;
mod config;

pub use client::GeminiClient;
pub use config::GeminiConfig;
