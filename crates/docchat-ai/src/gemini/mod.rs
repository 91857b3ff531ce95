//! Google Gemini API client.
//!
//! Implements the `AiClient` trait over the Generative Language API:
//! the Files API for document upload/deletion and `generateContent`
//! for grounded answers.

mod api;
mod client;
mod config;
mod files;

pub use client::{FileState, GeminiClient};
pub use config::GeminiConfig;
