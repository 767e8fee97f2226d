//! Ollama backend for the Dialectic language-model gateway.
//!
//! Sends prompts to `POST {base_url}/api/generate` (non-streaming) and
//! returns the generated text with any `<think>…</think>` reasoning trace
//! removed.

mod client;
mod clean;

pub mod error;

pub use clean::strip_reasoning;
pub use client::{
  DEFAULT_BASE_URL, DEFAULT_MODEL, GenerateRequest, GenerateResponse, OllamaConfig, OllamaGateway,
};
pub use error::{Error, Result};
