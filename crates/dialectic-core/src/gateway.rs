//! The `Gateway` trait — the boundary to an external text-generation service.
//!
//! A gateway is treated as an untrusted, fuzzy generator: callers get back
//! cleaned text and decide for themselves what it means. Interpreting the
//! text (verdict markers, fallbacks) is the engine's job, never the
//! gateway's.

use std::future::Future;

/// Sampling parameters for a single generation call.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Sampling {
  /// Sampling temperature. `None` leaves the backend default in place.
  pub temperature: Option<f32>,
}

impl Sampling {
  pub const fn with_temperature(temperature: f32) -> Self {
    Self { temperature: Some(temperature) }
  }
}

/// Abstraction over a text-generation backend.
///
/// Implementations must strip any enclosed reasoning trace from the output
/// and trim surrounding whitespace before returning. Transport and backend
/// failures are returned as errors; callers fall back rather than retry.
pub trait Gateway: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Send `prompt` to the backend and return the cleaned output text.
  fn generate<'a>(
    &'a self,
    prompt: &'a str,
    sampling: Sampling,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'a;
}
