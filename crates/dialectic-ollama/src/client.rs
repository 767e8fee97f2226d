//! [`OllamaGateway`] — the HTTP implementation of [`Gateway`].

use std::time::Duration;

use dialectic_core::gateway::{Gateway, Sampling};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{Error, Result, clean::strip_reasoning};

/// Default Ollama API endpoint.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:11434";

/// Default model name.
pub const DEFAULT_MODEL: &str = "deepseek-r1";

/// Connection settings for the generation backend.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
  pub base_url: String,
  pub model:    String,
  /// Whole-request timeout. Generation on local hardware can be slow.
  pub timeout:  Duration,
}

impl Default for OllamaConfig {
  fn default() -> Self {
    Self {
      base_url: DEFAULT_BASE_URL.to_owned(),
      model:    DEFAULT_MODEL.to_owned(),
      timeout:  Duration::from_secs(120),
    }
  }
}

/// Body of `POST /api/generate`.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest<'a> {
  pub model:       &'a str,
  pub prompt:      &'a str,
  pub stream:      bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub temperature: Option<f32>,
}

/// Non-streaming response from `POST /api/generate`. Only the generated text
/// is read; every other field is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
  #[serde(default)]
  pub response: String,
}

/// Async client for the generation endpoint.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct OllamaGateway {
  client: Client,
  config: OllamaConfig,
}

impl OllamaGateway {
  pub fn new(config: OllamaConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(config.timeout)
      .build()
      .map_err(Error::Client)?;
    Ok(Self { client, config })
  }

  fn url(&self) -> String {
    format!("{}/api/generate", self.config.base_url.trim_end_matches('/'))
  }

  /// `POST /api/generate` — returns the cleaned generated text.
  pub async fn generate_text(&self, prompt: &str, sampling: Sampling) -> Result<String> {
    let url = self.url();
    let body = GenerateRequest {
      model: &self.config.model,
      prompt,
      stream: false,
      temperature: sampling.temperature,
    };

    tracing::debug!(%url, model = %self.config.model, ?sampling, "sending generation request");

    let resp = self
      .client
      .post(&url)
      .json(&body)
      .send()
      .await
      .map_err(|source| Error::Http { url: url.clone(), source })?;

    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      tracing::error!(%url, status = status.as_u16(), %body, "generation backend error");
      return Err(Error::Status { status: status.as_u16(), body });
    }

    let data: GenerateResponse = resp.json().await.map_err(Error::Decode)?;
    Ok(strip_reasoning(&data.response))
  }
}

impl Gateway for OllamaGateway {
  type Error = Error;

  async fn generate(&self, prompt: &str, sampling: Sampling) -> Result<String> {
    self.generate_text(prompt, sampling).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn request_body_matches_generate_contract() {
    let body = GenerateRequest {
      model:       "deepseek-r1",
      prompt:      "hello",
      stream:      false,
      temperature: Some(0.2),
    };
    let json = serde_json::to_value(&body).unwrap();
    assert_eq!(json["model"], "deepseek-r1");
    assert_eq!(json["prompt"], "hello");
    assert_eq!(json["stream"], false);
    assert!((json["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
  }

  #[test]
  fn temperature_is_omitted_when_unset() {
    let body = GenerateRequest {
      model:       "m",
      prompt:      "p",
      stream:      false,
      temperature: None,
    };
    let json = serde_json::to_value(&body).unwrap();
    assert!(json.get("temperature").is_none());
  }

  #[test]
  fn response_ignores_extra_fields() {
    let data: GenerateResponse = serde_json::from_str(
      r#"{"model":"m","response":"<think>x</think>Hi","done":true}"#,
    )
    .unwrap();
    assert_eq!(strip_reasoning(&data.response), "Hi");
  }

  #[test]
  fn url_tolerates_trailing_slash() {
    let gw = OllamaGateway::new(OllamaConfig {
      base_url: "http://localhost:11434/".into(),
      ..OllamaConfig::default()
    })
    .unwrap();
    assert_eq!(gw.url(), "http://localhost:11434/api/generate");
  }

  #[tokio::test]
  async fn unreachable_backend_is_an_http_error() {
    // Port 9 (discard) on localhost is not expected to serve HTTP.
    let gw = OllamaGateway::new(OllamaConfig {
      base_url: "http://127.0.0.1:9".into(),
      timeout:  Duration::from_secs(2),
      ..OllamaConfig::default()
    })
    .unwrap();
    let err = gw.generate("hi", Sampling::default()).await.unwrap_err();
    assert!(matches!(err, Error::Http { .. }));
  }
}
