//! Error type for `dialectic-ollama`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("failed to build HTTP client: {0}")]
  Client(#[source] reqwest::Error),

  #[error("request to {url} failed: {source}")]
  Http {
    url:    String,
    #[source]
    source: reqwest::Error,
  },

  /// The backend answered with a non-2xx status.
  #[error("backend returned {status}: {body}")]
  Status { status: u16, body: String },

  #[error("could not decode backend response: {0}")]
  Decode(#[source] reqwest::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
