//! Error type for `dialectic-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] dialectic_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// Attempted to supersede a response that was not found.
  #[error("response not found: {0}")]
  ResponseNotFound(uuid::Uuid),

  #[error("response {0} is already superseded")]
  AlreadySuperseded(uuid::Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
