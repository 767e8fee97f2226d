//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{JsonRejection, QueryRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use dialectic_engine::Error as EngineError;
use serde_json::json;
use thiserror::Error;

/// Message returned for every 500; the cause is only logged.
pub const INTERNAL_MESSAGE: &str = "internal server error";

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("unauthorized")]
  Unauthorized,

  #[error("not found: {0}")]
  NotFound(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("internal error: {0}")]
  Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<EngineError> for ApiError {
  fn from(e: EngineError) -> Self {
    match e {
      EngineError::NotInitialized(_) | EngineError::ResponseNotFound(_) => {
        ApiError::NotFound(e.to_string())
      }
      EngineError::AlreadyAnswered(_)
      | EngineError::NotAnswered(_)
      | EngineError::AlreadySuperseded(_)
      | EngineError::ContradictionPending
      | EngineError::StageNotReached { .. } => ApiError::Conflict(e.to_string()),
      EngineError::EmptyAnswer
      | EngineError::EmptyResolution
      | EngineError::EmptyTheme
      | EngineError::Core(
        dialectic_core::Error::UnknownStage(_) | dialectic_core::Error::UnknownStatus(_),
      ) => ApiError::BadRequest(e.to_string()),
      EngineError::Core(_) => ApiError::Internal(Box::new(e)),
      EngineError::Store(inner) => ApiError::Internal(inner),
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self { ApiError::BadRequest(rejection.body_text()) }
}

impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self { ApiError::BadRequest(rejection.body_text()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized".to_owned()),
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Internal(e) => {
        tracing::error!(error = %e, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_owned())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
