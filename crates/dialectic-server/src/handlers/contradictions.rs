//! Handlers for the contradiction-resolution workflow.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/contradictions/resolve` | Returns one clarifying question |
//! | `POST` | `/contradictions/check-resolution` | Body: `{"resolution_text":"…"}` |

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
};
use dialectic_core::{gateway::Gateway, store::SessionStore};
use serde::{Deserialize, Serialize};

use crate::{AppState, auth::CurrentUser, error::ApiError};

#[derive(Debug, Serialize)]
pub struct ClarifyingQuestion {
  pub question: String,
}

/// `POST /contradictions/resolve`
pub async fn resolve<S, G>(
  State(state): State<AppState<S, G>>,
  CurrentUser(user_id): CurrentUser,
) -> Result<Json<ClarifyingQuestion>, ApiError>
where
  S: SessionStore + 'static,
  G: Gateway + 'static,
{
  let question = state.engine.resolve(user_id).await?;
  Ok(Json(ClarifyingQuestion { question }))
}

#[derive(Debug, Deserialize)]
pub struct CheckBody {
  pub resolution_text: String,
}

#[derive(Debug, Serialize)]
pub struct CheckResult {
  pub resolved: bool,
}

/// `POST /contradictions/check-resolution`
pub async fn check<S, G>(
  State(state): State<AppState<S, G>>,
  CurrentUser(user_id): CurrentUser,
  body: Result<Json<CheckBody>, JsonRejection>,
) -> Result<Json<CheckResult>, ApiError>
where
  S: SessionStore + 'static,
  G: Gateway + 'static,
{
  let Json(body) = body?;
  let resolved = state
    .engine
    .check_resolution(user_id, &body.resolution_text)
    .await?;
  Ok(Json(CheckResult { resolved }))
}
