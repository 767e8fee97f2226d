//! Handler for `/session` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/session/reset` | Purges progress and every response for the user |

use axum::{Json, extract::State};
use dialectic_core::{gateway::Gateway, store::SessionStore};
use serde::Serialize;

use crate::{AppState, auth::CurrentUser, error::ApiError};

#[derive(Debug, Serialize)]
pub struct ResetResult {
  pub message: String,
}

/// `POST /session/reset`
pub async fn reset<S, G>(
  State(state): State<AppState<S, G>>,
  CurrentUser(user_id): CurrentUser,
) -> Result<Json<ResetResult>, ApiError>
where
  S: SessionStore + 'static,
  G: Gateway + 'static,
{
  state.engine.reset_session(user_id).await?;
  Ok(Json(ResetResult { message: "session reset".to_owned() }))
}
