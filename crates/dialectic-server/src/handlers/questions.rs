//! Handlers for `/questions` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/questions` | Next question for the user's stage; 409 while a contradiction is pending |
//! | `POST` | `/questions/custom` | Body: `{"theme":"honesty"}` |

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
};
use dialectic_core::{gateway::Gateway, store::SessionStore};
use dialectic_engine::GeneratedQuestion;
use serde::Deserialize;

use crate::{AppState, auth::CurrentUser, error::ApiError};

/// `POST /questions`
pub async fn next<S, G>(
  State(state): State<AppState<S, G>>,
  CurrentUser(user_id): CurrentUser,
) -> Result<Json<GeneratedQuestion>, ApiError>
where
  S: SessionStore + 'static,
  G: Gateway + 'static,
{
  let question = state.engine.next_question(user_id).await?;
  Ok(Json(question))
}

#[derive(Debug, Deserialize)]
pub struct CustomBody {
  pub theme: String,
}

/// `POST /questions/custom`
pub async fn custom<S, G>(
  State(state): State<AppState<S, G>>,
  CurrentUser(user_id): CurrentUser,
  body: Result<Json<CustomBody>, JsonRejection>,
) -> Result<Json<GeneratedQuestion>, ApiError>
where
  S: SessionStore + 'static,
  G: Gateway + 'static,
{
  let Json(body) = body?;
  let question = state.engine.next_custom_question(user_id, &body.theme).await?;
  Ok(Json(question))
}
