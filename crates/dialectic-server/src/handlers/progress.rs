//! Handlers for `/progress` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `GET`   | `/progress` | Initialised on first access; includes the workflow state |
//! | `PATCH` | `/progress` | Body: any subset of the progress fields |
//! | `POST`  | `/progress/evaluate` | Completes the stage if enough answers are in |
//! | `POST`  | `/progress/complete` | Body: `{"stage":2}` |
//! | `POST`  | `/progress/final` | Body (optional): `{"include_history":true}` |

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
};
use dialectic_core::{
  gateway::Gateway,
  progress::{Progress, ProgressUpdate, WorkflowState},
  store::SessionStore,
};
use dialectic_engine::EvaluationScope;
use serde::{Deserialize, Serialize};

use crate::{AppState, auth::CurrentUser, error::ApiError};

/// Progress plus the resolution-workflow state derived from it.
#[derive(Debug, Serialize)]
pub struct ProgressView {
  #[serde(flatten)]
  pub progress:       Progress,
  pub workflow_state: WorkflowState,
}

impl From<Progress> for ProgressView {
  fn from(progress: Progress) -> Self {
    let workflow_state = progress.workflow_state();
    Self { progress, workflow_state }
  }
}

// ─── Read / update ────────────────────────────────────────────────────────────

/// `GET /progress`
pub async fn show<S, G>(
  State(state): State<AppState<S, G>>,
  CurrentUser(user_id): CurrentUser,
) -> Result<Json<ProgressView>, ApiError>
where
  S: SessionStore + 'static,
  G: Gateway + 'static,
{
  let progress = state.engine.progress(user_id).await?;
  Ok(Json(progress.into()))
}

/// `PATCH /progress`
pub async fn update<S, G>(
  State(state): State<AppState<S, G>>,
  CurrentUser(user_id): CurrentUser,
  body: Result<Json<ProgressUpdate>, JsonRejection>,
) -> Result<Json<ProgressView>, ApiError>
where
  S: SessionStore + 'static,
  G: Gateway + 'static,
{
  let Json(update) = body?;
  if update.is_empty() {
    return Err(ApiError::BadRequest("no progress fields to update".to_owned()));
  }
  let progress = state.engine.update_progress(user_id, update).await?;
  Ok(Json(progress.into()))
}

// ─── Stage progression ────────────────────────────────────────────────────────

/// `POST /progress/evaluate`
pub async fn evaluate<S, G>(
  State(state): State<AppState<S, G>>,
  CurrentUser(user_id): CurrentUser,
) -> Result<Json<ProgressView>, ApiError>
where
  S: SessionStore + 'static,
  G: Gateway + 'static,
{
  let progress = state.engine.evaluate_progress(user_id).await?;
  Ok(Json(progress.into()))
}

#[derive(Debug, Deserialize)]
pub struct CompleteBody {
  pub stage: u8,
}

/// `POST /progress/complete`
pub async fn complete<S, G>(
  State(state): State<AppState<S, G>>,
  CurrentUser(user_id): CurrentUser,
  body: Result<Json<CompleteBody>, JsonRejection>,
) -> Result<Json<ProgressView>, ApiError>
where
  S: SessionStore + 'static,
  G: Gateway + 'static,
{
  let Json(body) = body?;
  let progress = state.engine.complete_stage(user_id, body.stage).await?;
  Ok(Json(progress.into()))
}

// ─── Final evaluation ─────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct FinalBody {
  #[serde(default)]
  pub include_history: bool,
}

#[derive(Debug, Serialize)]
pub struct FinalEvaluation {
  pub summary: String,
}

/// `POST /progress/final`
///
/// The body may be omitted entirely, which evaluates the active answers.
pub async fn final_evaluation<S, G>(
  State(state): State<AppState<S, G>>,
  CurrentUser(user_id): CurrentUser,
  body: Result<Json<FinalBody>, JsonRejection>,
) -> Result<Json<FinalEvaluation>, ApiError>
where
  S: SessionStore + 'static,
  G: Gateway + 'static,
{
  let body = match body {
    Ok(Json(body)) => body,
    Err(JsonRejection::MissingJsonContentType(_)) => FinalBody::default(),
    Err(rejection) => return Err(rejection.into()),
  };
  let scope = if body.include_history {
    EvaluationScope::FullHistory
  } else {
    EvaluationScope::Active
  };
  let summary = state.engine.summarize(user_id, scope).await?;
  Ok(Json(FinalEvaluation { summary }))
}
