//! Handlers for `/responses` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `GET`   | `/responses` | Optional `?include_superseded=true&stage=2` |
//! | `PATCH` | `/responses` | Body: `{"response_id":"…","answer":"…"}`; returns the contradiction verdict |
//! | `POST`  | `/responses/edit` | Body: `{"response_id":"…","new_answer":"…"}` |

use axum::{
  Json,
  extract::{
    Query, State,
    rejection::{JsonRejection, QueryRejection},
  },
};
use dialectic_core::{
  gateway::Gateway,
  response::{Response, ResponseFilter},
  store::SessionStore,
};
use dialectic_engine::Detection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, auth::CurrentUser, error::ApiError};

/// A contradiction verdict as the UI consumes it.
#[derive(Debug, Serialize)]
pub struct Verdict {
  pub contradiction: bool,
  pub details:       Option<String>,
}

impl From<Detection> for Verdict {
  fn from(d: Detection) -> Self {
    Self { contradiction: d.found, details: d.details }
  }
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  /// If `true`, also return superseded versions. Default `false`.
  #[serde(default)]
  pub include_superseded: bool,
  pub stage:              Option<u8>,
}

/// `GET /responses[?include_superseded=true][&stage=<n>]`
pub async fn list<S, G>(
  State(state): State<AppState<S, G>>,
  CurrentUser(user_id): CurrentUser,
  params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<Response>>, ApiError>
where
  S: SessionStore + 'static,
  G: Gateway + 'static,
{
  let Query(params) = params?;
  let responses = state
    .engine
    .responses(user_id, ResponseFilter {
      include_superseded: params.include_superseded,
      stage:              params.stage,
    })
    .await?;
  Ok(Json(responses))
}

// ─── Submit ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SubmitBody {
  pub response_id: Uuid,
  pub answer:      String,
}

/// `PATCH /responses`
pub async fn submit<S, G>(
  State(state): State<AppState<S, G>>,
  CurrentUser(user_id): CurrentUser,
  body: Result<Json<SubmitBody>, JsonRejection>,
) -> Result<Json<Verdict>, ApiError>
where
  S: SessionStore + 'static,
  G: Gateway + 'static,
{
  let Json(body) = body?;
  let detection = state
    .engine
    .submit_answer(user_id, body.response_id, &body.answer)
    .await?;
  Ok(Json(detection.into()))
}

// ─── Edit ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct EditBody {
  pub response_id: Uuid,
  pub new_answer:  String,
}

#[derive(Debug, Serialize)]
pub struct EditResult {
  pub response: Response,
  #[serde(flatten)]
  pub verdict:  Verdict,
}

/// `POST /responses/edit`
pub async fn edit<S, G>(
  State(state): State<AppState<S, G>>,
  CurrentUser(user_id): CurrentUser,
  body: Result<Json<EditBody>, JsonRejection>,
) -> Result<Json<EditResult>, ApiError>
where
  S: SessionStore + 'static,
  G: Gateway + 'static,
{
  let Json(body) = body?;
  let edit = state
    .engine
    .edit_response(user_id, body.response_id, &body.new_answer)
    .await?;
  Ok(Json(EditResult {
    response: edit.response,
    verdict:  edit.detection.into(),
  }))
}
