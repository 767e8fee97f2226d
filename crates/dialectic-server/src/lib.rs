//! HTTP surface for the Dialectic reasoning tutor.
//!
//! Exposes an axum [`Router`] under `/api`, backed by any [`SessionStore`]
//! and [`Gateway`]. Identity comes from a trusted proxy header; see
//! [`auth`].

pub mod auth;
pub mod error;
pub mod handlers;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use dialectic_core::{gateway::Gateway, store::SessionStore};
use dialectic_engine::{Engine, TemplateSelection};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::IdentityConfig;
use handlers::{contradictions, progress, questions, responses, session};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `DIALECTIC_*` environment variables. Every key has a default.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                 String,
  pub port:                 u16,
  pub store_path:           PathBuf,
  pub ollama_url:           String,
  pub ollama_model:         String,
  pub gateway_timeout_secs: u64,
  pub answers_per_stage:    u32,
  pub template_selection:   TemplateSelection,
  pub user_header:          String,
  pub proxy_secret_hash:    Option<String>,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                 "127.0.0.1".to_string(),
      port:                 3000,
      store_path:           PathBuf::from("dialectic.sqlite3"),
      ollama_url:           dialectic_ollama::DEFAULT_BASE_URL.to_string(),
      ollama_model:         dialectic_ollama::DEFAULT_MODEL.to_string(),
      gateway_timeout_secs: 120,
      answers_per_stage:    3,
      template_selection:   TemplateSelection::Random,
      user_header:          "x-user-id".to_string(),
      proxy_secret_hash:    None,
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S, G> {
  pub engine:   Engine<S, G>,
  pub identity: Arc<IdentityConfig>,
}

impl<S, G> Clone for AppState<S, G> {
  fn clone(&self) -> Self {
    Self {
      engine:   self.engine.clone(),
      identity: Arc::clone(&self.identity),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the application [`Router`]; every route lives under `/api`.
pub fn router<S, G>(state: AppState<S, G>) -> Router
where
  S: SessionStore + 'static,
  G: Gateway + 'static,
{
  let api = Router::new()
    // Progress
    .route("/progress", get(progress::show::<S, G>).patch(progress::update::<S, G>))
    .route("/progress/evaluate", post(progress::evaluate::<S, G>))
    .route("/progress/complete", post(progress::complete::<S, G>))
    .route("/progress/final", post(progress::final_evaluation::<S, G>))
    // Questions
    .route("/questions", post(questions::next::<S, G>))
    .route("/questions/custom", post(questions::custom::<S, G>))
    // Responses
    .route("/responses", get(responses::list::<S, G>).patch(responses::submit::<S, G>))
    .route("/responses/edit", post(responses::edit::<S, G>))
    // Resolution workflow
    .route("/contradictions/resolve", post(contradictions::resolve::<S, G>))
    .route("/contradictions/check-resolution", post(contradictions::check::<S, G>))
    // Session
    .route("/session/reset", post(session::reset::<S, G>));

  Router::new()
    .nest("/api", api)
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
