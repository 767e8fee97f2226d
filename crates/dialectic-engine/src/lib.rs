//! The reasoning-tutor core.
//!
//! [`Engine`] ties a [`SessionStore`] and a [`Gateway`] together and exposes
//! every user-facing operation: question generation, answer submission with
//! contradiction detection, the resolution workflow, answer edits, stage
//! progression, and the final evaluation.
//!
//! The engine never resolves identity. Every operation takes the verified
//! user id from the caller.

mod detector;
mod evaluation;
mod progression;
mod questions;
mod resolution;

pub mod error;
pub mod prompt;
pub mod verdict;

pub use detector::{Detection, MIN_PRIOR_STATEMENTS};
pub use error::{Error, Result};
pub use evaluation::{EVALUATION_EMPTY_FALLBACK, EVALUATION_ERROR_FALLBACK, EvaluationScope};
pub use questions::{GeneratedQuestion, TemplateSelection};
pub use resolution::{Edit, RESOLUTION_EMPTY_FALLBACK, RESOLUTION_ERROR_FALLBACK};

use std::sync::Arc;

use dialectic_core::{
  gateway::{Gateway, Sampling},
  response::{Response, ResponseFilter},
  stage::StageCatalog,
  store::SessionStore,
};
use uuid::Uuid;

// ─── Settings ────────────────────────────────────────────────────────────────

/// Tunables that are not part of the stage catalog.
#[derive(Debug, Clone, Copy)]
pub struct EngineSettings {
  /// Answers needed in a stage before it can be completed.
  pub answers_per_stage:  u32,
  pub template_selection: TemplateSelection,
}

impl Default for EngineSettings {
  fn default() -> Self {
    Self {
      answers_per_stage:  3,
      template_selection: TemplateSelection::Random,
    }
  }
}

// ─── Engine ──────────────────────────────────────────────────────────────────

pub struct Engine<S, G> {
  store:    Arc<S>,
  gateway:  Arc<G>,
  catalog:  Arc<StageCatalog>,
  settings: EngineSettings,
}

impl<S, G> Clone for Engine<S, G> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      gateway:  Arc::clone(&self.gateway),
      catalog:  Arc::clone(&self.catalog),
      settings: self.settings,
    }
  }
}

impl<S, G> Engine<S, G>
where
  S: SessionStore,
  G: Gateway,
{
  pub fn new(
    store: Arc<S>,
    gateway: Arc<G>,
    catalog: Arc<StageCatalog>,
    settings: EngineSettings,
  ) -> Self {
    Self { store, gateway, catalog, settings }
  }

  pub fn store(&self) -> &Arc<S> { &self.store }

  pub fn catalog(&self) -> &StageCatalog { &self.catalog }

  pub fn settings(&self) -> EngineSettings { self.settings }

  /// A user's response rows in creation order.
  pub async fn responses(
    &self,
    user_id: Uuid,
    filter: ResponseFilter,
  ) -> Result<Vec<Response>> {
    self
      .store
      .list_responses(user_id, filter)
      .await
      .map_err(Error::store)
  }

  /// Purge the user's progress and every response they own.
  pub async fn reset_session(&self, user_id: Uuid) -> Result<()> {
    self.store.reset_user(user_id).await.map_err(Error::store)?;
    tracing::info!(%user_id, "session reset");
    Ok(())
  }

  /// Send `prompt` to the gateway. Failures and blank output are logged here
  /// so every call site only has to pick its fallback.
  async fn ask(
    &self,
    user_id: Uuid,
    purpose: &'static str,
    prompt: &str,
    sampling: Sampling,
  ) -> Reply {
    match self.gateway.generate(prompt, sampling).await {
      Ok(text) if !text.trim().is_empty() => Reply::Text(text.trim().to_owned()),
      Ok(_) => {
        tracing::warn!(%user_id, purpose, "gateway returned empty output");
        Reply::Empty
      }
      Err(e) => {
        tracing::warn!(%user_id, purpose, error = %e, "gateway call failed");
        Reply::Failed
      }
    }
  }
}

/// What came back from one gateway call.
#[derive(Debug)]
pub(crate) enum Reply {
  Text(String),
  Empty,
  Failed,
}

impl Reply {
  fn text(self) -> Option<String> {
    match self {
      Self::Text(text) => Some(text),
      Self::Empty | Self::Failed => None,
    }
  }
}
