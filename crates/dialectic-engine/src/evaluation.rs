//! Final narrative evaluation. Read-only.

use dialectic_core::{
  gateway::{Gateway, Sampling},
  response::ResponseFilter,
  store::SessionStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{Engine, Error, Reply, Result, prompt};

pub const EVALUATION_EMPTY_FALLBACK: &str =
  "Unable to generate a final evaluation with the current responses.";

pub const EVALUATION_ERROR_FALLBACK: &str =
  "Error generating final evaluation. Please try again later.";

const EVALUATION_SAMPLING: Sampling = Sampling::with_temperature(0.7);

/// Which answers the report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationScope {
  /// The active answer set only.
  #[default]
  Active,
  /// Every answered version, superseded ones included.
  FullHistory,
}

impl<S, G> Engine<S, G>
where
  S: SessionStore,
  G: Gateway,
{
  /// Ask the model for a structured analysis of the user's reasoning. A
  /// fixed message stands in for the report if the model fails.
  pub async fn summarize(&self, user_id: Uuid, scope: EvaluationScope) -> Result<String> {
    let completed = self
      .store
      .get_progress(user_id)
      .await
      .map_err(Error::store)?
      .map(|p| p.completed_stages)
      .unwrap_or_default();

    let responses = match scope {
      EvaluationScope::Active => self
        .store
        .active_answers(user_id)
        .await
        .map_err(Error::store)?,
      EvaluationScope::FullHistory => {
        let mut all = self
          .store
          .list_responses(user_id, ResponseFilter {
            include_superseded: true,
            stage:              None,
          })
          .await
          .map_err(Error::store)?;
        all.retain(|r| r.is_answered());
        all
      }
    };

    let prompt = prompt::final_evaluation(&responses, &completed, scope);
    let summary = match self
      .ask(user_id, "final evaluation", &prompt, EVALUATION_SAMPLING)
      .await
    {
      Reply::Text(text) => text,
      Reply::Empty => EVALUATION_EMPTY_FALLBACK.to_owned(),
      Reply::Failed => EVALUATION_ERROR_FALLBACK.to_owned(),
    };
    Ok(summary)
  }
}
