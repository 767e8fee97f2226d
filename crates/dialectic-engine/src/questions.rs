//! Question generation — stage-driven and themed.

use dialectic_core::{
  gateway::{Gateway, Sampling},
  progress::{Progress, ProgressUpdate},
  response::NewResponse,
  stage::StageInfo,
  store::SessionStore,
};
use rand_core::{OsRng, RngCore as _};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Engine, Error, Result, prompt};

const ADAPTATION_SAMPLING: Sampling = Sampling::with_temperature(0.75);
const CUSTOM_SAMPLING: Sampling = Sampling::with_temperature(0.8);

/// How a baseline template is chosen from a stage's prompt pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateSelection {
  #[default]
  Random,
  First,
}

impl TemplateSelection {
  pub fn pick<'a>(self, prompts: &'a [String]) -> Option<&'a str> {
    let idx = match self {
      Self::First => 0,
      Self::Random if prompts.is_empty() => 0,
      Self::Random => (OsRng.next_u32() as usize) % prompts.len(),
    };
    prompts.get(idx).map(String::as_str)
  }
}

/// A persisted, unanswered question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedQuestion {
  pub question:    String,
  pub response_id: Uuid,
}

impl<S, G> Engine<S, G>
where
  S: SessionStore,
  G: Gateway,
{
  /// Generate, persist, and return the next question for the user's stage.
  ///
  /// Initialises progress if the user has none. If the model cannot adapt
  /// the baseline template, the template itself is asked.
  pub async fn next_question(&self, user_id: Uuid) -> Result<GeneratedQuestion> {
    let progress = self.open_progress(user_id).await?;
    let stage = self.catalog.require(progress.stage)?;
    let baseline = self
      .settings
      .template_selection
      .pick(&stage.prompts)
      .ok_or(dialectic_core::Error::EmptyPromptPool(stage.number))?
      .to_owned();

    let history = self
      .store
      .active_answers(user_id)
      .await
      .map_err(Error::store)?;

    let prompt = prompt::adapt_question(stage, &baseline, &history);
    let question = match self
      .ask(user_id, "question adaptation", &prompt, ADAPTATION_SAMPLING)
      .await
      .text()
    {
      Some(q) => q,
      None => {
        tracing::warn!(%user_id, stage = stage.number, "falling back to baseline question");
        baseline
      }
    };

    self.persist_question(user_id, stage, question).await
  }

  /// Generate, persist, and return a question about `theme`, calibrated to
  /// the user's stage.
  pub async fn next_custom_question(
    &self,
    user_id: Uuid,
    theme: &str,
  ) -> Result<GeneratedQuestion> {
    let theme = theme.trim();
    if theme.is_empty() {
      return Err(Error::EmptyTheme);
    }

    let progress = self.open_progress(user_id).await?;
    let stage = self.catalog.require(progress.stage)?;

    let prompt = prompt::custom_question(stage, theme);
    let question = match self
      .ask(user_id, "custom question", &prompt, CUSTOM_SAMPLING)
      .await
      .text()
    {
      Some(q) => q,
      None => {
        tracing::warn!(%user_id, theme, "falling back to themed default question");
        prompt::theme_fallback(theme)
      }
    };

    self.persist_question(user_id, stage, question).await
  }

  /// Progress for a user about to receive a question: created if missing,
  /// refused while a contradiction is pending.
  async fn open_progress(&self, user_id: Uuid) -> Result<Progress> {
    let progress = self
      .store
      .init_progress(user_id)
      .await
      .map_err(Error::store)?;
    if progress.contradiction_flag {
      return Err(Error::ContradictionPending);
    }
    Ok(progress)
  }

  async fn persist_question(
    &self,
    user_id: Uuid,
    stage: &StageInfo,
    question: String,
  ) -> Result<GeneratedQuestion> {
    let row = self
      .store
      .record_response(NewResponse {
        user_id,
        question_text: question,
        stage: stage.number,
      })
      .await
      .map_err(Error::store)?;

    self
      .store
      .update_progress(user_id, ProgressUpdate {
        current_question_id: Some(row.id),
        ..ProgressUpdate::default()
      })
      .await
      .map_err(Error::store)?;

    tracing::debug!(%user_id, response_id = %row.id, stage = stage.number, "question issued");
    Ok(GeneratedQuestion { question: row.question_text, response_id: row.id })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn first_selection_is_deterministic() {
    let pool = vec!["a".to_owned(), "b".to_owned()];
    assert_eq!(TemplateSelection::First.pick(&pool), Some("a"));
  }

  #[test]
  fn random_selection_stays_in_pool() {
    let pool = vec!["a".to_owned(), "b".to_owned(), "c".to_owned()];
    for _ in 0..32 {
      let picked = TemplateSelection::Random.pick(&pool).unwrap();
      assert!(pool.iter().any(|p| p == picked));
    }
  }

  #[test]
  fn empty_pool_yields_nothing() {
    assert_eq!(TemplateSelection::Random.pick(&[]), None);
    assert_eq!(TemplateSelection::First.pick(&[]), None);
  }
}
