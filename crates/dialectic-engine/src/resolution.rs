//! Answer submission, answer edits, and the contradiction-resolution
//! workflow.
//!
//! A detected contradiction sets the progress flag and tags the offending
//! answer; the answer itself is always kept. While the flag is set the user
//! is asked clarifying questions instead of new ones, until either a
//! resolution check passes or an edit removes the conflict.

use dialectic_core::{
  gateway::{Gateway, Sampling},
  progress::{ProgressUpdate, WorkflowState},
  response::{Response, ResponseUpdate},
  store::SessionStore,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{Detection, Engine, Error, Reply, Result, prompt, verdict::parse_resolution};

/// Asked when the model returns nothing.
pub const RESOLUTION_EMPTY_FALLBACK: &str =
  "Could you explain how these different moral views fit together in your thinking?";

/// Asked when the model cannot be reached.
pub const RESOLUTION_ERROR_FALLBACK: &str =
  "Could you clarify your thinking about these seemingly different moral positions?";

const RESOLUTION_SAMPLING: Sampling = Sampling::with_temperature(0.7);
const CHECK_SAMPLING: Sampling = Sampling::with_temperature(0.3);

/// The outcome of editing an answer.
#[derive(Debug, Clone, Serialize)]
pub struct Edit {
  /// The new active version.
  pub response:  Response,
  pub detection: Detection,
}

impl<S, G> Engine<S, G>
where
  S: SessionStore,
  G: Gateway,
{
  /// Record the user's answer to an open question.
  ///
  /// The answer is compared against the active set as it stood before this
  /// answer, then stored. A contradiction flags both the row and progress.
  pub async fn submit_answer(
    &self,
    user_id: Uuid,
    response_id: Uuid,
    answer: &str,
  ) -> Result<Detection> {
    let answer = answer.trim();
    if answer.is_empty() {
      return Err(Error::EmptyAnswer);
    }

    let progress = self.require_progress(user_id).await?;
    let row = self.owned_response(user_id, response_id).await?;
    if row.superseded {
      return Err(Error::AlreadySuperseded(response_id));
    }
    if row.is_answered() {
      return Err(Error::AlreadyAnswered(response_id));
    }

    let prior = self
      .store
      .active_answers(user_id)
      .await
      .map_err(Error::store)?;
    let detection = self.detect_against(user_id, &prior, answer).await;

    self
      .store
      .update_response(response_id, ResponseUpdate {
        answer:             Some(answer.to_owned()),
        contradiction_flag: Some(detection.found),
      })
      .await
      .map_err(Error::store)?
      .ok_or(Error::AlreadyAnswered(response_id))?;

    // Questions issued before a stage advance do not count toward the new stage.
    let mut update = ProgressUpdate::default();
    if row.stage == progress.stage {
      update.response_count = Some(progress.response_count.saturating_add(1));
    }
    if detection.found {
      update.contradiction_flag = Some(true);
      tracing::info!(
        %user_id,
        %response_id,
        state = ?WorkflowState::ContradictionPending,
        "contradiction detected"
      );
    }
    self
      .store
      .update_progress(user_id, update)
      .await
      .map_err(Error::store)?
      .ok_or(Error::NotInitialized(user_id))?;

    Ok(detection)
  }

  /// Replace an answered response with a new version and re-run detection.
  ///
  /// The edited slot's old text is left out of the comparison. The progress
  /// flag follows the fresh result, so an edit can raise or clear it.
  pub async fn edit_response(
    &self,
    user_id: Uuid,
    response_id: Uuid,
    new_answer: &str,
  ) -> Result<Edit> {
    let new_answer = new_answer.trim();
    if new_answer.is_empty() {
      return Err(Error::EmptyAnswer);
    }

    self.require_progress(user_id).await?;
    let row = self.owned_response(user_id, response_id).await?;
    if row.superseded {
      return Err(Error::AlreadySuperseded(response_id));
    }
    if !row.is_answered() {
      return Err(Error::NotAnswered(response_id));
    }

    let revision = self
      .store
      .supersede_response(response_id, new_answer.to_owned())
      .await
      .map_err(Error::store)?;
    let mut current = revision.current;

    let prior: Vec<Response> = self
      .store
      .active_answers(user_id)
      .await
      .map_err(Error::store)?
      .into_iter()
      .filter(|r| r.slot_id != current.slot_id)
      .collect();
    let detection = self.detect_against(user_id, &prior, new_answer).await;

    if detection.found {
      current = self
        .store
        .update_response(current.id, ResponseUpdate {
          contradiction_flag: Some(true),
          ..ResponseUpdate::default()
        })
        .await
        .map_err(Error::store)?
        .ok_or(Error::ResponseNotFound(current.id))?;
    }

    self
      .store
      .update_progress(user_id, ProgressUpdate::contradiction(detection.found))
      .await
      .map_err(Error::store)?
      .ok_or(Error::NotInitialized(user_id))?;

    tracing::info!(
      %user_id,
      slot_id = %current.slot_id,
      version = current.version,
      contradiction = detection.found,
      "answer edited"
    );
    Ok(Edit { response: current, detection })
  }

  /// One open-ended clarifying question about the user's conflicting
  /// statements. Never fails because of the gateway.
  pub async fn resolve(&self, user_id: Uuid) -> Result<String> {
    let progress = self.require_progress(user_id).await?;
    if !progress.contradiction_flag {
      tracing::debug!(%user_id, "clarifying question requested with nothing pending");
    }
    let stage = self.catalog.require(progress.stage)?;

    let statements = self
      .store
      .active_answers(user_id)
      .await
      .map_err(Error::store)?;

    let prompt = prompt::resolution_question(stage, &statements);
    let question = match self
      .ask(user_id, "resolution question", &prompt, RESOLUTION_SAMPLING)
      .await
    {
      Reply::Text(q) => q,
      Reply::Empty => RESOLUTION_EMPTY_FALLBACK.to_owned(),
      Reply::Failed => RESOLUTION_ERROR_FALLBACK.to_owned(),
    };
    Ok(question)
  }

  /// Judge whether `resolution_text` reconciles the pending contradiction.
  /// Clears the flag when it does. Fails closed.
  ///
  /// With no contradiction pending there is nothing to reconcile, and the
  /// check passes without consulting the model.
  pub async fn check_resolution(&self, user_id: Uuid, resolution_text: &str) -> Result<bool> {
    let resolution_text = resolution_text.trim();
    if resolution_text.is_empty() {
      return Err(Error::EmptyResolution);
    }

    let progress = self.require_progress(user_id).await?;
    if !progress.contradiction_flag {
      tracing::debug!(%user_id, "resolution check with nothing pending");
      return Ok(true);
    }

    tracing::debug!(%user_id, state = ?WorkflowState::AwaitingResolutionCheck, "checking resolution");

    let statements = self
      .store
      .active_answers(user_id)
      .await
      .map_err(Error::store)?;

    let prompt = prompt::check_resolution(&statements, resolution_text);
    let resolved = match self
      .ask(user_id, "resolution check", &prompt, CHECK_SAMPLING)
      .await
    {
      Reply::Text(output) => {
        let resolved = parse_resolution(&output);
        if !resolved {
          tracing::debug!(%user_id, %output, "resolution not accepted");
        }
        resolved
      }
      Reply::Empty | Reply::Failed => false,
    };

    if resolved {
      self
        .store
        .update_progress(user_id, ProgressUpdate::contradiction(false))
        .await
        .map_err(Error::store)?
        .ok_or(Error::NotInitialized(user_id))?;
    }

    tracing::info!(%user_id, resolved, state = ?WorkflowState::after_check(resolved), "resolution checked");
    Ok(resolved)
  }

  /// Fetch a response, hiding rows owned by other users.
  async fn owned_response(&self, user_id: Uuid, response_id: Uuid) -> Result<Response> {
    self
      .store
      .get_response(response_id)
      .await
      .map_err(Error::store)?
      .filter(|r| r.user_id == user_id)
      .ok_or(Error::ResponseNotFound(response_id))
  }
}
