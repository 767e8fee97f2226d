//! Progress reads, validated updates, and stage advancement.

use std::cmp::Ordering;

use dialectic_core::{
  gateway::Gateway,
  progress::{Progress, ProgressStatus, ProgressUpdate},
  store::SessionStore,
};
use uuid::Uuid;

use crate::{Engine, Error, Result};

impl<S, G> Engine<S, G>
where
  S: SessionStore,
  G: Gateway,
{
  /// The user's progress, created with defaults on first access.
  pub async fn progress(&self, user_id: Uuid) -> Result<Progress> {
    self.store.init_progress(user_id).await.map_err(Error::store)
  }

  /// Merge a partial update into existing progress. Stage numbers are checked
  /// against the catalog before anything is written.
  pub async fn update_progress(
    &self,
    user_id: Uuid,
    update: ProgressUpdate,
  ) -> Result<Progress> {
    if let Some(stage) = update.stage {
      self.catalog.require(stage)?;
    }
    for &stage in update.completed_stages.iter().flatten() {
      self.catalog.require(stage)?;
    }

    self
      .store
      .update_progress(user_id, update)
      .await
      .map_err(Error::store)?
      .ok_or(Error::NotInitialized(user_id))
  }

  /// Complete the current stage if it has enough answers and nothing is
  /// pending. Otherwise progress is returned unchanged.
  pub async fn evaluate_progress(&self, user_id: Uuid) -> Result<Progress> {
    let progress = self.require_progress(user_id).await?;

    let ready = progress.status == ProgressStatus::Active
      && !progress.contradiction_flag
      && progress.response_count >= self.settings.answers_per_stage;

    if !ready {
      tracing::debug!(
        %user_id,
        stage = progress.stage,
        answers = progress.response_count,
        pending = progress.contradiction_flag,
        "stage not ready to complete"
      );
      return Ok(progress);
    }

    self.advance(progress).await
  }

  /// Mark `stage` completed.
  ///
  /// Completing the current stage moves the user on to the next one, and
  /// completing the last stage marks the whole sequence completed. An
  /// earlier stage is only recorded in `completed_stages`. Stages ahead of
  /// the user are refused.
  pub async fn complete_stage(&self, user_id: Uuid, stage: u8) -> Result<Progress> {
    self.catalog.require(stage)?;
    let progress = self.require_progress(user_id).await?;

    match stage.cmp(&progress.stage) {
      Ordering::Greater => Err(Error::StageNotReached { stage, current: progress.stage }),
      Ordering::Equal => self.advance(progress).await,
      Ordering::Less => self.record_completed(progress, stage).await,
    }
  }

  pub(crate) async fn require_progress(&self, user_id: Uuid) -> Result<Progress> {
    self
      .store
      .get_progress(user_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::NotInitialized(user_id))
  }

  /// Complete the user's current stage.
  async fn advance(&self, progress: Progress) -> Result<Progress> {
    let user_id = progress.user_id;
    let stage = progress.stage;

    let mut completed = progress.completed_stages;
    if !completed.contains(&stage) {
      completed.push(stage);
    }
    let next = self.catalog.next_after(stage);
    let status = if stage == self.catalog.last() {
      ProgressStatus::Completed
    } else {
      progress.status
    };

    let updated = self
      .store
      .update_progress(user_id, ProgressUpdate {
        stage:            Some(next),
        status:           Some(status),
        response_count:   Some(0),
        completed_stages: Some(completed),
        ..ProgressUpdate::default()
      })
      .await
      .map_err(Error::store)?
      .ok_or(Error::NotInitialized(user_id))?;

    tracing::info!(%user_id, completed = stage, stage = updated.stage, status = %updated.status, "stage completed");
    Ok(updated)
  }

  async fn record_completed(&self, progress: Progress, stage: u8) -> Result<Progress> {
    if progress.completed_stages.contains(&stage) {
      return Ok(progress);
    }
    let user_id = progress.user_id;
    let mut completed = progress.completed_stages;
    completed.push(stage);

    let updated = self
      .store
      .update_progress(user_id, ProgressUpdate {
        completed_stages: Some(completed),
        ..ProgressUpdate::default()
      })
      .await
      .map_err(Error::store)?
      .ok_or(Error::NotInitialized(user_id))?;

    tracing::debug!(%user_id, completed = stage, stage = updated.stage, "earlier stage recorded");
    Ok(updated)
  }
}
