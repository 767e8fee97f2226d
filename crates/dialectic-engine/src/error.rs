//! Error type for `dialectic-engine`.
//!
//! Gateway failures never appear here: every call site that talks to the
//! language model has its own fallback. What remains are caller mistakes,
//! workflow conflicts, and persistence failures.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  /// The user has no progress row yet.
  #[error("no progress recorded for user {0}")]
  NotInitialized(Uuid),

  /// The response does not exist or belongs to another user.
  #[error("response {0} not found")]
  ResponseNotFound(Uuid),

  #[error("response {0} has already been answered")]
  AlreadyAnswered(Uuid),

  #[error("response {0} has not been answered yet")]
  NotAnswered(Uuid),

  #[error("response {0} has been superseded by a newer version")]
  AlreadySuperseded(Uuid),

  /// New questions are withheld until the open contradiction is resolved.
  #[error("a contradiction is pending resolution")]
  ContradictionPending,

  /// Stages are completed in order; `stage` lies ahead of the user.
  #[error("stage {stage} cannot be completed from stage {current}")]
  StageNotReached { stage: u8, current: u8 },

  #[error("answer must not be empty")]
  EmptyAnswer,

  #[error("resolution text must not be empty")]
  EmptyResolution,

  #[error("theme must not be empty")]
  EmptyTheme,

  #[error(transparent)]
  Core(#[from] dialectic_core::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub(crate) fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
