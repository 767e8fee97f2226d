//! Error types for `dialectic-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown stage: {0}")]
  UnknownStage(u8),

  #[error("unknown progress status: {0:?}")]
  UnknownStatus(String),

  #[error("stage {0} has an empty prompt pool")]
  EmptyPromptPool(u8),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
