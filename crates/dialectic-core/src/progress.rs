//! Progress — the per-user record of where a user is in the reasoning
//! sequence.
//!
//! Exactly one progress row exists per user. It is created lazily on first
//! access and removed only by a session reset, which also purges every
//! response the user owns.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, stage::FIRST_STAGE};

// ─── Status ──────────────────────────────────────────────────────────────────

/// Whether the user is still working through the stages.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStatus {
  #[default]
  Active,
  Completed,
}

impl ProgressStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Active => "active",
      Self::Completed => "completed",
    }
  }
}

impl fmt::Display for ProgressStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for ProgressStatus {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "active" => Ok(Self::Active),
      "completed" => Ok(Self::Completed),
      other => Err(Error::UnknownStatus(other.to_owned())),
    }
  }
}

// ─── Progress ────────────────────────────────────────────────────────────────

/// The per-user progress record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
  pub user_id:             Uuid,
  /// Current reasoning stage; non-decreasing under normal operation.
  pub stage:               u8,
  pub status:              ProgressStatus,
  /// Answers submitted in the current stage; reset on stage advance.
  pub response_count:      u32,
  /// While set, the resolution workflow owns what the user sees next and no
  /// new questions are generated.
  pub contradiction_flag:  bool,
  /// Stages already passed, in completion order, without duplicates.
  pub completed_stages:    Vec<u8>,
  /// The most recently generated question, if any.
  pub current_question_id: Option<Uuid>,
  /// Refreshed by the store on every mutation.
  pub last_updated:        DateTime<Utc>,
}

impl Progress {
  /// A fresh record with the defaults used for lazy initialisation.
  pub fn new(user_id: Uuid, now: DateTime<Utc>) -> Self {
    Self {
      user_id,
      stage: FIRST_STAGE,
      status: ProgressStatus::Active,
      response_count: 0,
      contradiction_flag: false,
      completed_stages: Vec::new(),
      current_question_id: None,
      last_updated: now,
    }
  }

  /// The resolution-workflow state implied by this record at rest.
  ///
  /// [`WorkflowState::AwaitingResolutionCheck`] only exists for the duration
  /// of a resolution check and is never observed here.
  pub fn workflow_state(&self) -> WorkflowState {
    if self.contradiction_flag {
      WorkflowState::ContradictionPending
    } else {
      WorkflowState::Normal
    }
  }
}

// ─── Partial update ──────────────────────────────────────────────────────────

/// A partial update merged into an existing [`Progress`] row.
///
/// `None` fields are left unchanged. `last_updated` is always refreshed by the
/// store and cannot be supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProgressUpdate {
  pub stage:               Option<u8>,
  pub status:              Option<ProgressStatus>,
  pub response_count:      Option<u32>,
  pub contradiction_flag:  Option<bool>,
  pub completed_stages:    Option<Vec<u8>>,
  pub current_question_id: Option<Uuid>,
}

impl ProgressUpdate {
  /// An update that only sets or clears the contradiction flag.
  pub fn contradiction(flag: bool) -> Self {
    Self { contradiction_flag: Some(flag), ..Self::default() }
  }

  pub fn is_empty(&self) -> bool { *self == Self::default() }
}

// ─── Workflow state ──────────────────────────────────────────────────────────

/// States of the contradiction-resolution workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
  /// Questions are generated normally.
  Normal,
  /// A contradiction was detected; the user must reconcile it first.
  ContradictionPending,
  /// A resolution explanation has been submitted and is being judged.
  AwaitingResolutionCheck,
}

impl WorkflowState {
  /// The state reached once a resolution check has produced a verdict.
  pub fn after_check(resolved: bool) -> Self {
    if resolved { Self::Normal } else { Self::ContradictionPending }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn new_progress_starts_at_first_stage() {
    let p = Progress::new(Uuid::new_v4(), Utc::now());
    assert_eq!(p.stage, 1);
    assert_eq!(p.status, ProgressStatus::Active);
    assert_eq!(p.response_count, 0);
    assert!(!p.contradiction_flag);
    assert!(p.completed_stages.is_empty());
    assert_eq!(p.workflow_state(), WorkflowState::Normal);
  }

  #[test]
  fn flag_means_contradiction_pending() {
    let mut p = Progress::new(Uuid::new_v4(), Utc::now());
    p.contradiction_flag = true;
    assert_eq!(p.workflow_state(), WorkflowState::ContradictionPending);
  }

  #[test]
  fn check_verdict_drives_next_state() {
    assert_eq!(WorkflowState::after_check(true), WorkflowState::Normal);
    assert_eq!(
      WorkflowState::after_check(false),
      WorkflowState::ContradictionPending
    );
  }

  #[test]
  fn status_parses_its_own_encoding() {
    for status in [ProgressStatus::Active, ProgressStatus::Completed] {
      assert_eq!(status.as_str().parse::<ProgressStatus>().unwrap(), status);
    }
    assert!("paused".parse::<ProgressStatus>().is_err());
  }

  #[test]
  fn update_rejects_unknown_fields() {
    let err = serde_json::from_str::<ProgressUpdate>(r#"{"last_updated":"x"}"#);
    assert!(err.is_err());
    let ok: ProgressUpdate =
      serde_json::from_str(r#"{"contradiction_flag":false}"#).unwrap();
    assert_eq!(ok, ProgressUpdate::contradiction(false));
  }
}
