//! Response — one question shown to a user and the answer they gave.
//!
//! Responses are versioned. An answer is recorded once on its row; editing
//! it later supersedes the row and inserts a replacement with the next
//! version number. Rows that share a `slot_id` are versions of the same
//! logical answer slot, and at most one of them is active at any time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Response ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
  pub id:                 Uuid,
  /// Shared by every version of the same logical answer; equals `id` for
  /// version 1.
  pub slot_id:            Uuid,
  pub user_id:            Uuid,
  pub question_text:      String,
  /// Empty while the question is unanswered.
  pub answer:             String,
  pub stage:              u8,
  /// Starts at 1 and increases by one per edit.
  pub version:            u32,
  /// True once a newer version of this slot exists.
  pub superseded:         bool,
  /// True if this answer was implicated in a detected contradiction.
  pub contradiction_flag: bool,
  pub created_at:         DateTime<Utc>,
  pub updated_at:         DateTime<Utc>,
}

impl Response {
  pub fn is_answered(&self) -> bool { !self.answer.is_empty() }

  /// Whether this row belongs to the active answer set: current version and
  /// carrying a non-empty answer.
  pub fn is_active_answer(&self) -> bool {
    !self.superseded && self.is_answered()
  }
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Input to [`crate::store::SessionStore::record_response`].
///
/// Creates an unanswered version-1 row. Identifiers and timestamps are
/// assigned by the store.
#[derive(Debug, Clone)]
pub struct NewResponse {
  pub user_id:       Uuid,
  pub question_text: String,
  pub stage:         u8,
}

/// A partial update applied to a single response row by id.
#[derive(Debug, Clone, Default)]
pub struct ResponseUpdate {
  pub answer:             Option<String>,
  pub contradiction_flag: Option<bool>,
}

/// The result of superseding a row: the now-historical version and its
/// active replacement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Revision {
  pub previous: Response,
  pub current:  Response,
}

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`crate::store::SessionStore::list_responses`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseFilter {
  /// Also return superseded rows (full history).
  pub include_superseded: bool,
  /// Restrict to a single stage.
  pub stage:              Option<u8>,
}
