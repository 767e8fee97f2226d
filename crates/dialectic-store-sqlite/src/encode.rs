//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings so that lexical
//! order matches chronological order. UUIDs are stored as hyphenated
//! lowercase strings. Completed stages are stored as a compact JSON array.

use chrono::{DateTime, SecondsFormat, SubsecRound as _, Utc};
use dialectic_core::{
  progress::{Progress, ProgressStatus},
  response::Response,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

/// The current time at the precision the store persists, so values handed
/// back to callers compare equal to what a later read returns.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Completed stages ────────────────────────────────────────────────────────

pub fn encode_stages(stages: &[u8]) -> Result<String> {
  Ok(serde_json::to_string(stages)?)
}

pub fn decode_stages(s: &str) -> Result<Vec<u8>> { Ok(serde_json::from_str(s)?) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Columns selected for every `responses` read, in [`RawResponse`] order.
pub const RESPONSE_COLUMNS: &str = "id, slot_id, user_id, question_text, answer, \
  stage, version, superseded, contradiction_flag, created_at, updated_at";

/// Columns selected for every `progress` read, in [`RawProgress`] order.
pub const PROGRESS_COLUMNS: &str = "user_id, stage, status, response_count, \
  contradiction_flag, completed_stages, current_question_id, last_updated";

/// Raw values read directly from a `responses` row.
pub struct RawResponse {
  pub id:                 String,
  pub slot_id:            String,
  pub user_id:            String,
  pub question_text:      String,
  pub answer:             String,
  pub stage:              u8,
  pub version:            u32,
  pub superseded:         bool,
  pub contradiction_flag: bool,
  pub created_at:         String,
  pub updated_at:         String,
}

impl RawResponse {
  /// Read a row selected with [`RESPONSE_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                 row.get(0)?,
      slot_id:            row.get(1)?,
      user_id:            row.get(2)?,
      question_text:      row.get(3)?,
      answer:             row.get(4)?,
      stage:              row.get(5)?,
      version:            row.get(6)?,
      superseded:         row.get(7)?,
      contradiction_flag: row.get(8)?,
      created_at:         row.get(9)?,
      updated_at:         row.get(10)?,
    })
  }

  pub fn into_response(self) -> Result<Response> {
    Ok(Response {
      id:                 decode_uuid(&self.id)?,
      slot_id:            decode_uuid(&self.slot_id)?,
      user_id:            decode_uuid(&self.user_id)?,
      question_text:      self.question_text,
      answer:             self.answer,
      stage:              self.stage,
      version:            self.version,
      superseded:         self.superseded,
      contradiction_flag: self.contradiction_flag,
      created_at:         decode_dt(&self.created_at)?,
      updated_at:         decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw values read directly from a `progress` row.
pub struct RawProgress {
  pub user_id:             String,
  pub stage:               u8,
  pub status:              String,
  pub response_count:      u32,
  pub contradiction_flag:  bool,
  pub completed_stages:    String,
  pub current_question_id: Option<String>,
  pub last_updated:        String,
}

impl RawProgress {
  /// Read a row selected with [`PROGRESS_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:             row.get(0)?,
      stage:               row.get(1)?,
      status:              row.get(2)?,
      response_count:      row.get(3)?,
      contradiction_flag:  row.get(4)?,
      completed_stages:    row.get(5)?,
      current_question_id: row.get(6)?,
      last_updated:        row.get(7)?,
    })
  }

  pub fn into_progress(self) -> Result<Progress> {
    Ok(Progress {
      user_id:             decode_uuid(&self.user_id)?,
      stage:               self.stage,
      status:              self.status.parse::<ProgressStatus>()?,
      response_count:      self.response_count,
      contradiction_flag:  self.contradiction_flag,
      completed_stages:    decode_stages(&self.completed_stages)?,
      current_question_id: self
        .current_question_id
        .as_deref()
        .map(decode_uuid)
        .transpose()?,
      last_updated:        decode_dt(&self.last_updated)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone as _;

  use super::*;

  #[test]
  fn timestamps_sort_lexically() {
    let a = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 1).unwrap();
    let b = a + chrono::Duration::microseconds(1500);
    assert!(encode_dt(a) < encode_dt(b));
    assert_eq!(decode_dt(&encode_dt(b)).unwrap(), b);
  }
}
