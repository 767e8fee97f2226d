//! [`SqliteStore`] — the SQLite implementation of [`SessionStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use dialectic_core::{
  progress::{Progress, ProgressUpdate},
  response::{NewResponse, Response, ResponseFilter, ResponseUpdate, Revision},
  store::SessionStore,
};

use crate::{
  encode::{
    PROGRESS_COLUMNS, RESPONSE_COLUMNS, RawProgress, RawResponse, encode_dt,
    encode_stages, encode_uuid, now,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A session store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

/// What the supersede transaction found when it looked at the old row.
enum SupersedeOutcome {
  Missing,
  AlreadySuperseded,
  Done { previous: RawResponse, current: RawResponse },
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open a private in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── SessionStore impl ───────────────────────────────────────────────────────

impl SessionStore for SqliteStore {
  type Error = Error;

  // ── Progress ──────────────────────────────────────────────────────────────

  async fn get_progress(&self, user_id: Uuid) -> Result<Option<Progress>> {
    let id_str = encode_uuid(user_id);

    let raw: Option<RawProgress> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {PROGRESS_COLUMNS} FROM progress WHERE user_id = ?1"),
              rusqlite::params![id_str],
              RawProgress::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawProgress::into_progress).transpose()
  }

  async fn init_progress(&self, user_id: Uuid) -> Result<Progress> {
    let defaults = Progress::new(user_id, now());

    let id_str     = encode_uuid(user_id);
    let status_str = defaults.status.as_str();
    let stages_str = encode_stages(&defaults.completed_stages)?;
    let at_str     = encode_dt(defaults.last_updated);
    let stage      = defaults.stage;

    let raw: RawProgress = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO progress (
             user_id, stage, status, response_count, contradiction_flag,
             completed_stages, current_question_id, last_updated
           ) VALUES (?1, ?2, ?3, 0, 0, ?4, NULL, ?5)
           ON CONFLICT (user_id) DO NOTHING",
          rusqlite::params![id_str, stage, status_str, stages_str, at_str],
        )?;
        Ok(conn.query_row(
          &format!("SELECT {PROGRESS_COLUMNS} FROM progress WHERE user_id = ?1"),
          rusqlite::params![id_str],
          RawProgress::from_row,
        )?)
      })
      .await?;

    raw.into_progress()
  }

  async fn update_progress(
    &self,
    user_id: Uuid,
    update:  ProgressUpdate,
  ) -> Result<Option<Progress>> {
    let id_str      = encode_uuid(user_id);
    let status_str  = update.status.map(|s| s.as_str());
    let stages_str  = update
      .completed_stages
      .as_deref()
      .map(encode_stages)
      .transpose()?;
    let question    = update.current_question_id.map(encode_uuid);
    let at_str      = encode_dt(now());

    // NULL parameters leave the column untouched.
    let raw: Option<RawProgress> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "UPDATE progress SET
                   stage               = COALESCE(?2, stage),
                   status              = COALESCE(?3, status),
                   response_count      = COALESCE(?4, response_count),
                   contradiction_flag  = COALESCE(?5, contradiction_flag),
                   completed_stages    = COALESCE(?6, completed_stages),
                   current_question_id = COALESCE(?7, current_question_id),
                   last_updated        = ?8
                 WHERE user_id = ?1
                 RETURNING {PROGRESS_COLUMNS}"
              ),
              rusqlite::params![
                id_str,
                update.stage,
                status_str,
                update.response_count,
                update.contradiction_flag,
                stages_str,
                question,
                at_str,
              ],
              RawProgress::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawProgress::into_progress).transpose()
  }

  // ── Responses ─────────────────────────────────────────────────────────────

  async fn record_response(&self, input: NewResponse) -> Result<Response> {
    let id  = Uuid::new_v4();
    let at = now();
    let response = Response {
      id,
      slot_id:            id,
      user_id:            input.user_id,
      question_text:      input.question_text,
      answer:             String::new(),
      stage:              input.stage,
      version:            1,
      superseded:         false,
      contradiction_flag: false,
      created_at:         at,
      updated_at:         at,
    };

    let id_str       = encode_uuid(response.id);
    let user_id_str  = encode_uuid(response.user_id);
    let question     = response.question_text.clone();
    let stage        = response.stage;
    let at_str       = encode_dt(at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO responses (
             id, slot_id, user_id, question_text, answer, stage,
             version, superseded, contradiction_flag, created_at, updated_at
           ) VALUES (?1, ?1, ?2, ?3, '', ?4, 1, 0, 0, ?5, ?5)",
          rusqlite::params![id_str, user_id_str, question, stage, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(response)
  }

  async fn get_response(&self, id: Uuid) -> Result<Option<Response>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawResponse> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {RESPONSE_COLUMNS} FROM responses WHERE id = ?1"),
              rusqlite::params![id_str],
              RawResponse::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawResponse::into_response).transpose()
  }

  async fn list_responses(
    &self,
    user_id: Uuid,
    filter:  ResponseFilter,
  ) -> Result<Vec<Response>> {
    let user_id_str = encode_uuid(user_id);

    let raws: Vec<RawResponse> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {RESPONSE_COLUMNS} FROM responses
           WHERE user_id = ?1
             AND (?2 OR superseded = 0)
             AND (?3 IS NULL OR stage = ?3)
           ORDER BY created_at ASC, rowid ASC"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![user_id_str, filter.include_superseded, filter.stage],
            RawResponse::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawResponse::into_response).collect()
  }

  async fn active_answers(&self, user_id: Uuid) -> Result<Vec<Response>> {
    let user_id_str = encode_uuid(user_id);

    let raws: Vec<RawResponse> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {RESPONSE_COLUMNS} FROM responses
           WHERE user_id = ?1 AND superseded = 0 AND answer != ''
           ORDER BY created_at ASC, rowid ASC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![user_id_str], RawResponse::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawResponse::into_response).collect()
  }

  async fn update_response(
    &self,
    id:     Uuid,
    update: ResponseUpdate,
  ) -> Result<Option<Response>> {
    let id_str = encode_uuid(id);
    let at_str = encode_dt(now());

    let raw: Option<RawResponse> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "UPDATE responses SET
                   answer             = COALESCE(?2, answer),
                   contradiction_flag = COALESCE(?3, contradiction_flag),
                   updated_at         = ?4
                 WHERE id = ?1
                   AND (?2 IS NULL OR (answer = '' AND superseded = 0))
                 RETURNING {RESPONSE_COLUMNS}"
              ),
              rusqlite::params![id_str, update.answer, update.contradiction_flag, at_str],
              RawResponse::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawResponse::into_response).transpose()
  }

  async fn supersede_response(&self, id: Uuid, new_answer: String) -> Result<Revision> {
    let old_id_str = encode_uuid(id);
    let new_id_str = encode_uuid(Uuid::new_v4());
    let at_str     = encode_dt(now());

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let old = tx
          .query_row(
            &format!("SELECT {RESPONSE_COLUMNS} FROM responses WHERE id = ?1"),
            rusqlite::params![old_id_str],
            RawResponse::from_row,
          )
          .optional()?;

        let Some(old) = old else {
          return Ok(SupersedeOutcome::Missing);
        };
        if old.superseded {
          return Ok(SupersedeOutcome::AlreadySuperseded);
        }

        let previous = tx.query_row(
          &format!(
            "UPDATE responses SET superseded = 1, updated_at = ?2
             WHERE id = ?1
             RETURNING {RESPONSE_COLUMNS}"
          ),
          rusqlite::params![old_id_str, at_str],
          RawResponse::from_row,
        )?;

        let current = tx.query_row(
          &format!(
            "INSERT INTO responses (
               id, slot_id, user_id, question_text, answer, stage,
               version, superseded, contradiction_flag, created_at, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, 0, ?8, ?8)
             RETURNING {RESPONSE_COLUMNS}"
          ),
          rusqlite::params![
            new_id_str,
            old.slot_id,
            old.user_id,
            old.question_text,
            new_answer,
            old.stage,
            old.version + 1,
            at_str,
          ],
          RawResponse::from_row,
        )?;

        tx.commit()?;
        Ok(SupersedeOutcome::Done { previous, current })
      })
      .await?;

    match outcome {
      SupersedeOutcome::Missing => Err(Error::ResponseNotFound(id)),
      SupersedeOutcome::AlreadySuperseded => Err(Error::AlreadySuperseded(id)),
      SupersedeOutcome::Done { previous, current } => Ok(Revision {
        previous: previous.into_response()?,
        current:  current.into_response()?,
      }),
    }
  }

  // ── Session ───────────────────────────────────────────────────────────────

  async fn reset_user(&self, user_id: Uuid) -> Result<()> {
    let user_id_str = encode_uuid(user_id);

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "DELETE FROM responses WHERE user_id = ?1",
          rusqlite::params![user_id_str],
        )?;
        tx.execute(
          "DELETE FROM progress WHERE user_id = ?1",
          rusqlite::params![user_id_str],
        )?;
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(())
  }
}
