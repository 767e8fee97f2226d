//! The `SessionStore` trait.
//!
//! The trait is implemented by storage backends (e.g.
//! `dialectic-store-sqlite`). The engine and the HTTP layer depend on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  progress::{Progress, ProgressUpdate},
  response::{NewResponse, Response, ResponseFilter, ResponseUpdate, Revision},
};

/// Abstraction over the progress and response tables.
///
/// Responses are append-only apart from two in-place updates: recording the
/// answer on an unanswered row, and tagging a row as contradictory. Edits go
/// through [`SessionStore::supersede_response`], which must mark the old row
/// and insert its replacement atomically.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait SessionStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Progress ──────────────────────────────────────────────────────────

  /// Fetch a user's progress row. Returns `None` if it does not exist.
  fn get_progress(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Option<Progress>, Self::Error>> + Send + '_;

  /// Insert a progress row with default values, or return the existing row
  /// untouched if one is already present.
  fn init_progress(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Progress, Self::Error>> + Send + '_;

  /// Merge `update` into the user's row and refresh `last_updated`.
  /// Returns `None` if the user has no progress row.
  fn update_progress(
    &self,
    user_id: Uuid,
    update: ProgressUpdate,
  ) -> impl Future<Output = Result<Option<Progress>, Self::Error>> + Send + '_;

  // ── Responses ─────────────────────────────────────────────────────────

  /// Persist a new unanswered version-1 row.
  fn record_response(
    &self,
    input: NewResponse,
  ) -> impl Future<Output = Result<Response, Self::Error>> + Send + '_;

  /// Fetch a single row by id, superseded or not.
  fn get_response(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Response>, Self::Error>> + Send + '_;

  /// List a user's rows in creation order.
  fn list_responses(
    &self,
    user_id: Uuid,
    filter: ResponseFilter,
  ) -> impl Future<Output = Result<Vec<Response>, Self::Error>> + Send + '_;

  /// The active answer set: non-superseded rows with a non-empty answer, in
  /// creation order.
  fn active_answers(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Response>, Self::Error>> + Send + '_;

  /// Apply `update` to a row and refresh `updated_at`.
  ///
  /// An answer is only written to an active, unanswered row. Returns `None`
  /// if the row does not exist or the answer would overwrite an earlier one.
  fn update_response(
    &self,
    id: Uuid,
    update: ResponseUpdate,
  ) -> impl Future<Output = Result<Option<Response>, Self::Error>> + Send + '_;

  /// Mark row `id` superseded and insert its replacement carrying
  /// `new_answer`, `version + 1`, and the same slot, question, and stage,
  /// in a single transaction.
  ///
  /// Returns an error if the row does not exist or is already superseded.
  fn supersede_response(
    &self,
    id: Uuid,
    new_answer: String,
  ) -> impl Future<Output = Result<Revision, Self::Error>> + Send + '_;

  // ── Session ───────────────────────────────────────────────────────────

  /// Delete the user's progress row and every response they own.
  fn reset_user(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
