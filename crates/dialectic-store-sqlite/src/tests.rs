//! Integration tests for `SqliteStore` against an in-memory database.

use dialectic_core::{
  progress::{ProgressStatus, ProgressUpdate},
  response::{NewResponse, ResponseFilter, ResponseUpdate},
  store::SessionStore,
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn question(user_id: Uuid, text: &str, stage: u8) -> NewResponse {
  NewResponse { user_id, question_text: text.into(), stage }
}

/// Record a question and answer it in one step.
async fn answered(s: &SqliteStore, user_id: Uuid, answer: &str) -> Uuid {
  let r = s.record_response(question(user_id, "Q?", 1)).await.unwrap();
  s.update_response(r.id, ResponseUpdate {
    answer: Some(answer.into()),
    ..ResponseUpdate::default()
  })
  .await
  .unwrap()
  .unwrap();
  r.id
}

// ─── Progress ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_progress_returns_none() {
  let s = store().await;
  assert!(s.get_progress(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn init_progress_uses_defaults() {
  let s = store().await;
  let user = Uuid::new_v4();

  let p = s.init_progress(user).await.unwrap();
  assert_eq!(p.user_id, user);
  assert_eq!(p.stage, 1);
  assert_eq!(p.status, ProgressStatus::Active);
  assert_eq!(p.response_count, 0);
  assert!(!p.contradiction_flag);
  assert!(p.completed_stages.is_empty());
  assert!(p.current_question_id.is_none());

  let fetched = s.get_progress(user).await.unwrap().unwrap();
  assert_eq!(fetched, p);
}

#[tokio::test]
async fn init_progress_keeps_existing_row() {
  let s = store().await;
  let user = Uuid::new_v4();

  s.init_progress(user).await.unwrap();
  s.update_progress(user, ProgressUpdate { stage: Some(3), ..Default::default() })
    .await
    .unwrap();

  let again = s.init_progress(user).await.unwrap();
  assert_eq!(again.stage, 3);
}

#[tokio::test]
async fn update_progress_merges_and_refreshes_timestamp() {
  let s = store().await;
  let user = Uuid::new_v4();
  let before = s.init_progress(user).await.unwrap();

  let question_id = Uuid::new_v4();
  let after = s
    .update_progress(user, ProgressUpdate {
      response_count: Some(2),
      completed_stages: Some(vec![1]),
      current_question_id: Some(question_id),
      ..Default::default()
    })
    .await
    .unwrap()
    .unwrap();

  assert_eq!(after.stage, before.stage);
  assert_eq!(after.response_count, 2);
  assert_eq!(after.completed_stages, vec![1]);
  assert_eq!(after.current_question_id, Some(question_id));
  assert!(after.last_updated >= before.last_updated);

  let flagged = s
    .update_progress(user, ProgressUpdate::contradiction(true))
    .await
    .unwrap()
    .unwrap();
  assert!(flagged.contradiction_flag);
  assert_eq!(flagged.response_count, 2);
}

#[tokio::test]
async fn update_progress_without_row_returns_none() {
  let s = store().await;
  let result = s
    .update_progress(Uuid::new_v4(), ProgressUpdate::contradiction(true))
    .await
    .unwrap();
  assert!(result.is_none());
}

// ─── Responses ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn record_response_creates_unanswered_v1() {
  let s = store().await;
  let user = Uuid::new_v4();

  let r = s.record_response(question(user, "Why obey?", 2)).await.unwrap();
  assert_eq!(r.slot_id, r.id);
  assert_eq!(r.version, 1);
  assert!(!r.superseded);
  assert!(!r.contradiction_flag);
  assert!(r.answer.is_empty());

  let fetched = s.get_response(r.id).await.unwrap().unwrap();
  assert_eq!(fetched, r);
}

#[tokio::test]
async fn repeated_questions_are_not_deduplicated() {
  let s = store().await;
  let user = Uuid::new_v4();

  let a = s.record_response(question(user, "Same?", 1)).await.unwrap();
  let b = s.record_response(question(user, "Same?", 1)).await.unwrap();
  assert_ne!(a.id, b.id);

  let all = s.list_responses(user, ResponseFilter::default()).await.unwrap();
  assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn active_answers_skip_unanswered_and_keep_order() {
  let s = store().await;
  let user = Uuid::new_v4();

  answered(&s, user, "first").await;
  s.record_response(question(user, "open", 1)).await.unwrap();
  answered(&s, user, "second").await;
  answered(&s, Uuid::new_v4(), "someone else").await;

  let active = s.active_answers(user).await.unwrap();
  let texts: Vec<_> = active.iter().map(|r| r.answer.as_str()).collect();
  assert_eq!(texts, ["first", "second"]);
}

#[tokio::test]
async fn update_response_sets_flag_and_answer() {
  let s = store().await;
  let user = Uuid::new_v4();
  let r = s.record_response(question(user, "Q?", 1)).await.unwrap();

  let updated = s
    .update_response(r.id, ResponseUpdate {
      answer:             Some("an answer".into()),
      contradiction_flag: Some(true),
    })
    .await
    .unwrap()
    .unwrap();
  assert_eq!(updated.answer, "an answer");
  assert!(updated.contradiction_flag);
  assert_eq!(updated.version, 1);
  assert!(updated.updated_at >= r.updated_at);
}

#[tokio::test]
async fn recorded_answers_are_not_overwritten() {
  let s = store().await;
  let user = Uuid::new_v4();
  let id = answered(&s, user, "first").await;

  let second = s
    .update_response(id, ResponseUpdate {
      answer:             Some("second".into()),
      contradiction_flag: Some(true),
    })
    .await
    .unwrap();
  assert!(second.is_none());

  let row = s.get_response(id).await.unwrap().unwrap();
  assert_eq!(row.answer, "first");
  assert!(!row.contradiction_flag);

  let flagged = s
    .update_response(id, ResponseUpdate {
      contradiction_flag: Some(true),
      ..ResponseUpdate::default()
    })
    .await
    .unwrap()
    .unwrap();
  assert_eq!(flagged.answer, "first");
  assert!(flagged.contradiction_flag);
}

#[tokio::test]
async fn update_missing_response_returns_none() {
  let s = store().await;
  let result = s
    .update_response(Uuid::new_v4(), ResponseUpdate::default())
    .await
    .unwrap();
  assert!(result.is_none());
}

// ─── Supersession ────────────────────────────────────────────────────────────

#[tokio::test]
async fn supersede_inserts_next_version_in_same_slot() {
  let s = store().await;
  let user = Uuid::new_v4();
  let old_id = answered(&s, user, "old view").await;

  let rev = s.supersede_response(old_id, "new view".into()).await.unwrap();

  assert_eq!(rev.previous.id, old_id);
  assert!(rev.previous.superseded);
  assert_eq!(rev.previous.version, 1);
  assert_eq!(rev.previous.answer, "old view");

  assert_ne!(rev.current.id, old_id);
  assert_eq!(rev.current.slot_id, rev.previous.slot_id);
  assert_eq!(rev.current.version, 2);
  assert!(!rev.current.superseded);
  assert_eq!(rev.current.answer, "new view");
  assert_eq!(rev.current.question_text, rev.previous.question_text);
  assert_eq!(rev.current.stage, rev.previous.stage);

  // Active view: only the replacement.
  let active = s.active_answers(user).await.unwrap();
  assert_eq!(active.len(), 1);
  assert_eq!(active[0].id, rev.current.id);

  // Full history: both rows, exactly one active.
  let all = s
    .list_responses(user, ResponseFilter { include_superseded: true, stage: None })
    .await
    .unwrap();
  assert_eq!(all.len(), 2);
  assert_eq!(all.iter().filter(|r| !r.superseded).count(), 1);
}

#[tokio::test]
async fn supersede_chain_keeps_one_active_row_per_slot() {
  let s = store().await;
  let user = Uuid::new_v4();
  let first = answered(&s, user, "v1").await;

  let r2 = s.supersede_response(first, "v2".into()).await.unwrap();
  let r3 = s.supersede_response(r2.current.id, "v3".into()).await.unwrap();
  assert_eq!(r3.current.version, 3);

  let history = s
    .list_responses(user, ResponseFilter { include_superseded: true, stage: None })
    .await
    .unwrap();
  assert_eq!(history.len(), 3);
  let active: Vec<_> = history.iter().filter(|r| !r.superseded).collect();
  assert_eq!(active.len(), 1);
  assert_eq!(active[0].answer, "v3");
}

#[tokio::test]
async fn supersede_already_superseded_errors() {
  let s = store().await;
  let user = Uuid::new_v4();
  let old_id = answered(&s, user, "a").await;
  s.supersede_response(old_id, "b".into()).await.unwrap();

  let err = s.supersede_response(old_id, "c".into()).await.unwrap_err();
  assert!(matches!(err, crate::Error::AlreadySuperseded(id) if id == old_id));
}

#[tokio::test]
async fn supersede_nonexistent_response_errors() {
  let s = store().await;
  let err = s
    .supersede_response(Uuid::new_v4(), "x".into())
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::ResponseNotFound(_)));
}

#[tokio::test]
async fn list_responses_filters_by_stage() {
  let s = store().await;
  let user = Uuid::new_v4();
  s.record_response(question(user, "one", 1)).await.unwrap();
  s.record_response(question(user, "two", 2)).await.unwrap();
  s.record_response(question(user, "two again", 2)).await.unwrap();

  let stage_two = s
    .list_responses(user, ResponseFilter { include_superseded: false, stage: Some(2) })
    .await
    .unwrap();
  assert_eq!(stage_two.len(), 2);
  assert!(stage_two.iter().all(|r| r.stage == 2));
}

// ─── Session reset ───────────────────────────────────────────────────────────

#[tokio::test]
async fn reset_user_purges_progress_and_responses() {
  let s = store().await;
  let user = Uuid::new_v4();
  let other = Uuid::new_v4();

  s.init_progress(user).await.unwrap();
  s.init_progress(other).await.unwrap();
  answered(&s, user, "mine").await;
  answered(&s, other, "theirs").await;

  s.reset_user(user).await.unwrap();

  assert!(s.get_progress(user).await.unwrap().is_none());
  let history = s
    .list_responses(user, ResponseFilter { include_superseded: true, stage: None })
    .await
    .unwrap();
  assert!(history.is_empty());

  assert!(s.get_progress(other).await.unwrap().is_some());
  assert_eq!(s.active_answers(other).await.unwrap().len(), 1);
}
