//! SQL schema for the Dialectic SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- One row per user, created lazily.
CREATE TABLE IF NOT EXISTS progress (
    user_id             TEXT PRIMARY KEY,
    stage               INTEGER NOT NULL DEFAULT 1,
    status              TEXT    NOT NULL DEFAULT 'active',  -- 'active' | 'completed'
    response_count      INTEGER NOT NULL DEFAULT 0,
    contradiction_flag  INTEGER NOT NULL DEFAULT 0,
    completed_stages    TEXT    NOT NULL DEFAULT '[]',      -- JSON array of stage numbers
    current_question_id TEXT,
    last_updated        TEXT    NOT NULL                    -- ISO 8601 UTC
);

-- Versioned question/answer rows. Edits never rewrite an answer; they mark
-- the row superseded and insert version + 1 under the same slot.
CREATE TABLE IF NOT EXISTS responses (
    id                 TEXT PRIMARY KEY,
    slot_id            TEXT    NOT NULL,
    user_id            TEXT    NOT NULL,
    question_text      TEXT    NOT NULL,
    answer             TEXT    NOT NULL DEFAULT '',
    stage              INTEGER NOT NULL,
    version            INTEGER NOT NULL DEFAULT 1,
    superseded         INTEGER NOT NULL DEFAULT 0,
    contradiction_flag INTEGER NOT NULL DEFAULT 0,
    created_at         TEXT    NOT NULL,
    updated_at         TEXT    NOT NULL,
    UNIQUE (slot_id, version),
    CHECK  (version >= 1)
);

-- At most one active version per slot.
CREATE UNIQUE INDEX IF NOT EXISTS responses_active_slot_idx
    ON responses(slot_id) WHERE superseded = 0;

CREATE INDEX IF NOT EXISTS responses_user_idx
    ON responses(user_id, superseded, created_at);

PRAGMA user_version = 1;
";
