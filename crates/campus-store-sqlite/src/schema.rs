//! SQL schema for the campus SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    display_name  TEXT NOT NULL,
    role          TEXT NOT NULL DEFAULT 'user',  -- 'user' | 'moderator' | 'admin'
    points        INTEGER NOT NULL DEFAULT 0 CHECK (points >= 0),
    level         INTEGER NOT NULL DEFAULT 1 CHECK (level >= 1),
    created_at    TEXT NOT NULL
);

-- One row per applied award; the key makes redelivered events harmless.
CREATE TABLE IF NOT EXISTS point_awards (
    user_id      TEXT NOT NULL REFERENCES users(user_id),
    action       TEXT NOT NULL,
    subject_key  TEXT NOT NULL,
    points       INTEGER NOT NULL,
    awarded_at   TEXT NOT NULL,
    PRIMARY KEY (user_id, action, subject_key)
);

-- Posts, comments, questions and answers.
CREATE TABLE IF NOT EXISTS contents (
    content_id          TEXT PRIMARY KEY,
    kind                TEXT NOT NULL,   -- 'post' | 'comment' | 'question' | 'answer'
    owner_id            TEXT NOT NULL REFERENCES users(user_id),
    parent_id           TEXT REFERENCES contents(content_id),
    body                TEXT NOT NULL,
    accepted_answer_id  TEXT REFERENCES contents(content_id),
    created_at          TEXT NOT NULL
);

-- Live documents and their archived snapshots in one table.
-- Live rows have head_id NULL; archived rows are never updated.
CREATE TABLE IF NOT EXISTS documents (
    document_id     TEXT PRIMARY KEY,
    owner_id        TEXT NOT NULL REFERENCES users(user_id),
    title           TEXT NOT NULL,
    description     TEXT,
    file_url        TEXT NOT NULL,
    file_type       TEXT NOT NULL,
    file_size       INTEGER NOT NULL,
    version         INTEGER NOT NULL CHECK (version >= 1),
    parent_id       TEXT REFERENCES documents(document_id),
    head_id         TEXT REFERENCES documents(document_id),
    quality_status  TEXT NOT NULL DEFAULT 'PENDING',
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS notifications (
    notification_id  TEXT PRIMARY KEY,
    owner_id         TEXT NOT NULL REFERENCES users(user_id),
    kind             TEXT NOT NULL,   -- 'SYSTEM' | 'DAILY' | 'LIKE' | 'COMMENT' | 'FOLLOW'
    content          TEXT NOT NULL,
    link             TEXT,
    is_read          INTEGER NOT NULL DEFAULT 0,
    created_at       TEXT NOT NULL
);

-- Presence of a row is the reacted state.
CREATE TABLE IF NOT EXISTS reactions (
    reaction     TEXT NOT NULL,   -- 'like' | 'bookmark'
    actor_id     TEXT NOT NULL REFERENCES users(user_id),
    target_kind  TEXT NOT NULL,
    target_id    TEXT NOT NULL,
    created_at   TEXT NOT NULL,
    PRIMARY KEY (reaction, actor_id, target_kind, target_id)
);

CREATE TABLE IF NOT EXISTS votes (
    actor_id     TEXT NOT NULL REFERENCES users(user_id),
    target_kind  TEXT NOT NULL,
    target_id    TEXT NOT NULL,
    value        INTEGER NOT NULL CHECK (value IN (-1, 1)),
    updated_at   TEXT NOT NULL,
    PRIMARY KEY (actor_id, target_kind, target_id)
);

-- user_a < user_b; lookups still check both orderings.
CREATE TABLE IF NOT EXISTS conversations (
    conversation_id  TEXT PRIMARY KEY,
    user_a           TEXT NOT NULL REFERENCES users(user_id),
    user_b           TEXT NOT NULL REFERENCES users(user_id),
    created_at       TEXT NOT NULL,
    UNIQUE (user_a, user_b),
    CHECK  (user_a != user_b)
);

CREATE INDEX IF NOT EXISTS contents_parent_idx      ON contents(parent_id);
CREATE INDEX IF NOT EXISTS documents_head_idx       ON documents(head_id);
CREATE INDEX IF NOT EXISTS notifications_owner_idx  ON notifications(owner_id, created_at);
CREATE INDEX IF NOT EXISTS reactions_target_idx     ON reactions(target_kind, target_id, reaction);
CREATE INDEX IF NOT EXISTS votes_target_idx         ON votes(target_kind, target_id);

PRAGMA user_version = 1;
";
