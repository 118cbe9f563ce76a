//! SQL schema for the Roster SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    first_name    TEXT NOT NULL,
    last_name     TEXT NOT NULL,
    email         TEXT NOT NULL,   -- trimmed + lowercased by the directory
    mobile        TEXT NOT NULL,
    gender        TEXT NOT NULL,   -- 'Male' | 'Female'
    status        TEXT NOT NULL DEFAULT 'Active',
    profile_image TEXT,
    created_at    TEXT NOT NULL,   -- RFC 3339 UTC, fixed microsecond width
    updated_at    TEXT NOT NULL
);

-- The authoritative uniqueness check; the directory's lookup is advisory.
CREATE UNIQUE INDEX IF NOT EXISTS users_email_idx   ON users(email);
CREATE INDEX        IF NOT EXISTS users_created_idx ON users(created_at);

PRAGMA user_version = 1;
";
