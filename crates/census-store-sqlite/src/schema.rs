//! SQL schema for the census SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS users (
    user_id     TEXT PRIMARY KEY,
    last_name   TEXT NOT NULL,
    first_name  TEXT NOT NULL,
    second_name TEXT,
    age         INTEGER NOT NULL,
    gender      TEXT NOT NULL,
    nationality TEXT NOT NULL,   -- ISO-like country code; 'ZZ' when unknown
    created_at  TEXT NOT NULL    -- ISO 8601 UTC; server-assigned
);

-- created_at drives default listing order; age drives the sorted listings.
CREATE INDEX IF NOT EXISTS users_created_idx ON users(created_at);
CREATE INDEX IF NOT EXISTS users_age_idx     ON users(age);

PRAGMA user_version = 1;
";
