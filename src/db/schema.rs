//! Database schema and migrations for Credo.
//!
//! This module contains all database migrations that will be applied
//! sequentially when the database is first opened or upgraded.

/// Database migrations.
///
/// Each migration is a SQL script that will be executed in order.
/// The schema_version table tracks which migrations have been applied.
pub const MIGRATIONS: &[&str] = &[
    // v1: Initial schema - users table
    r#"
-- Users table for account identity and credentials
CREATE TABLE users (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    email               TEXT NOT NULL UNIQUE,    -- case-folded to lowercase at all entry points
    password            TEXT NOT NULL,           -- Argon2 hash
    email_verified      INTEGER NOT NULL DEFAULT 0,
    verification_token  TEXT,
    created_at          TEXT NOT NULL DEFAULT (datetime('now')),
    last_modified_at    TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_users_email ON users(email);
"#,
    // v2: Password reset tokens
    r#"
-- Password reset tokens: single-use, time-bounded.
-- Rows are never deleted; consumed and expired tokens remain as an audit trail.
CREATE TABLE password_reset_tokens (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id     INTEGER NOT NULL REFERENCES users(id),
    token       TEXT NOT NULL,
    expires_at  TEXT NOT NULL,
    consumed    INTEGER NOT NULL DEFAULT 0,
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_password_reset_tokens_user_id ON password_reset_tokens(user_id);
"#,
    // v3: Authorization claims
    r#"
-- Authorization claims, one row per user. Absence of a row means no privileges.
CREATE TABLE claims (
    user_id           INTEGER PRIMARY KEY REFERENCES users(id),
    is_admin          INTEGER NOT NULL DEFAULT 0,
    is_super_admin    INTEGER NOT NULL DEFAULT 0,
    last_modified_by  INTEGER NOT NULL REFERENCES users(id),
    last_modified_at  TEXT NOT NULL DEFAULT (datetime('now'))
);
"#,
];
