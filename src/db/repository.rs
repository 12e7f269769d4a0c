//! User repository for Credo.
//!
//! This module provides the store operations for user records.

use super::user::{NewUser, User};
use super::DbPool;
use crate::{CredoError, Result};

#[cfg(feature = "sqlite")]
const SQL_NOW: &str = "datetime('now')";
#[cfg(feature = "postgres")]
const SQL_NOW: &str = "TO_CHAR(NOW(), 'YYYY-MM-DD HH24:MI:SS')";

/// Repository for user record operations.
pub struct UserRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Insert a new user record.
    ///
    /// The storage-layer uniqueness constraint on email is the backstop for
    /// the caller's explicit existence check; a duplicate-insert race
    /// surfaces as `CredoError::Integrity`.
    pub async fn create(&self, new_user: &NewUser) -> Result<User> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO users (email, password, verification_token)
             VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&new_user.email)
        .bind(&new_user.password)
        .bind(&new_user.verification_token)
        .fetch_one(self.pool)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db_err) if db_err.is_unique_violation() => {
                CredoError::Integrity("email already present".to_string())
            }
            _ => CredoError::Database(e.to_string()),
        })?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| CredoError::Database("inserted user not found".to_string()))
    }

    /// Get a user by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password, email_verified, verification_token,
                    created_at, last_modified_at
             FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| CredoError::Database(e.to_string()))?;

        Ok(user)
    }

    /// Get a user by email. Emails are stored lowercase, so callers must
    /// case-fold before lookup.
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password, email_verified, verification_token,
                    created_at, last_modified_at
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| CredoError::Database(e.to_string()))?;

        Ok(user)
    }

    /// Check whether an email is already registered.
    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email)
                .fetch_one(self.pool)
                .await
                .map_err(|e| CredoError::Database(e.to_string()))?;

        Ok(exists)
    }

    /// Mark the user with the given email as verified.
    pub async fn mark_verified(&self, email: &str) -> Result<bool> {
        let sql = format!(
            "UPDATE users SET email_verified = 1, last_modified_at = {} WHERE email = $1",
            SQL_NOW
        );
        let result = sqlx::query(&sql)
            .bind(email)
            .execute(self.pool)
            .await
            .map_err(|e| CredoError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    /// Replace the stored password hash for a user.
    pub async fn update_password(&self, id: i64, password_hash: &str) -> Result<bool> {
        let sql = format!(
            "UPDATE users SET password = $1, last_modified_at = {} WHERE id = $2",
            SQL_NOW
        );
        let result = sqlx::query(&sql)
            .bind(password_hash)
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| CredoError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
