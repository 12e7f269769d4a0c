//! Authorization claims repository.
//!
//! One row per user; absence of a row means no privileges (default-deny).
//! Rows are written only through the super-admin claims-update operation.

use super::DbPool;
use crate::{CredoError, Result};

#[cfg(feature = "sqlite")]
const SQL_NOW: &str = "datetime('now')";
#[cfg(feature = "postgres")]
const SQL_NOW: &str = "TO_CHAR(NOW(), 'YYYY-MM-DD HH24:MI:SS')";

/// Authorization claims entity.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ClaimsRecord {
    /// User ID the claims apply to.
    pub user_id: i64,
    /// Admin flag.
    pub is_admin: bool,
    /// Super-admin flag.
    pub is_super_admin: bool,
    /// User ID of the editor who last changed this row.
    pub last_modified_by: i64,
    /// Last modification timestamp.
    pub last_modified_at: String,
}

/// Repository for claims record operations.
pub struct ClaimsRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> ClaimsRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Insert or update the claims row for a user.
    ///
    /// A foreign-key violation (unknown user id) surfaces as
    /// `CredoError::Integrity`; callers turn that into their own
    /// unknown-entity error.
    pub async fn upsert(
        &self,
        user_id: i64,
        is_admin: bool,
        is_super_admin: bool,
        modified_by: i64,
    ) -> Result<()> {
        let sql = format!(
            "INSERT INTO claims (user_id, is_admin, is_super_admin, last_modified_by, last_modified_at)
             VALUES ($1, $2, $3, $4, {})
             ON CONFLICT(user_id) DO UPDATE SET
                is_admin = excluded.is_admin,
                is_super_admin = excluded.is_super_admin,
                last_modified_by = excluded.last_modified_by,
                last_modified_at = excluded.last_modified_at",
            SQL_NOW
        );
        sqlx::query(&sql)
            .bind(user_id)
            .bind(is_admin)
            .bind(is_super_admin)
            .bind(modified_by)
            .execute(self.pool)
            .await
            .map_err(|e| match e.as_database_error() {
                Some(db_err) if db_err.is_foreign_key_violation() => {
                    CredoError::Integrity("unknown user id".to_string())
                }
                _ => CredoError::Database(e.to_string()),
            })?;

        Ok(())
    }

    /// Get the claims row for a user, if any.
    pub async fn get_by_user(&self, user_id: i64) -> Result<Option<ClaimsRecord>> {
        let record = sqlx::query_as::<_, ClaimsRecord>(
            "SELECT user_id, is_admin, is_super_admin, last_modified_by, last_modified_at
             FROM claims WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| CredoError::Database(e.to_string()))?;

        Ok(record)
    }

    /// List all claims rows.
    pub async fn list_all(&self) -> Result<Vec<ClaimsRecord>> {
        let records = sqlx::query_as::<_, ClaimsRecord>(
            "SELECT user_id, is_admin, is_super_admin, last_modified_by, last_modified_at
             FROM claims ORDER BY user_id",
        )
        .fetch_all(self.pool)
        .await
        .map_err(|e| CredoError::Database(e.to_string()))?;

        Ok(records)
    }
}
