//! Password reset token repository.
//!
//! Reset tokens are single-use and time-bounded. Several outstanding
//! tokens per user are allowed; each stays valid until its own expiry
//! or consumption. Rows are retained after consumption.

use super::{Db, DbPool};
use crate::{CredoError, Result};

#[cfg(feature = "sqlite")]
const SQL_NOW: &str = "datetime('now')";
#[cfg(feature = "postgres")]
const SQL_NOW: &str = "TO_CHAR(NOW(), 'YYYY-MM-DD HH24:MI:SS')";

/// Password reset token entity.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ResetToken {
    /// Token ID.
    pub id: i64,
    /// User ID.
    pub user_id: i64,
    /// Token string.
    pub token: String,
    /// Expiration timestamp.
    pub expires_at: String,
    /// Whether the token has been consumed.
    pub consumed: bool,
    /// Creation timestamp.
    pub created_at: String,
}

/// New reset token for creation.
pub struct NewResetToken {
    /// User ID.
    pub user_id: i64,
    /// Token string.
    pub token: String,
    /// Expiration timestamp.
    pub expires_at: String,
}

/// Atomically consume a matching active reset token.
///
/// The token is matched on user id + token string, and only when it is
/// not yet consumed and not expired. The conditional UPDATE guarantees
/// that of two racing callers presenting the same token, exactly one
/// receives the row.
///
/// Takes any executor so it can run directly on the pool or inside an
/// enclosing transaction.
pub async fn consume_reset_token<'e, E>(
    executor: E,
    user_id: i64,
    token: &str,
) -> Result<Option<ResetToken>>
where
    E: sqlx::Executor<'e, Database = Db>,
{
    let sql = format!(
        "UPDATE password_reset_tokens
         SET consumed = 1
         WHERE user_id = $1
           AND token = $2
           AND consumed = 0
           AND expires_at > {}
         RETURNING id, user_id, token, expires_at, consumed, created_at",
        SQL_NOW
    );

    let result = sqlx::query_as::<_, ResetToken>(&sql)
        .bind(user_id)
        .bind(token)
        .fetch_optional(executor)
        .await
        .map_err(|e| CredoError::Database(e.to_string()))?;

    Ok(result)
}

/// Repository for password reset token operations.
pub struct ResetTokenRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> ResetTokenRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a new reset token.
    pub async fn create(&self, new_token: &NewResetToken) -> Result<ResetToken> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO password_reset_tokens (user_id, token, expires_at)
             VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(new_token.user_id)
        .bind(&new_token.token)
        .bind(&new_token.expires_at)
        .fetch_one(self.pool)
        .await
        .map_err(|e| CredoError::Database(e.to_string()))?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| CredoError::Database("inserted reset token not found".to_string()))
    }

    /// Get a reset token by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<ResetToken>> {
        let token = sqlx::query_as::<_, ResetToken>(
            "SELECT id, user_id, token, expires_at, consumed, created_at
             FROM password_reset_tokens WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| CredoError::Database(e.to_string()))?;

        Ok(token)
    }

    /// Find an active (not consumed, not expired) token matching
    /// user id + token string, without consuming it.
    pub async fn find_active(&self, user_id: i64, token: &str) -> Result<Option<ResetToken>> {
        let sql = format!(
            "SELECT id, user_id, token, expires_at, consumed, created_at
             FROM password_reset_tokens
             WHERE user_id = $1
               AND token = $2
               AND consumed = 0
               AND expires_at > {}",
            SQL_NOW
        );
        let result = sqlx::query_as::<_, ResetToken>(&sql)
            .bind(user_id)
            .bind(token)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| CredoError::Database(e.to_string()))?;

        Ok(result)
    }

    /// Atomically consume a matching active token. See [`consume_reset_token`].
    pub async fn consume(&self, user_id: i64, token: &str) -> Result<Option<ResetToken>> {
        consume_reset_token(self.pool, user_id, token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    async fn setup_db() -> Database {
        let db = Database::open_in_memory().await.unwrap();
        sqlx::query("INSERT INTO users (email, password) VALUES ($1, $2)")
            .bind("user@example.com")
            .bind("hash")
            .execute(db.pool())
            .await
            .unwrap();
        db
    }

    #[tokio::test]
    async fn test_create_reset_token() {
        let db = setup_db().await;
        let repo = ResetTokenRepository::new(db.pool());

        let new_token = NewResetToken {
            user_id: 1,
            token: "reset-abc".to_string(),
            expires_at: "2099-12-31 23:59:59".to_string(),
        };

        let token = repo.create(&new_token).await.unwrap();
        assert_eq!(token.user_id, 1);
        assert_eq!(token.token, "reset-abc");
        assert!(!token.consumed);
    }

    #[tokio::test]
    async fn test_consume_token_single_use() {
        let db = setup_db().await;
        let repo = ResetTokenRepository::new(db.pool());

        let new_token = NewResetToken {
            user_id: 1,
            token: "once".to_string(),
            expires_at: "2099-12-31 23:59:59".to_string(),
        };
        repo.create(&new_token).await.unwrap();

        // First consume succeeds
        let consumed = repo.consume(1, "once").await.unwrap();
        assert!(consumed.is_some());
        assert!(consumed.unwrap().consumed);

        // Second consume fails (already consumed)
        let second = repo.consume(1, "once").await.unwrap();
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn test_consume_expired_token() {
        let db = setup_db().await;
        let repo = ResetTokenRepository::new(db.pool());

        let new_token = NewResetToken {
            user_id: 1,
            token: "stale".to_string(),
            expires_at: "2000-01-01 00:00:00".to_string(),
        };
        repo.create(&new_token).await.unwrap();

        let consumed = repo.consume(1, "stale").await.unwrap();
        assert!(consumed.is_none());
    }

    #[tokio::test]
    async fn test_consume_wrong_user() {
        let db = setup_db().await;
        let repo = ResetTokenRepository::new(db.pool());

        let new_token = NewResetToken {
            user_id: 1,
            token: "mine".to_string(),
            expires_at: "2099-12-31 23:59:59".to_string(),
        };
        repo.create(&new_token).await.unwrap();

        // Token string is right but the user id is not
        let consumed = repo.consume(99, "mine").await.unwrap();
        assert!(consumed.is_none());

        // The token stays usable by its owner
        let consumed = repo.consume(1, "mine").await.unwrap();
        assert!(consumed.is_some());
    }

    #[tokio::test]
    async fn test_find_active_does_not_consume() {
        let db = setup_db().await;
        let repo = ResetTokenRepository::new(db.pool());

        let new_token = NewResetToken {
            user_id: 1,
            token: "peek".to_string(),
            expires_at: "2099-12-31 23:59:59".to_string(),
        };
        repo.create(&new_token).await.unwrap();

        let found = repo.find_active(1, "peek").await.unwrap();
        assert!(found.is_some());

        // Still active afterwards
        let found = repo.find_active(1, "peek").await.unwrap();
        assert!(found.is_some());
        assert!(!found.unwrap().consumed);
    }

    #[tokio::test]
    async fn test_multiple_outstanding_tokens() {
        let db = setup_db().await;
        let repo = ResetTokenRepository::new(db.pool());

        for token in ["first", "second"] {
            let new_token = NewResetToken {
                user_id: 1,
                token: token.to_string(),
                expires_at: "2099-12-31 23:59:59".to_string(),
            };
            repo.create(&new_token).await.unwrap();
        }

        // Consuming one leaves the other valid
        let consumed = repo.consume(1, "first").await.unwrap();
        assert!(consumed.is_some());

        let other = repo.find_active(1, "second").await.unwrap();
        assert!(other.is_some());
    }

    #[tokio::test]
    async fn test_consumed_row_is_retained() {
        let db = setup_db().await;
        let repo = ResetTokenRepository::new(db.pool());

        let new_token = NewResetToken {
            user_id: 1,
            token: "kept".to_string(),
            expires_at: "2099-12-31 23:59:59".to_string(),
        };
        let created = repo.create(&new_token).await.unwrap();
        repo.consume(1, "kept").await.unwrap();

        // The row still exists, flagged consumed
        let row = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert!(row.consumed);
    }
}
