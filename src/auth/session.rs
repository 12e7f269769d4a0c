//! Login, token refresh, and password change/reset flows.

use std::sync::Arc;

use rand::{distr::Alphanumeric, Rng};
use tracing::{debug, info};

use crate::auth::claims::resolve_claims;
use crate::auth::token::TokenIssuer;
use crate::auth::{hash_password, verify_password};
use crate::db::{
    consume_reset_token, utc_in_minutes, DbPool, NewResetToken, ResetTokenRepository,
    UserRepository,
};
use crate::mail::{send_detached, Mailer};
use crate::{CredoError, Result};

#[cfg(feature = "sqlite")]
const SQL_NOW: &str = "datetime('now')";
#[cfg(feature = "postgres")]
const SQL_NOW: &str = "TO_CHAR(NOW(), 'YYYY-MM-DD HH24:MI:SS')";

/// Reset tokens are valid for 30 minutes from creation.
pub const RESET_TOKEN_VALIDITY_MINUTES: i64 = 30;

/// Length of the URL-safe reset token string.
const RESET_TOKEN_LENGTH: usize = 32;

/// An access/refresh token pair issued on login.
#[derive(Debug, Clone)]
pub struct TokenPair {
    /// Short-lived access token with a fresh claims snapshot.
    pub access_token: String,
    /// Long-lived refresh token carrying identity only.
    pub refresh_token: String,
}

/// Orchestrates login, refresh, and the password workflows.
pub struct SessionService {
    pool: DbPool,
    issuer: Arc<TokenIssuer>,
    mailer: Arc<dyn Mailer>,
}

impl SessionService {
    /// Create a new session service.
    pub fn new(pool: DbPool, issuer: Arc<TokenIssuer>, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            pool,
            issuer,
            mailer,
        }
    }

    /// Authenticate email + password and issue a token pair.
    ///
    /// Unknown email and wrong password both fail with the identical
    /// `InvalidCredentials` error so callers cannot enumerate accounts.
    /// The access token is marked fresh and carries the claims resolved
    /// at this instant.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair> {
        let email = email.to_lowercase();
        let repo = UserRepository::new(&self.pool);

        let user = repo
            .get_by_email(&email)
            .await?
            .ok_or(CredoError::InvalidCredentials)?;

        if !verify_password(password, &user.password)? {
            return Err(CredoError::InvalidCredentials);
        }

        let claims = resolve_claims(&self.pool, user.id).await?;
        let access_token = self.issuer.issue_access_token(user.id, &claims, true)?;
        let refresh_token = self.issuer.issue_refresh_token(user.id)?;

        info!(user_id = user.id, "User logged in");
        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Re-issue an access token for an already-authenticated refresh
    /// identity.
    ///
    /// Claims are re-resolved at refresh time, so privilege changes
    /// since the last login are picked up; the token is marked
    /// non-fresh.
    pub async fn refresh(&self, user_id: i64) -> Result<String> {
        let claims = resolve_claims(&self.pool, user_id).await?;
        self.issuer.issue_access_token(user_id, &claims, false)
    }

    /// Start the password-reset workflow for an email address.
    ///
    /// Silently no-ops for an unknown email (no enumeration signal).
    /// Outstanding tokens are not rotated; each stays valid until its
    /// own expiry or consumption.
    pub async fn request_password_reset(&self, email: &str) -> Result<()> {
        let email = email.to_lowercase();
        let repo = UserRepository::new(&self.pool);

        let Some(user) = repo.get_by_email(&email).await? else {
            debug!("Password reset requested for unknown email");
            return Ok(());
        };

        let token: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(RESET_TOKEN_LENGTH)
            .map(char::from)
            .collect();
        let expires_at = utc_in_minutes(RESET_TOKEN_VALIDITY_MINUTES);

        ResetTokenRepository::new(&self.pool)
            .create(&NewResetToken {
                user_id: user.id,
                token: token.clone(),
                expires_at: expires_at.clone(),
            })
            .await?;

        send_detached(
            self.mailer.clone(),
            email,
            "Password reset".to_string(),
            format!(
                "User id: {}, reset token: {token}, valid until {expires_at} UTC",
                user.id
            ),
        );

        info!(user_id = user.id, "Password reset token issued");
        Ok(())
    }

    /// Reset a password with a previously issued reset token.
    ///
    /// Token consumption and the password-hash update run in a single
    /// transaction; the consume is a conditional update, so of two
    /// racing callers presenting the same token exactly one succeeds.
    /// A wrong, expired, or already-consumed token is the same
    /// indistinguishable `InvalidResetToken` failure.
    pub async fn reset_password(&self, user_id: i64, token: &str, new_password: &str) -> Result<()> {
        // Fail fast before paying for the hash; the transactional
        // consume below re-checks under the write lock.
        let reset_repo = ResetTokenRepository::new(&self.pool);
        if reset_repo.find_active(user_id, token).await?.is_none() {
            return Err(CredoError::InvalidResetToken);
        }

        let new_hash = hash_password(new_password)?;

        let mut tx = self.pool.begin().await?;

        let consumed = consume_reset_token(&mut *tx, user_id, token).await?;
        if consumed.is_none() {
            return Err(CredoError::InvalidResetToken);
        }

        let sql = format!(
            "UPDATE users SET password = $1, last_modified_at = {} WHERE id = $2",
            SQL_NOW
        );
        let result = sqlx::query(&sql)
            .bind(&new_hash)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| CredoError::Database(e.to_string()))?;
        if result.rows_affected() == 0 {
            return Err(CredoError::InvalidUser);
        }

        tx.commit().await?;

        info!(user_id, "Password reset completed");
        Ok(())
    }

    /// Change the password of a logged-in user.
    ///
    /// Outstanding access/refresh tokens stay valid until their natural
    /// expiry; no re-authentication of other sessions happens here.
    pub async fn change_password(
        &self,
        user_id: i64,
        existing_password: &str,
        new_password: &str,
    ) -> Result<()> {
        let repo = UserRepository::new(&self.pool);

        let user = repo
            .get_by_id(user_id)
            .await?
            .ok_or(CredoError::InvalidUser)?;

        if !verify_password(existing_password, &user.password)? {
            return Err(CredoError::IncorrectPassword);
        }

        let new_hash = hash_password(new_password)?;
        repo.update_password(user_id, &new_hash).await?;

        info!(user_id, "Password changed");
        Ok(())
    }
}
