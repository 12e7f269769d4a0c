//! Account registration and email verification.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::auth::hash_password;
use crate::db::{DbPool, NewUser, UserRepository};
use crate::mail::{send_detached, Mailer};
use crate::{CredoError, Result};

/// Orchestrates account creation and email verification.
///
/// Dependencies are injected at construction; the service holds no
/// process-wide state.
pub struct RegistrationService {
    pool: DbPool,
    mailer: Arc<dyn Mailer>,
}

impl RegistrationService {
    /// Create a new registration service.
    pub fn new(pool: DbPool, mailer: Arc<dyn Mailer>) -> Self {
        Self { pool, mailer }
    }

    /// Register a new account.
    ///
    /// The email is case-folded to lowercase before it touches the
    /// store. Fails with `EmailInUse` when a record already exists; a
    /// duplicate-insert race past that check surfaces as `Integrity`.
    /// The verification mail is fire-and-forget: registration has
    /// already succeeded when it is dispatched.
    pub async fn register(&self, email: &str, password: &str) -> Result<i64> {
        let email = email.to_lowercase();
        let repo = UserRepository::new(&self.pool);

        if repo.email_exists(&email).await? {
            return Err(CredoError::EmailInUse);
        }

        let password_hash = hash_password(password)?;
        let verification_token = Uuid::new_v4().to_string();

        let user = repo
            .create(&NewUser::new(&email, password_hash, &verification_token))
            .await?;

        self.send_verification_mail(&email, &verification_token);

        info!(user_id = user.id, "New user registered");
        Ok(user.id)
    }

    /// Validate an email verification token.
    ///
    /// Returns true and marks the account verified on an exact token
    /// match; returns false on mismatch without mutating state.
    /// Verification is idempotent: repeating the call with the correct
    /// token keeps returning true and never un-verifies.
    pub async fn validate_email_token(&self, email: &str, token: &str) -> Result<bool> {
        let email = email.to_lowercase();
        let repo = UserRepository::new(&self.pool);

        let user = repo
            .get_by_email(&email)
            .await?
            .ok_or(CredoError::InvalidEmail)?;

        if user.verification_token.as_deref() == Some(token) {
            repo.mark_verified(&email).await?;
            info!(user_id = user.id, "Email address verified");
            return Ok(true);
        }

        Ok(false)
    }

    /// Resend the verification mail for an unverified account.
    ///
    /// Silently no-ops when the account is already verified. The
    /// ORIGINAL stored token is resent; tokens are not rotated.
    pub async fn resend_verification(&self, user_id: i64) -> Result<()> {
        let repo = UserRepository::new(&self.pool);

        let user = repo
            .get_by_id(user_id)
            .await?
            .ok_or(CredoError::InvalidUser)?;

        if !user.email_verified {
            if let Some(token) = &user.verification_token {
                self.send_verification_mail(&user.email, token);
            }
        }

        Ok(())
    }

    fn send_verification_mail(&self, email: &str, token: &str) {
        send_detached(
            self.mailer.clone(),
            email.to_string(),
            "Verify your email address".to_string(),
            format!("Verification token: {token}"),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mail::LogMailer;
    use crate::Database;

    async fn setup() -> (Database, RegistrationService) {
        let db = Database::open_in_memory().await.unwrap();
        let service = RegistrationService::new(db.pool().clone(), Arc::new(LogMailer));
        (db, service)
    }

    #[tokio::test]
    async fn test_register_success() {
        let (db, service) = setup().await;

        let user_id = service
            .register("alice@example.com", "password123")
            .await
            .unwrap();

        let repo = UserRepository::new(db.pool());
        let user = repo.get_by_id(user_id).await.unwrap().unwrap();
        assert_eq!(user.email, "alice@example.com");
        assert!(!user.email_verified);
        assert!(user.verification_token.is_some());
        // Stored as Argon2 hash, never plaintext
        assert!(user.password.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let (_db, service) = setup().await;

        service
            .register("bob@example.com", "password123")
            .await
            .unwrap();

        let result = service.register("bob@example.com", "password456").await;
        assert!(matches!(result, Err(CredoError::EmailInUse)));
    }

    #[tokio::test]
    async fn test_register_case_insensitive_duplicate() {
        let (_db, service) = setup().await;

        service
            .register("Foo@Example.com", "password123")
            .await
            .unwrap();

        let result = service.register("foo@example.com", "password456").await;
        assert!(matches!(result, Err(CredoError::EmailInUse)));
    }

    #[tokio::test]
    async fn test_register_stores_lowercased_email() {
        let (db, service) = setup().await;

        let user_id = service
            .register("MixedCase@Example.COM", "password123")
            .await
            .unwrap();

        let repo = UserRepository::new(db.pool());
        let user = repo.get_by_id(user_id).await.unwrap().unwrap();
        assert_eq!(user.email, "mixedcase@example.com");
    }

    #[tokio::test]
    async fn test_validate_email_token_success() {
        let (db, service) = setup().await;

        let user_id = service
            .register("carol@example.com", "password123")
            .await
            .unwrap();

        let repo = UserRepository::new(db.pool());
        let token = repo
            .get_by_id(user_id)
            .await
            .unwrap()
            .unwrap()
            .verification_token
            .unwrap();

        let verified = service
            .validate_email_token("carol@example.com", &token)
            .await
            .unwrap();
        assert!(verified);

        let user = repo.get_by_id(user_id).await.unwrap().unwrap();
        assert!(user.email_verified);
    }

    #[tokio::test]
    async fn test_validate_email_token_is_idempotent() {
        let (db, service) = setup().await;

        let user_id = service
            .register("dave@example.com", "password123")
            .await
            .unwrap();

        let repo = UserRepository::new(db.pool());
        let token = repo
            .get_by_id(user_id)
            .await
            .unwrap()
            .unwrap()
            .verification_token
            .unwrap();

        assert!(service
            .validate_email_token("dave@example.com", &token)
            .await
            .unwrap());
        // Second call with the same token still reports success and
        // does not un-verify
        assert!(service
            .validate_email_token("dave@example.com", &token)
            .await
            .unwrap());

        let user = repo.get_by_id(user_id).await.unwrap().unwrap();
        assert!(user.email_verified);
    }

    #[tokio::test]
    async fn test_validate_email_token_mismatch() {
        let (db, service) = setup().await;

        let user_id = service
            .register("erin@example.com", "password123")
            .await
            .unwrap();

        let verified = service
            .validate_email_token("erin@example.com", "wrong-token")
            .await
            .unwrap();
        assert!(!verified);

        // State unchanged
        let repo = UserRepository::new(db.pool());
        let user = repo.get_by_id(user_id).await.unwrap().unwrap();
        assert!(!user.email_verified);
    }

    #[tokio::test]
    async fn test_validate_email_token_unknown_email() {
        let (_db, service) = setup().await;

        let result = service
            .validate_email_token("nobody@example.com", "token")
            .await;
        assert!(matches!(result, Err(CredoError::InvalidEmail)));
    }

    #[tokio::test]
    async fn test_resend_verification_unknown_user() {
        let (_db, service) = setup().await;

        let result = service.resend_verification(9999).await;
        assert!(matches!(result, Err(CredoError::InvalidUser)));
    }

    #[tokio::test]
    async fn test_resend_verification_noop_when_verified() {
        let (db, service) = setup().await;

        let user_id = service
            .register("frank@example.com", "password123")
            .await
            .unwrap();

        let repo = UserRepository::new(db.pool());
        let token = repo
            .get_by_id(user_id)
            .await
            .unwrap()
            .unwrap()
            .verification_token
            .unwrap();
        service
            .validate_email_token("frank@example.com", &token)
            .await
            .unwrap();

        // Already verified: succeeds without doing anything
        service.resend_verification(user_id).await.unwrap();
    }

    #[tokio::test]
    async fn test_resend_keeps_original_token() {
        let (db, service) = setup().await;

        let user_id = service
            .register("grace@example.com", "password123")
            .await
            .unwrap();

        let repo = UserRepository::new(db.pool());
        let before = repo
            .get_by_id(user_id)
            .await
            .unwrap()
            .unwrap()
            .verification_token;

        service.resend_verification(user_id).await.unwrap();

        let after = repo
            .get_by_id(user_id)
            .await
            .unwrap()
            .unwrap()
            .verification_token;
        assert_eq!(before, after);
    }
}
