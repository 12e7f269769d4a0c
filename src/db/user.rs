//! User model for Credo.

/// User entity representing a registered account.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (assigned by the store).
    pub id: i64,
    /// Email address (unique, stored lowercase).
    pub email: String,
    /// Password hash (Argon2).
    pub password: String,
    /// Whether the email address has been verified.
    pub email_verified: bool,
    /// Email verification token, present while unverified.
    pub verification_token: Option<String>,
    /// Account creation timestamp (UTC).
    pub created_at: String,
    /// Last modification timestamp (UTC).
    pub last_modified_at: String,
}

/// Data for creating a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Email address (must already be lowercased by the caller).
    pub email: String,
    /// Password hash (pre-hashed with Argon2).
    pub password: String,
    /// Email verification token.
    pub verification_token: String,
}

impl NewUser {
    /// Create a new user record.
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        verification_token: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            verification_token: verification_token.into(),
        }
    }
}
