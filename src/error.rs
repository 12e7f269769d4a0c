//! Error types for Credo.

use thiserror::Error;

/// Common error type for Credo.
#[derive(Error, Debug)]
pub enum CredoError {
    /// Database error.
    ///
    /// This is a generic database error that wraps errors from any database backend.
    /// Database errors from sqlx are automatically converted.
    #[error("database error: {0}")]
    Database(String),

    /// Store-level constraint violation (e.g. a duplicate-insert race slipping
    /// past the explicit existence check).
    #[error("integrity error: {0}")]
    Integrity(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Email address already used by another account.
    #[error("email address already used by another account")]
    EmailInUse,

    /// Login failed. The message is identical for an unknown email and a
    /// wrong password so callers cannot enumerate accounts.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Password reset token did not match, has expired, or was already
    /// consumed. The three cases are indistinguishable to the caller.
    #[error("invalid password reset token")]
    InvalidResetToken,

    /// Referenced user id does not resolve to an account.
    #[error("invalid user")]
    InvalidUser,

    /// Referenced email address does not resolve to an account.
    #[error("invalid email address")]
    InvalidEmail,

    /// Existing password check failed during a password change.
    #[error("existing password incorrect")]
    IncorrectPassword,

    /// Authorization denial (missing admin / super-admin claim).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Token encoding/decoding error.
    #[error("token error: {0}")]
    Token(String),

    /// Password hashing error.
    #[error("password hash error: {0}")]
    Hash(String),

    /// Mail delivery error. Always swallowed and logged by the caller,
    /// never propagated out of a primary operation.
    #[error("mail error: {0}")]
    Mail(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

// Conversion from sqlx errors
impl From<sqlx::Error> for CredoError {
    fn from(e: sqlx::Error) -> Self {
        CredoError::Database(e.to_string())
    }
}

/// Result type alias for Credo operations.
pub type Result<T> = std::result::Result<T, CredoError>;
