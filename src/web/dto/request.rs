//! Request DTOs for the Web API.

use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

/// Registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address.
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    /// Password.
    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,
}

/// Login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email address.
    pub email: String,
    /// Password.
    pub password: String,
}

/// Token refresh request.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token.
    pub refresh_token: String,
}

/// Email verification request.
#[derive(Debug, Deserialize, Validate)]
pub struct ValidateEmailRequest {
    /// Email address.
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    /// Verification token from the verification mail.
    #[validate(length(min = 1, message = "Verification token is required"))]
    pub verification_token: String,
}

/// Password reset request (step 1: send the reset mail).
#[derive(Debug, Deserialize, Validate)]
pub struct RequestPasswordResetRequest {
    /// Email address.
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
}

/// Password reset (step 2: redeem the token).
#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    /// User ID the reset token was issued for.
    pub user_id: i64,
    /// Reset token from the reset mail.
    #[validate(length(min = 1, message = "Reset token is required"))]
    pub token: String,
    /// New password.
    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub new_password: String,
}

/// Password change request for a logged-in user.
#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    /// Current password.
    #[validate(length(min = 1, message = "Existing password is required"))]
    pub existing_password: String,
    /// New password.
    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub new_password: String,
}

/// Claims update request (super-admin only).
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateClaimsRequest {
    /// User whose claims are updated.
    pub user_id: i64,
    /// Admin flag.
    pub is_admin: bool,
    /// Super-admin flag.
    pub is_super_admin: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_validation() {
        let valid = RegisterRequest {
            email: "user@example.com".to_string(),
            password: "password123".to_string(),
        };
        assert!(valid.validate().is_ok());

        let bad_email = RegisterRequest {
            email: "not-an-email".to_string(),
            password: "password123".to_string(),
        };
        assert!(bad_email.validate().is_err());

        let short_password = RegisterRequest {
            email: "user@example.com".to_string(),
            password: "short".to_string(),
        };
        assert!(short_password.validate().is_err());
    }

    #[test]
    fn test_reset_password_request_validation() {
        let valid = ResetPasswordRequest {
            user_id: 1,
            token: "abc".to_string(),
            new_password: "password123".to_string(),
        };
        assert!(valid.validate().is_ok());

        let empty_token = ResetPasswordRequest {
            user_id: 1,
            token: String::new(),
            new_password: "password123".to_string(),
        };
        assert!(empty_token.validate().is_err());
    }
}
