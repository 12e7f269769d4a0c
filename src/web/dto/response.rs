//! Response DTOs for the Web API.

use serde::Serialize;
use utoipa::ToSchema;

use crate::db::ClaimsRecord;

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Registration response.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    /// ID assigned to the new account.
    pub user_id: i64,
    /// Always true on success.
    pub created: bool,
}

/// Login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Access token (JWT).
    pub access_token: String,
    /// Refresh token (JWT).
    pub refresh_token: String,
    /// Access token expiry in seconds.
    pub expires_in: u64,
}

/// Token refresh response.
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// New access token, marked non-fresh.
    pub access_token: String,
    /// User the token was issued for.
    pub user_id: i64,
    /// Access token expiry in seconds.
    pub expires_in: u64,
}

/// Email verification response.
#[derive(Debug, Serialize)]
pub struct ValidateEmailResponse {
    /// Whether the token matched and the address is now verified.
    pub verified: bool,
}

/// One claims row in the management listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct ClaimsEntryResponse {
    /// User the claims apply to.
    pub user_id: i64,
    /// Admin flag.
    pub is_admin: bool,
    /// Super-admin flag.
    pub is_super_admin: bool,
    /// Editor who last changed this row.
    pub last_modified_by: i64,
    /// Last modification timestamp (UTC).
    pub last_modified_at: String,
}

impl From<ClaimsRecord> for ClaimsEntryResponse {
    fn from(record: ClaimsRecord) -> Self {
        Self {
            user_id: record.user_id,
            is_admin: record.is_admin,
            is_super_admin: record.is_super_admin,
            last_modified_by: record.last_modified_by,
            last_modified_at: record.last_modified_at,
        }
    }
}
