//! Authentication handlers.

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::auth::{ClaimsService, RegistrationService, SessionService, TokenIssuer};
use crate::db::Database;
use crate::mail::Mailer;
use crate::web::dto::{
    ApiResponse, ChangePasswordRequest, LoginRequest, LoginResponse, RefreshRequest,
    RefreshResponse, RegisterRequest, RegisterResponse, RequestPasswordResetRequest,
    ResetPasswordRequest, ValidateEmailRequest, ValidateEmailResponse, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::middleware::AuthUser;

/// Application state shared across handlers.
pub struct AppState {
    /// Registration and email verification.
    pub registration: RegistrationService,
    /// Login, refresh, and password workflows.
    pub sessions: SessionService,
    /// Claims management.
    pub claims: ClaimsService,
    /// Token issuer (also used to decode refresh tokens).
    pub issuer: Arc<TokenIssuer>,
}

impl AppState {
    /// Wire up the services over one database and mailer.
    pub fn new(db: &Database, issuer: Arc<TokenIssuer>, mailer: Arc<dyn Mailer>) -> Self {
        let pool = db.pool().clone();
        Self {
            registration: RegistrationService::new(pool.clone(), mailer.clone()),
            sessions: SessionService::new(pool.clone(), issuer.clone(), mailer),
            claims: ClaimsService::new(pool),
            issuer,
        }
    }
}

/// POST /api/auth/register - Create a new account.
pub async fn register(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RegisterResponse>>), ApiError> {
    let user_id = state.registration.register(&req.email, &req.password).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(RegisterResponse {
            user_id,
            created: true,
        })),
    ))
}

/// POST /api/auth/login - Authenticate and issue a token pair.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    if req.email.is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let pair = state.sessions.login(&req.email, &req.password).await?;

    Ok(Json(ApiResponse::new(LoginResponse {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        expires_in: state.issuer.access_expiry_secs(),
    })))
}

/// POST /api/auth/refresh - Re-issue an access token from a refresh token.
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<ApiResponse<RefreshResponse>>, ApiError> {
    let claims = state.issuer.decode_refresh(&req.refresh_token).map_err(|e| {
        tracing::debug!("Refresh token validation failed: {}", e);
        ApiError::unauthorized("Invalid or expired refresh token")
    })?;

    let access_token = state.sessions.refresh(claims.sub).await?;

    Ok(Json(ApiResponse::new(RefreshResponse {
        access_token,
        user_id: claims.sub,
        expires_in: state.issuer.access_expiry_secs(),
    })))
}

/// POST /api/auth/validate-email - Redeem an email verification token.
pub async fn validate_email(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<ValidateEmailRequest>,
) -> Result<Json<ApiResponse<ValidateEmailResponse>>, ApiError> {
    let verified = state
        .registration
        .validate_email_token(&req.email, &req.verification_token)
        .await?;

    Ok(Json(ApiResponse::new(ValidateEmailResponse { verified })))
}

/// POST /api/auth/resend-verification - Resend the verification mail.
pub async fn resend_verification(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.registration.resend_verification(claims.sub).await?;

    Ok(Json(ApiResponse::new(())))
}

/// POST /api/auth/request-password-reset - Send a reset token by mail.
///
/// Always responds 200, whether or not the email is registered.
pub async fn request_password_reset(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<RequestPasswordResetRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.sessions.request_password_reset(&req.email).await?;

    Ok(Json(ApiResponse::new(())))
}

/// POST /api/auth/reset-password - Redeem a reset token.
pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<ResetPasswordRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state
        .sessions
        .reset_password(req.user_id, &req.token, &req.new_password)
        .await?;

    Ok(Json(ApiResponse::new(())))
}

/// POST /api/auth/change-password - Change the logged-in user's password.
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    ValidatedJson(req): ValidatedJson<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state
        .sessions
        .change_password(claims.sub, &req.existing_password, &req.new_password)
        .await?;

    Ok(Json(ApiResponse::new(())))
}
