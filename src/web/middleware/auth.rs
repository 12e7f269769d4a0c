//! JWT authentication middleware and authorization guards.
//!
//! Guards are explicit extractor objects composed around handlers:
//! [`AuthUser`] requires a valid access token, [`AdminUser`] and
//! [`SuperAdminUser`] additionally require the matching claim from the
//! token's snapshot. Claims are read from the presented token only and
//! are never re-resolved from the store at call time.

use std::sync::Arc;

use axum::{
    async_trait,
    body::Body,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, Request},
    middleware::Next,
    response::Response,
};

use crate::auth::{AccessClaims, TokenIssuer};
use crate::web::error::ApiError;

/// Application state for JWT authentication.
#[derive(Clone)]
pub struct JwtState {
    /// Token issuer used to decode and validate presented tokens.
    pub issuer: Arc<TokenIssuer>,
}

impl JwtState {
    /// Create a new JWT state around the issuer.
    pub fn new(issuer: Arc<TokenIssuer>) -> Self {
        Self { issuer }
    }
}

/// Pull the bearer token out of the Authorization header.
fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(|t| t.to_string())
}

/// Extractor for authenticated users.
///
/// The handler receives the access token's claims if the token is valid.
#[derive(Debug, Clone)]
pub struct AuthUser(pub AccessClaims);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token =
            bearer_token(parts).ok_or_else(|| ApiError::unauthorized("Missing authorization"))?;

        // Get JWT state from extensions (set by middleware)
        let jwt_state = parts
            .extensions
            .get::<Arc<JwtState>>()
            .ok_or_else(|| ApiError::internal("JWT state not configured"))?;

        let claims = jwt_state.issuer.decode_access(&token).map_err(|e| {
            tracing::debug!("Access token validation failed: {}", e);
            ApiError::unauthorized("Invalid or expired token")
        })?;

        Ok(AuthUser(claims))
    }
}

/// Guard requiring the admin claim on the presented access token.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AccessClaims);

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(claims) = AuthUser::from_request_parts(parts, state).await?;
        if !claims.is_admin {
            return Err(ApiError::forbidden("Admin only endpoint"));
        }
        Ok(AdminUser(claims))
    }
}

/// Guard requiring the super-admin claim on the presented access token.
#[derive(Debug, Clone)]
pub struct SuperAdminUser(pub AccessClaims);

#[async_trait]
impl<S> FromRequestParts<S> for SuperAdminUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(claims) = AuthUser::from_request_parts(parts, state).await?;
        if !claims.is_super_admin {
            return Err(ApiError::forbidden("Super-admin only endpoint"));
        }
        Ok(SuperAdminUser(claims))
    }
}

/// Middleware function to inject JWT state into request extensions.
pub async fn jwt_auth(jwt_state: Arc<JwtState>, mut request: Request<Body>, next: Next) -> Response {
    request.extensions_mut().insert(jwt_state);
    next.run(request).await
}
