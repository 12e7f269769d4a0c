//! Claims management handlers (super-admin only).

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::web::dto::{ApiResponse, ClaimsEntryResponse, UpdateClaimsRequest};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::SuperAdminUser;

/// GET /api/management/claims - List all stored claims rows.
#[utoipa::path(
    get,
    path = "/management/claims",
    tag = "management",
    responses(
        (status = 200, description = "All claims rows", body = Vec<ClaimsEntryResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Super-admin access required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_claims(
    State(state): State<Arc<AppState>>,
    SuperAdminUser(_claims): SuperAdminUser,
) -> Result<Json<ApiResponse<Vec<ClaimsEntryResponse>>>, ApiError> {
    let entries = state
        .claims
        .list_claims()
        .await?
        .into_iter()
        .map(ClaimsEntryResponse::from)
        .collect();

    Ok(Json(ApiResponse::new(entries)))
}

/// PUT /api/management/claims - Set a user's admin/super-admin flags.
#[utoipa::path(
    put,
    path = "/management/claims",
    tag = "management",
    request_body = UpdateClaimsRequest,
    responses(
        (status = 200, description = "Claims updated"),
        (status = 400, description = "Unknown target user"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Super-admin access required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_claims(
    State(state): State<Arc<AppState>>,
    SuperAdminUser(claims): SuperAdminUser,
    Json(req): Json<UpdateClaimsRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state
        .claims
        .update_claims(req.user_id, req.is_admin, req.is_super_admin, claims.sub)
        .await?;

    Ok(Json(ApiResponse::new(())))
}
