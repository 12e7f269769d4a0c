//! Router configuration for the Web API.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{
    change_password, list_claims, login, refresh, register, request_password_reset,
    resend_verification, reset_password, update_claims, validate_email, AppState,
};
use super::middleware::{create_cors_layer, jwt_auth, JwtState};
use crate::web::dto::{ClaimsEntryResponse, UpdateClaimsRequest};

/// Create the main API router.
pub fn create_router(
    app_state: Arc<AppState>,
    jwt_state: Arc<JwtState>,
    cors_origins: &[String],
) -> Router {
    // Auth routes (no authentication required)
    let auth_public_routes = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/validate-email", post(validate_email))
        .route("/request-password-reset", post(request_password_reset))
        .route("/reset-password", post(reset_password));

    // Auth routes (authentication required)
    let auth_protected_routes = Router::new()
        .route("/resend-verification", post(resend_verification))
        .route("/change-password", post(change_password));

    let auth_routes = Router::new()
        .merge(auth_public_routes)
        .merge(auth_protected_routes);

    // Claims management (super-admin only, enforced by the guard extractors)
    let management_routes = Router::new().route("/claims", get(list_claims).put(update_claims));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/management", management_routes);

    // Clone jwt_state for the middleware closure
    let jwt_state_for_middleware = jwt_state.clone();

    Router::new()
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(middleware::from_fn(move |req, next| {
                    let state = jwt_state_for_middleware.clone();
                    jwt_auth(state, req, next)
                })),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

/// OpenAPI documentation for the management surface.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::handlers::claims::list_claims,
        crate::web::handlers::claims::update_claims,
    ),
    components(schemas(UpdateClaimsRequest, ClaimsEntryResponse)),
    modifiers(&SecurityAddon),
    tags((name = "management", description = "Super-admin claims management"))
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the Swagger UI router.
pub fn create_swagger_router() -> Router {
    SwaggerUi::new("/docs")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into()
}
