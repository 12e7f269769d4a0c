//! Web API Claims Management Tests
//!
//! Integration tests for the super-admin claims endpoints and the
//! token-time claims snapshot semantics.

use axum::http::StatusCode;
use axum_test::TestServer;
use credo::web::handlers::AppState;
use credo::web::middleware::JwtState;
use credo::web::router::create_router;
use credo::{ClaimsService, Database, TokenIssuer};
use serde_json::{json, Value};
use std::sync::Arc;

const TEST_JWT_SECRET: &str = "test-secret-key-for-testing-only";

/// Create a test server with an in-memory database.
async fn create_test_server() -> (TestServer, Database) {
    let db = Database::open_in_memory()
        .await
        .expect("Failed to create test database");

    let issuer = Arc::new(TokenIssuer::new(TEST_JWT_SECRET, 900, 30));
    let app_state = Arc::new(AppState::new(
        &db,
        issuer.clone(),
        Arc::new(credo::mail::LogMailer),
    ));
    let jwt_state = Arc::new(JwtState::new(issuer));

    let router = create_router(app_state, jwt_state, &[]);
    let server = TestServer::new(router).expect("Failed to create test server");

    (server, db)
}

async fn register_user(server: &TestServer, email: &str, password: &str) -> i64 {
    let response = server
        .post("/api/auth/register")
        .json(&json!({ "email": email, "password": password }))
        .await;

    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["data"]["user_id"].as_i64().unwrap()
}

async fn access_token(server: &TestServer, email: &str, password: &str) -> String {
    let body = server
        .post("/api/auth/login")
        .json(&json!({ "email": email, "password": password }))
        .await
        .json::<Value>();
    body["data"]["access_token"].as_str().unwrap().to_string()
}

/// Seed a super-admin directly through the claims service, the way an
/// operator bootstraps the first privileged account.
async fn grant_super_admin(db: &Database, user_id: i64) {
    ClaimsService::new(db.pool().clone())
        .update_claims(user_id, true, true, user_id)
        .await
        .unwrap();
}

// ============================================================================
// Guard enforcement
// ============================================================================

#[tokio::test]
async fn test_claims_list_requires_auth() {
    let (server, _db) = create_test_server().await;

    let response = server.get("/api/management/claims").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_claims_list_forbidden_for_plain_user() {
    let (server, _db) = create_test_server().await;

    register_user(&server, "user@example.com", "password123").await;
    let token = access_token(&server, "user@example.com", "password123").await;

    let response = server
        .get("/api/management/claims")
        .authorization_bearer(&token)
        .await;

    response.assert_status(StatusCode::FORBIDDEN);

    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "FORBIDDEN");
}

#[tokio::test]
async fn test_claims_update_forbidden_for_admin_without_super_admin() {
    let (server, db) = create_test_server().await;

    let root_id = register_user(&server, "root@example.com", "password123").await;
    let admin_id = register_user(&server, "admin@example.com", "password123").await;

    // Plain admin, not super-admin
    ClaimsService::new(db.pool().clone())
        .update_claims(admin_id, true, false, root_id)
        .await
        .unwrap();

    let token = access_token(&server, "admin@example.com", "password123").await;

    let response = server
        .put("/api/management/claims")
        .authorization_bearer(&token)
        .json(&json!({
            "user_id": admin_id,
            "is_admin": true,
            "is_super_admin": true
        }))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
}

// ============================================================================
// Super-admin operations
// ============================================================================

#[tokio::test]
async fn test_super_admin_updates_and_lists_claims() {
    let (server, db) = create_test_server().await;

    let root_id = register_user(&server, "root@example.com", "password123").await;
    let user_id = register_user(&server, "user@example.com", "password123").await;
    grant_super_admin(&db, root_id).await;

    // Token issued AFTER the grant carries the super-admin claim
    let token = access_token(&server, "root@example.com", "password123").await;

    let response = server
        .put("/api/management/claims")
        .authorization_bearer(&token)
        .json(&json!({
            "user_id": user_id,
            "is_admin": true,
            "is_super_admin": false
        }))
        .await;

    response.assert_status_ok();

    let response = server
        .get("/api/management/claims")
        .authorization_bearer(&token)
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let entries = body["data"].as_array().unwrap();
    assert_eq!(entries.len(), 2);

    let entry = entries
        .iter()
        .find(|e| e["user_id"] == user_id)
        .expect("updated user in listing");
    assert_eq!(entry["is_admin"], true);
    assert_eq!(entry["is_super_admin"], false);
    // The editor is recorded
    assert_eq!(entry["last_modified_by"], root_id);
}

#[tokio::test]
async fn test_update_claims_unknown_target_user() {
    let (server, db) = create_test_server().await;

    let root_id = register_user(&server, "root@example.com", "password123").await;
    grant_super_admin(&db, root_id).await;
    let token = access_token(&server, "root@example.com", "password123").await;

    let response = server
        .put("/api/management/claims")
        .authorization_bearer(&token)
        .json(&json!({
            "user_id": 9999,
            "is_admin": true,
            "is_super_admin": false
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

// ============================================================================
// Snapshot semantics
// ============================================================================

#[tokio::test]
async fn test_old_token_does_not_gain_new_claims() {
    let (server, db) = create_test_server().await;

    let root_id = register_user(&server, "root@example.com", "password123").await;
    let user_id = register_user(&server, "user@example.com", "password123").await;
    grant_super_admin(&db, root_id).await;

    // Token issued BEFORE the grant
    let stale_token = access_token(&server, "user@example.com", "password123").await;

    ClaimsService::new(db.pool().clone())
        .update_claims(user_id, true, true, root_id)
        .await
        .unwrap();

    // The pre-grant token is a snapshot; it does not pick up the new claims
    let response = server
        .get("/api/management/claims")
        .authorization_bearer(&stale_token)
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    // A freshly issued token does
    let fresh_token = access_token(&server, "user@example.com", "password123").await;
    let response = server
        .get("/api/management/claims")
        .authorization_bearer(&fresh_token)
        .await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_self_revocation_keeps_current_token_working() {
    let (server, db) = create_test_server().await;

    let root_id = register_user(&server, "root@example.com", "password123").await;
    grant_super_admin(&db, root_id).await;
    let token = access_token(&server, "root@example.com", "password123").await;

    // Super-admin revokes their own privileges
    let response = server
        .put("/api/management/claims")
        .authorization_bearer(&token)
        .json(&json!({
            "user_id": root_id,
            "is_admin": false,
            "is_super_admin": false
        }))
        .await;
    response.assert_status_ok();

    // The in-flight token keeps its snapshot until natural expiry
    let response = server
        .get("/api/management/claims")
        .authorization_bearer(&token)
        .await;
    response.assert_status_ok();

    // But the next issued token reflects the revocation
    let new_token = access_token(&server, "root@example.com", "password123").await;
    let response = server
        .get("/api/management/claims")
        .authorization_bearer(&new_token)
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_refresh_picks_up_claims_changes() {
    let (server, db) = create_test_server().await;

    let root_id = register_user(&server, "root@example.com", "password123").await;
    let user_id = register_user(&server, "user@example.com", "password123").await;
    grant_super_admin(&db, root_id).await;

    let login = server
        .post("/api/auth/login")
        .json(&json!({ "email": "user@example.com", "password": "password123" }))
        .await
        .json::<Value>();
    let refresh_token = login["data"]["refresh_token"].as_str().unwrap();

    // Grant admin after the login
    ClaimsService::new(db.pool().clone())
        .update_claims(user_id, true, false, root_id)
        .await
        .unwrap();

    // A refreshed access token re-resolves claims at refresh time
    let refreshed = server
        .post("/api/auth/refresh")
        .json(&json!({ "refresh_token": refresh_token }))
        .await
        .json::<Value>();

    let issuer = TokenIssuer::new(TEST_JWT_SECRET, 900, 30);
    let access = issuer
        .decode_access(refreshed["data"]["access_token"].as_str().unwrap())
        .unwrap();
    assert!(access.is_admin);
    assert!(!access.fresh);
}
