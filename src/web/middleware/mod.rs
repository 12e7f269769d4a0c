//! Middleware for the Web API.

pub mod auth;
pub mod cors;

pub use auth::{jwt_auth, AdminUser, AuthUser, JwtState, SuperAdminUser};
pub use cors::create_cors_layer;
