//! Credo - user-identity backend.
//!
//! Account registration with email verification, Argon2 password
//! hashing with change/reset flows, JWT access/refresh token issuance
//! with claims snapshots, and admin/super-admin authorization.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod mail;
pub mod web;

pub use auth::{
    hash_password, resolve_claims, verify_password, ClaimsService, RegistrationService,
    SessionService, TokenIssuer, TokenPair, UserClaims,
};
pub use config::Config;
pub use db::{Database, NewUser, User, UserRepository};
pub use error::{CredoError, Result};
pub use web::{ApiError, WebServer};
