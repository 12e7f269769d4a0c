//! Authentication module for Credo.
//!
//! This module provides password hashing, session-token issuance,
//! claims resolution, registration, and the password workflows.

mod claims;
mod password;
mod registration;
mod session;
mod token;

pub use claims::{resolve_claims, ClaimsService, UserClaims};
pub use password::{hash_password, verify_password};
pub use registration::RegistrationService;
pub use session::{SessionService, TokenPair, RESET_TOKEN_VALIDITY_MINUTES};
pub use token::{
    AccessClaims, RefreshClaims, TokenIssuer, TOKEN_USE_ACCESS, TOKEN_USE_REFRESH,
};
