//! API handlers for the Web API.

pub mod auth;
pub mod claims;

pub use auth::*;
pub use claims::*;
