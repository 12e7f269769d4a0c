//! Authorization claims resolution and management.
//!
//! Claims are resolved from the store at token-issuance time and
//! embedded in the access token as a point-in-time snapshot. They are
//! deliberately NOT re-resolved per request; a privilege change takes
//! effect on the next issued token.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::db::{ClaimsRecord, ClaimsRepository, DbPool, UserRepository};
use crate::{CredoError, Result};

/// A user's authorization claims at a point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserClaims {
    /// Admin flag.
    pub is_admin: bool,
    /// Super-admin flag.
    pub is_super_admin: bool,
    /// Whether the account's email address is verified.
    pub is_email_verified: bool,
}

/// Resolve a user's current claims from the store.
///
/// Absence of a claims row means no privileges (default-deny), never an
/// error: issuance must not fail for ordinary users. An unknown user id
/// likewise resolves to all-false.
pub async fn resolve_claims(pool: &DbPool, user_id: i64) -> Result<UserClaims> {
    let record = ClaimsRepository::new(pool).get_by_user(user_id).await?;
    let (is_admin, is_super_admin) = match record {
        Some(r) => (r.is_admin, r.is_super_admin),
        None => (false, false),
    };

    let is_email_verified = UserRepository::new(pool)
        .get_by_id(user_id)
        .await?
        .map(|u| u.email_verified)
        .unwrap_or(false);

    Ok(UserClaims {
        is_admin,
        is_super_admin,
        is_email_verified,
    })
}

/// Claims management operations.
///
/// Callers are expected to have passed the super-admin gate already;
/// this service records who made each change but does not authorize.
pub struct ClaimsService {
    pool: DbPool,
}

impl ClaimsService {
    /// Create a new claims service over the given pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Set a user's admin/super-admin flags, recording the editor.
    pub async fn update_claims(
        &self,
        user_id: i64,
        is_admin: bool,
        is_super_admin: bool,
        updated_by: i64,
    ) -> Result<()> {
        let repo = ClaimsRepository::new(&self.pool);
        repo.upsert(user_id, is_admin, is_super_admin, updated_by)
            .await
            .map_err(|e| match e {
                // The store reports an unknown target user as an integrity error
                CredoError::Integrity(_) => CredoError::InvalidUser,
                other => other,
            })?;

        info!(
            user_id,
            is_admin, is_super_admin, updated_by, "Claims updated"
        );
        Ok(())
    }

    /// List every stored claims row.
    pub async fn list_claims(&self) -> Result<Vec<ClaimsRecord>> {
        ClaimsRepository::new(&self.pool).list_all().await
    }
}
