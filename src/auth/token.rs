//! Session token issuance and decoding.
//!
//! Access tokens are short-lived and carry identity, a freshness flag,
//! and the authorization claims snapshot resolved at issuance time.
//! Refresh tokens are long-lived, carry identity only, and can never be
//! presented as access tokens (and vice versa).

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::auth::claims::UserClaims;
use crate::{CredoError, Result};

/// `token_use` value for access tokens.
pub const TOKEN_USE_ACCESS: &str = "access";

/// `token_use` value for refresh tokens.
pub const TOKEN_USE_REFRESH: &str = "refresh";

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (user ID).
    pub sub: i64,
    /// True when issued by direct login, false when issued via refresh.
    pub fresh: bool,
    /// Email-verified claim at issuance time.
    pub email_verified: bool,
    /// Admin claim at issuance time.
    pub is_admin: bool,
    /// Super-admin claim at issuance time.
    pub is_super_admin: bool,
    /// Issued at timestamp.
    pub iat: u64,
    /// Expiration timestamp.
    pub exp: u64,
    /// JWT ID (unique identifier).
    pub jti: String,
    /// Token type marker.
    pub token_use: String,
}

impl AccessClaims {
    /// The authorization claims snapshot embedded in this token.
    pub fn claims(&self) -> UserClaims {
        UserClaims {
            is_admin: self.is_admin,
            is_super_admin: self.is_super_admin,
            is_email_verified: self.email_verified,
        }
    }
}

/// Claims carried by a refresh token. Identity only, no authorization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// Subject (user ID).
    pub sub: i64,
    /// Issued at timestamp.
    pub iat: u64,
    /// Expiration timestamp.
    pub exp: u64,
    /// JWT ID (unique identifier).
    pub jti: String,
    /// Token type marker.
    pub token_use: String,
}

/// Issues and decodes signed session tokens.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_expiry_secs: u64,
    refresh_expiry_days: u64,
}

impl TokenIssuer {
    /// Create an issuer from the signing secret and expiry settings.
    pub fn new(secret: &str, access_expiry_secs: u64, refresh_expiry_days: u64) -> Self {
        let mut validation = Validation::default();
        validation.validate_exp = true;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            access_expiry_secs,
            refresh_expiry_days,
        }
    }

    /// Access token expiry in seconds.
    pub fn access_expiry_secs(&self) -> u64 {
        self.access_expiry_secs
    }

    /// Issue an access token embedding the given claims snapshot.
    pub fn issue_access_token(
        &self,
        user_id: i64,
        claims: &UserClaims,
        fresh: bool,
    ) -> Result<String> {
        let now = chrono::Utc::now().timestamp() as u64;
        let token_claims = AccessClaims {
            sub: user_id,
            fresh,
            email_verified: claims.is_email_verified,
            is_admin: claims.is_admin,
            is_super_admin: claims.is_super_admin,
            iat: now,
            exp: now + self.access_expiry_secs,
            jti: uuid::Uuid::new_v4().to_string(),
            token_use: TOKEN_USE_ACCESS.to_string(),
        };

        encode(&Header::default(), &token_claims, &self.encoding_key)
            .map_err(|e| CredoError::Token(e.to_string()))
    }

    /// Issue a refresh token for the given user.
    pub fn issue_refresh_token(&self, user_id: i64) -> Result<String> {
        let now = chrono::Utc::now().timestamp() as u64;
        let token_claims = RefreshClaims {
            sub: user_id,
            iat: now,
            exp: now + self.refresh_expiry_days * 24 * 3600,
            jti: uuid::Uuid::new_v4().to_string(),
            token_use: TOKEN_USE_REFRESH.to_string(),
        };

        encode(&Header::default(), &token_claims, &self.encoding_key)
            .map_err(|e| CredoError::Token(e.to_string()))
    }

    /// Decode and validate an access token.
    pub fn decode_access(&self, token: &str) -> Result<AccessClaims> {
        let data = decode::<AccessClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| CredoError::Token(e.to_string()))?;

        if data.claims.token_use != TOKEN_USE_ACCESS {
            return Err(CredoError::Token("not an access token".to_string()));
        }

        Ok(data.claims)
    }

    /// Decode and validate a refresh token.
    pub fn decode_refresh(&self, token: &str) -> Result<RefreshClaims> {
        let data = decode::<RefreshClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| CredoError::Token(e.to_string()))?;

        if data.claims.token_use != TOKEN_USE_REFRESH {
            return Err(CredoError::Token("not a refresh token".to_string()));
        }

        Ok(data.claims)
    }
}
