//! Password hashing and verification for Credo.
//!
//! Uses Argon2id, a deliberately slow salted hash. Verification runs in
//! constant time with respect to the candidate password. Plaintext
//! passwords never appear in logs, errors, or the store.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, Params,
};
use rand_core::OsRng;

use crate::{CredoError, Result};

/// Create the Argon2 hasher with recommended parameters.
///
/// Parameters:
/// - Memory cost: 64 MB (65536 KiB)
/// - Time cost: 3 iterations
/// - Parallelism: 4 threads
fn create_argon2() -> Argon2<'static> {
    let params = Params::new(65536, 3, 4, None).expect("valid Argon2 params");
    Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params)
}

/// Hash a password using Argon2id.
///
/// Returns a PHC-formatted hash string embedding the salt and parameters.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = create_argon2()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| CredoError::Hash(e.to_string()))?;

    Ok(hash.to_string())
}

/// Verify a password against a stored hash.
///
/// Returns `Ok(false)` for a wrong password. A malformed stored hash is
/// an error, not a mismatch; callers decide how to surface it.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| CredoError::Hash("invalid password hash format".to_string()))?;

    // Parameters are taken from the parsed hash, not from create_argon2()
    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(CredoError::Hash(e.to_string())),
    }
}
