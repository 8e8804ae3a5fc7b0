use crate::auth::CredentialError;
use bcrypt::{hash, verify};

/// bcrypt work factor used for every stored password.
pub const HASH_COST: u32 = 10;

/// Hashes `password` with a fresh salt. Blocking and CPU-bound.
pub fn hash_password(password: &str) -> Result<String, CredentialError> {
    hash(password, HASH_COST).map_err(|e| CredentialError::HashFailure(e.to_string()))
}

/// Checks `password` against a stored bcrypt hash.
///
/// A stored hash that cannot be parsed counts as a mismatch.
pub fn verify_password(password: &str, hashed_password: &str) -> bool {
    verify(password, hashed_password).unwrap_or_else(|e| {
        log::warn!("stored password hash could not be verified: {}", e);
        false
    })
}
