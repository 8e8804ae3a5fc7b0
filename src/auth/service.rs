//! The credential service: password hashing and bearer-token issuance.
//!
//! Built once at startup from the configured secret and shared by the auth
//! middleware and the registration/login handlers.

use actix_web::web;

use crate::auth::password;
use crate::auth::token::{TokenError, TokenKeys, TokenSubject};
use crate::auth::CredentialError;

#[derive(Clone)]
pub struct CredentialService {
    keys: TokenKeys,
}

impl CredentialService {
    /// Fails with [`CredentialError::SignFailure`] when `secret` is empty.
    pub fn new(secret: &str) -> Result<Self, CredentialError> {
        Ok(Self {
            keys: TokenKeys::new(secret)?,
        })
    }

    /// Hashes on the blocking thread pool so a slow hash does not hold up a worker.
    pub async fn hash_password(&self, plaintext: String) -> Result<String, CredentialError> {
        web::block(move || password::hash_password(&plaintext))
            .await
            .map_err(|e| CredentialError::HashFailure(e.to_string()))?
    }

    pub async fn verify_password(&self, plaintext: String, hash: String) -> bool {
        match web::block(move || password::verify_password(&plaintext, &hash)).await {
            Ok(matches) => matches,
            Err(e) => {
                log::error!("password verification task failed: {}", e);
                false
            }
        }
    }

    pub fn issue_token(&self, subject_id: i32, email: &str) -> Result<String, CredentialError> {
        self.keys.issue(subject_id, email)
    }

    pub fn verify_token(&self, token: &str) -> Result<TokenSubject, TokenError> {
        self.keys.verify(token)
    }

    #[cfg(test)]
    pub(crate) fn keys(&self) -> &TokenKeys {
        &self.keys
    }
}
