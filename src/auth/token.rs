use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::auth::CredentialError;

/// Lifetime of an issued token. Tokens are never renewed.
pub const TOKEN_TTL_SECS: i64 = 60 * 60;

/// Represents the claims encoded within a JWT (JSON Web Token).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject of the token, the user's id.
    pub sub: i32,
    pub email: String,
    /// Issued at (seconds since epoch).
    pub iat: i64,
    /// Expiration (seconds since epoch).
    pub exp: i64,
}

/// The identity a successfully verified token speaks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSubject {
    pub subject_id: i32,
    pub email: String,
}

/// Why a token was rejected.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("token signature does not match")]
    InvalidSignature,
    #[error("token has expired")]
    Expired,
    #[error("token is malformed")]
    Malformed,
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(error: jsonwebtoken::errors::Error) -> Self {
        match error.kind() {
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Malformed,
        }
    }
}

/// HMAC keys derived once from the signing secret.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
    validation: Arc<Validation>,
}

impl TokenKeys {
    pub fn new(secret: &str) -> Result<Self, CredentialError> {
        if secret.is_empty() {
            return Err(CredentialError::SignFailure(
                "no signing secret configured".into(),
            ));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Ok(Self {
            encoding: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
            validation: Arc::new(validation),
        })
    }

    /// Signs a token for `subject_id` that expires [`TOKEN_TTL_SECS`] after `issued_at`.
    pub fn issue_at(
        &self,
        subject_id: i32,
        email: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<String, CredentialError> {
        let claims = Claims {
            sub: subject_id,
            email: email.to_owned(),
            iat: issued_at.timestamp(),
            exp: (issued_at + Duration::seconds(TOKEN_TTL_SECS)).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| CredentialError::SignFailure(e.to_string()))
    }

    pub fn issue(&self, subject_id: i32, email: &str) -> Result<String, CredentialError> {
        self.issue_at(subject_id, email, Utc::now())
    }

    /// Checks signature first, then expiry.
    pub fn verify(&self, token: &str) -> Result<TokenSubject, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding, &self.validation)?.claims;

        // The library tolerates `exp == now`; a token is only valid strictly before expiry.
        if claims.exp <= Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(TokenSubject {
            subject_id: claims.sub,
            email: claims.email,
        })
    }
}
