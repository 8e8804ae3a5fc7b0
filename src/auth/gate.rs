//! The admit-or-reject decision for a single request.
//!
//! [`authenticate`] is a pure function of the `Authorization` header and the
//! credential service; [`AuthMiddleware`](super::AuthMiddleware) only decides
//! what to do with its result.

use actix_web::http::header::HeaderValue;
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::auth::{AuthenticatedIdentity, CredentialService};

const BEARER_PREFIX: &str = "Bearer ";

/// Why the gate turned a request away. Every variant is a 401.
///
/// Token verification failures are collapsed into [`GateRejection::InvalidOrExpired`];
/// the caller is not told which check failed.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GateRejection {
    #[error("Authorization header missing")]
    MissingHeader,
    #[error("Token missing")]
    MissingToken,
    #[error("Invalid or expired token")]
    InvalidOrExpired,
}

impl ResponseError for GateRejection {
    fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "message": self.to_string() }))
    }
}

/// Pulls the bearer token out of an `Authorization` header value.
fn bearer_token(value: &HeaderValue) -> Option<&str> {
    value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

pub fn authenticate(
    header: Option<&HeaderValue>,
    credentials: &CredentialService,
) -> Result<AuthenticatedIdentity, GateRejection> {
    let header = header.ok_or(GateRejection::MissingHeader)?;
    let token = bearer_token(header).ok_or(GateRejection::MissingToken)?;

    credentials
        .verify_token(token)
        .map(|subject| AuthenticatedIdentity {
            subject_id: subject.subject_id,
        })
        .map_err(|e| {
            log::debug!("rejecting bearer token: {}", e);
            GateRejection::InvalidOrExpired
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn service() -> CredentialService {
        CredentialService::new("gate-secret").unwrap()
    }

    fn header(value: &str) -> HeaderValue {
        HeaderValue::from_str(value).unwrap()
    }

    #[test]
    fn test_missing_header() {
        assert_eq!(
            authenticate(None, &service()),
            Err(GateRejection::MissingHeader)
        );
    }

    #[test]
    fn test_missing_token() {
        let service = service();
        for value in ["Bearer ", "Bearer    ", "", "Basic abc123", "bearer abc", "Bearer"] {
            assert_eq!(
                authenticate(Some(&header(value)), &service),
                Err(GateRejection::MissingToken),
                "header value {:?}",
                value
            );
        }
    }

    #[test]
    fn test_non_ascii_header_is_missing_token() {
        let value = HeaderValue::from_bytes(b"Bearer \xffabc").unwrap();
        assert_eq!(
            authenticate(Some(&value), &service()),
            Err(GateRejection::MissingToken)
        );
    }

    #[test]
    fn test_valid_token_yields_identity() {
        let service = service();
        let token = service.issue_token(10, "ten@example.com").unwrap();

        let identity = authenticate(Some(&header(&format!("Bearer {}", token))), &service);
        assert_eq!(identity, Ok(AuthenticatedIdentity { subject_id: 10 }));
    }

    #[test]
    fn test_every_verification_failure_looks_the_same() {
        let service = service();
        let foreign = CredentialService::new("someone-else")
            .unwrap()
            .issue_token(10, "ten@example.com")
            .unwrap();
        let expired = service
            .keys()
            .issue_at(10, "ten@example.com", Utc::now() - Duration::hours(2))
            .unwrap();

        for token in [foreign.as_str(), expired.as_str(), "garbage"] {
            assert_eq!(
                authenticate(Some(&header(&format!("Bearer {}", token))), &service),
                Err(GateRejection::InvalidOrExpired)
            );
        }
    }

    #[actix_rt::test]
    async fn test_rejection_body() {
        let response = GateRejection::MissingToken.error_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = actix_web::body::to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, json!({ "message": "Token missing" }));
    }
}
