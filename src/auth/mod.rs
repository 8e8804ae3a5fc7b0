pub mod extractors;
pub mod gate;
pub mod middleware;
pub mod password;
pub mod service;
pub mod token;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use thiserror::Error;
use validator::{Validate, ValidationError};

use crate::error::AppError;

// Re-export necessary items
pub use extractors::AuthenticatedIdentity;
pub use gate::GateRejection;
pub use middleware::AuthMiddleware;
pub use service::CredentialService;
pub use token::{TokenError, TokenSubject};

lazy_static! {
    /// Something, an `@`, something, a dot, something. No whitespace anywhere.
    pub(crate) static ref EMAIL_REGEX: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

pub const MIN_PASSWORD_LEN: u64 = 10;

/// Failures of the credential service. Both are server-side faults, never the caller's.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("password hashing failed: {0}")]
    HashFailure(String),
    #[error("token signing failed: {0}")]
    SignFailure(String),
}

/// Represents the payload for a new user registration request.
///
/// Missing fields deserialize as empty strings so that they are reported by
/// validation with the same message as blank ones.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(
        length(min = 1, message = "Email and password are required"),
        regex(path = "EMAIL_REGEX", message = "Invalid email format")
    )]
    pub email: String,
    #[serde(default)]
    #[validate(custom = "validate_new_password")]
    pub password: String,
}

/// Represents the payload for a user login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Email and password are required"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Email and password are required"))]
    pub password: String,
}

/// Body returned by a successful login.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub message: String,
    /// The signed bearer token, valid for one hour.
    pub token: String,
}

impl RegisterRequest {
    /// Validates in reporting order: both fields present, then the password
    /// rule, then the email format.
    pub fn check(&self) -> Result<(), AppError> {
        check_new_credentials(self, &self.email, &self.password)
    }
}

/// Shared by registration and account update.
pub(crate) fn check_new_credentials<T: Validate>(
    request: &T,
    email: &str,
    password: &str,
) -> Result<(), AppError> {
    if email.is_empty() || password.is_empty() {
        return Err(AppError::Validation(CREDENTIALS_REQUIRED.into()));
    }
    request
        .validate()
        .map_err(|errors| AppError::from_validation_ordered(errors, &["password", "email"]))
}

const CREDENTIALS_REQUIRED: &str = "Email and password are required";

/// Shared by registration and account update: required, then long enough.
pub(crate) fn validate_new_password(password: &str) -> Result<(), ValidationError> {
    let message = if password.is_empty() {
        CREDENTIALS_REQUIRED
    } else if (password.chars().count() as u64) < MIN_PASSWORD_LEN {
        "Password must be at least 10 characters long"
    } else {
        return Ok(());
    };

    let mut error = ValidationError::new("password");
    error.message = Some(Cow::Borrowed(message));
    Err(error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    fn message_of(result: Result<(), validator::ValidationErrors>) -> String {
        match AppError::from(result.unwrap_err()) {
            AppError::Validation(msg) => msg,
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_login_request_validation() {
        let valid_login = LoginRequest {
            email: "test@example.com".to_string(),
            password: "pw".to_string(),
        };
        assert!(valid_login.validate().is_ok());

        let missing_password = LoginRequest {
            email: "test@example.com".to_string(),
            password: "".to_string(),
        };
        assert_eq!(
            message_of(missing_password.validate()),
            "Email and password are required"
        );
    }

    #[test]
    fn test_register_request_validation() {
        let valid_register = RegisterRequest {
            email: "test@example.com".to_string(),
            password: "password123".to_string(),
        };
        assert!(valid_register.validate().is_ok());

        let short_password = RegisterRequest {
            email: "test@example.com".to_string(),
            password: "123456789".to_string(),
        };
        assert_eq!(
            message_of(short_password.validate()),
            "Password must be at least 10 characters long"
        );

        let bad_email = RegisterRequest {
            email: "test@example".to_string(),
            password: "password123".to_string(),
        };
        assert_eq!(message_of(bad_email.validate()), "Invalid email format");

        let missing_email = RegisterRequest {
            email: "".to_string(),
            password: "password123".to_string(),
        };
        assert_eq!(
            message_of(missing_email.validate()),
            "Email and password are required"
        );
    }

    fn check_message(email: &str, password: &str) -> String {
        let request = RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        match request.check() {
            Err(AppError::Validation(msg)) => msg,
            other => panic!("expected a validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_register_check_reports_in_order() {
        // Missing beats everything else.
        assert_eq!(check_message("bad", ""), "Email and password are required");
        assert_eq!(check_message("", "short"), "Email and password are required");
        // Then the password rule, then the email format.
        assert_eq!(
            check_message("bad", "short"),
            "Password must be at least 10 characters long"
        );
        assert_eq!(check_message("bad", "password123"), "Invalid email format");

        let valid = RegisterRequest {
            email: "test@example.com".to_string(),
            password: "password123".to_string(),
        };
        assert!(valid.check().is_ok());
    }

    #[test]
    fn test_missing_fields_deserialize_as_blank() {
        let request: RegisterRequest = serde_json::from_str(r#"{"email":"a@b.co"}"#).unwrap();
        assert_eq!(request.password, "");
        assert_eq!(
            message_of(request.validate()),
            "Email and password are required"
        );
    }

    #[test]
    fn test_email_pattern() {
        assert!(EMAIL_REGEX.is_match("someone@example.com"));
        assert!(!EMAIL_REGEX.is_match("some one@example.com"));
        assert!(!EMAIL_REGEX.is_match("someone@@example.com"));
        assert!(!EMAIL_REGEX.is_match("someone.example.com"));
    }
}
