use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::auth::{check_new_credentials, validate_new_password, EMAIL_REGEX};
use crate::error::AppError;

/// A user as returned by the API. The password hash never leaves the database layer.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// What login needs from a user row.
#[derive(Debug, FromRow)]
pub struct Credential {
    #[sqlx(rename = "id")]
    pub subject_id: i32,
    pub email: String,
    pub password_hash: String,
}

/// Replaces the caller's email and password.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
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

impl UpdateUserRequest {
    /// Same rules and reporting order as registration.
    pub fn check(&self) -> Result<(), AppError> {
        check_new_credentials(self, &self.email, &self.password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_update_user_request_validation() {
        let input = UpdateUserRequest {
            email: "test@example.com".to_string(),
            password: "password123".to_string(),
        };
        assert!(input.validate().is_ok());

        let input = UpdateUserRequest {
            email: "invalid-email".to_string(),
            password: "password123".to_string(),
        };
        assert!(input.validate().is_err());

        let input = UpdateUserRequest {
            email: "test@example.com".to_string(),
            password: "short".to_string(),
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_update_user_check_order() {
        let input = UpdateUserRequest {
            email: "not-an-email".to_string(),
            password: "".to_string(),
        };
        assert!(matches!(
            input.check(),
            Err(AppError::Validation(m)) if m == "Email and password are required"
        ));

        let input = UpdateUserRequest {
            email: "not-an-email".to_string(),
            password: "short".to_string(),
        };
        assert!(matches!(
            input.check(),
            Err(AppError::Validation(m)) if m == "Password must be at least 10 characters long"
        ));
    }
}
