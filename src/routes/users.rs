use crate::{
    auth::{AuthenticatedIdentity, CredentialService},
    error::AppError,
    models::UpdateUserRequest,
};
use actix_web::{post, web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;

/// Replaces the caller's email and password.
///
/// Tokens issued before the change stay valid until they expire.
///
/// ## Responses:
/// - `200 OK`: `{message}`.
/// - `400 Bad Request`: same field rules as registration.
/// - `404 Not Found`: the account no longer exists.
/// - `409 Conflict`: another account already uses the email.
#[post("/update")]
pub async fn update_user(
    pool: web::Data<PgPool>,
    credentials: web::Data<CredentialService>,
    identity: AuthenticatedIdentity,
    user_data: web::Json<UpdateUserRequest>,
) -> Result<impl Responder, AppError> {
    user_data.check()?;
    let UpdateUserRequest { email, password } = user_data.into_inner();

    let password_hash = credentials.hash_password(password).await?;

    let result = sqlx::query(
        "UPDATE users SET email = $1, password_hash = $2, updated_at = NOW() WHERE id = $3",
    )
    .bind(&email)
    .bind(&password_hash)
    .bind(identity.subject_id)
    .execute(&**pool)
    .await
    .map_err(|e| AppError::from(e).conflict_as("Email is already in use"))?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("The user is not found".into()));
    }

    log::info!("user {} updated their account details", identity.subject_id);

    Ok(HttpResponse::Ok().json(json!({ "message": "Successfully updated user Details" })))
}
