use crate::{
    auth::{CredentialService, LoginRequest, LoginResponse, RegisterRequest},
    error::AppError,
    models::{Credential, User},
};
use actix_web::{post, web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

const LOGIN_REJECTED: &str = "Invalid email or password";
const USER_EXISTS: &str = "User with this email already exists";

/// Register a new user
///
/// Stores the email with a bcrypt hash of the password. Does not log the user in.
///
/// ## Responses:
/// - `201 Created`: `{message, user}`.
/// - `400 Bad Request`: missing fields, short password or malformed email.
/// - `409 Conflict`: the email is already registered.
#[post("/register")]
pub async fn register(
    pool: web::Data<PgPool>,
    credentials: web::Data<CredentialService>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.check()?;
    let RegisterRequest { email, password } = register_data.into_inner();

    let existing = sqlx::query_as::<_, (i32,)>("SELECT id FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(&**pool)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict(USER_EXISTS.into()));
    }

    let password_hash = credentials.hash_password(password).await?;

    // A concurrent registration can still win the race; the unique index turns it into a 409.
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (email, password_hash) VALUES ($1, $2) \
         RETURNING id, email, created_at, updated_at",
    )
    .bind(&email)
    .bind(&password_hash)
    .fetch_one(&**pool)
    .await
    .map_err(|e| AppError::from(e).conflict_as(USER_EXISTS))?;

    log::info!("registered user {}", user.id);

    Ok(HttpResponse::Created().json(json!({
        "message": "User registered successfully",
        "user": user,
    })))
}

/// Login user
///
/// Checks the password and returns a bearer token valid for one hour.
/// Unknown emails and wrong passwords get the same answer.
#[post("/login")]
pub async fn login(
    pool: web::Data<PgPool>,
    credentials: web::Data<CredentialService>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;
    let LoginRequest { email, password } = login_data.into_inner();

    let credential = sqlx::query_as::<_, Credential>(
        "SELECT id, email, password_hash FROM users WHERE email = $1",
    )
    .bind(&email)
    .fetch_optional(&**pool)
    .await?
    .ok_or_else(|| AppError::LoginFailed(LOGIN_REJECTED.into()))?;

    if !credentials
        .verify_password(password, credential.password_hash)
        .await
    {
        log::info!("failed login for user {}", credential.subject_id);
        return Err(AppError::LoginFailed(LOGIN_REJECTED.into()));
    }

    let token = credentials.issue_token(credential.subject_id, &credential.email)?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        message: "Login successful".into(),
        token,
    }))
}
