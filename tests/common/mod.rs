//! Shared setup for the database-backed integration tests.
//!
//! These tests need a Postgres reachable through `DATABASE_URL` (a `.env`
//! file works) and are `#[ignore]`d by default; run them with
//! `cargo test -- --ignored`.

#![allow(dead_code)]

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::header;
use actix_web::middleware::Logger;
use actix_web::{test, web, App};
use serde_json::{json, Value};
use sqlx::PgPool;
use tasknest::{routes, CredentialService};

pub const SECRET: &str = "integration-test-secret";

pub async fn pool() -> PgPool {
    dotenv::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to test DB");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

pub async fn init_app(
    pool: PgPool,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error> {
    let credentials = web::Data::new(CredentialService::new(SECRET).unwrap());
    test::init_service(
        App::new()
            .app_data(web::Data::new(pool))
            .app_data(credentials.clone())
            .wrap(Logger::default())
            .service(routes::health::health)
            .service(web::scope("/api").configure(|cfg| routes::config(cfg, &credentials))),
    )
    .await
}

pub async fn cleanup_user(pool: &PgPool, email: &str) {
    let _ = sqlx::query("DELETE FROM users WHERE email = $1")
        .bind(email)
        .execute(pool)
        .await;
}

/// Sends a JSON request and returns the status with the decoded body.
pub async fn send<S, B>(
    app: &S,
    req: test::TestRequest,
    token: Option<&str>,
) -> (actix_web::http::StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = match token {
        Some(token) => req.insert_header((header::AUTHORIZATION, format!("Bearer {}", token))),
        None => req,
    };
    let resp = test::call_service(app, req.to_request()).await;
    let status = resp.status();
    let bytes = test::read_body(resp).await;
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

/// Registers `email` and logs in, returning the bearer token.
pub async fn register_and_login<S, B>(app: &S, email: &str, password: &str) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let credentials = json!({ "email": email, "password": password });

    let (status, body) = send(
        app,
        test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(&credentials),
        None,
    )
    .await;
    assert_eq!(status, 201, "Registration failed. Body: {}", body);

    let (status, body) = send(
        app,
        test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(&credentials),
        None,
    )
    .await;
    assert_eq!(status, 200, "Login failed. Body: {}", body);

    body["token"]
        .as_str()
        .expect("login response carries a token")
        .to_string()
}
