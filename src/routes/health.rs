use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;

/// Health check endpoint
///
/// Reports whether the database answers a trivial query. Not behind the auth gate.
#[get("/health")]
pub async fn health(pool: web::Data<PgPool>) -> impl Responder {
    match sqlx::query("SELECT 1").execute(&**pool).await {
        Ok(_) => HttpResponse::Ok().json(json!({
            "status": "ok",
            "database": "up",
            "timestamp": Utc::now()
        })),
        Err(e) => {
            log::warn!("health check could not reach the database: {}", e);
            HttpResponse::ServiceUnavailable().json(json!({
                "status": "degraded",
                "database": "unavailable",
                "timestamp": Utc::now()
            }))
        }
    }
}
