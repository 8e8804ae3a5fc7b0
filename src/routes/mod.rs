pub mod auth;
pub mod health;
pub mod tasks;
pub mod users;

use actix_web::{error::JsonPayloadError, web, HttpRequest};

use crate::auth::{AuthMiddleware, CredentialService};
use crate::error::AppError;

/// Mounts the API under the caller's scope (normally `/api`).
///
/// `/auth` is open; `/tasks` and `/user` sit behind [`AuthMiddleware`].
pub fn config(cfg: &mut web::ServiceConfig, credentials: &web::Data<CredentialService>) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .service(
            web::scope("/auth")
                .service(auth::login)
                .service(auth::register),
        )
        .service(
            web::scope("/tasks")
                .wrap(AuthMiddleware::new(credentials.clone()))
                .service(tasks::create_task)
                .service(tasks::get_tasks)
                .service(tasks::update_task_status)
                .service(tasks::delete_task),
        )
        .service(
            web::scope("/user")
                .wrap(AuthMiddleware::new(credentials.clone()))
                .service(users::update_user),
        );
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::Validation(format!("Invalid request body: {}", err)).into()
}
