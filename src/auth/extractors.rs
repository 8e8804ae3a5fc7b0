use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::error::AppError;

/// The subject a verified bearer token belongs to.
///
/// `AuthMiddleware` stores one in the request extensions on success; the
/// type itself is the lookup key. Handlers on gated scopes take it as an
/// argument.
///
/// If no identity is present (the middleware is not mounted on this route),
/// extraction fails with `AppError::Unauthorized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedIdentity {
    pub subject_id: i32,
}

impl FromRequest for AuthenticatedIdentity {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthenticatedIdentity>().copied() {
            Some(identity) => ready(Ok(identity)),
            None => {
                log::error!(
                    "no authenticated identity on {}; is AuthMiddleware mounted?",
                    req.path()
                );
                ready(Err(
                    AppError::Unauthorized("Authentication required".into()).into()
                ))
            }
        }
    }
}
