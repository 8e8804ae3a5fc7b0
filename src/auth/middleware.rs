use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::gate::authenticate;
use crate::auth::CredentialService;

/// Bearer-token gate for a scope.
///
/// Requests carrying a valid token continue to the wrapped service with an
/// [`AuthenticatedIdentity`](crate::auth::AuthenticatedIdentity) in their
/// extensions. Anything else is answered with a 401 here and never reaches
/// the wrapped service.
pub struct AuthMiddleware {
    credentials: web::Data<CredentialService>,
}

impl AuthMiddleware {
    pub fn new(credentials: web::Data<CredentialService>) -> Self {
        Self { credentials }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            credentials: self.credentials.clone(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    credentials: web::Data<CredentialService>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let outcome = authenticate(req.headers().get(header::AUTHORIZATION), &self.credentials);

        match outcome {
            Ok(identity) => {
                req.extensions_mut().insert(identity);
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            Err(rejection) => {
                log::info!(
                    "rejected {} {}: {}",
                    req.method(),
                    req.path(),
                    rejection
                );
                let response = req
                    .into_response(rejection.error_response())
                    .map_into_right_body();
                Box::pin(ready(Ok(response)))
            }
        }
    }
}
