#![doc = "The `tasknest` library crate."]
#![doc = ""]
#![doc = "Credential handling (password hashing, bearer tokens), the auth middleware that"]
#![doc = "guards the task and account routes, the domain models, routing configuration and"]
#![doc = "error handling. The binary (`main.rs`) wires these into an `HttpServer`."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;

pub use crate::auth::{AuthMiddleware, AuthenticatedIdentity, CredentialService};
pub use crate::config::Config;
pub use crate::error::AppError;
