//! Request middleware: authentication and authorization.

pub mod auth;
pub mod authorize;

pub use auth::{auth_middleware, AuthUser};
pub use authorize::require;
