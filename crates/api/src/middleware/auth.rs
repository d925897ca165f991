//! Authentication middleware for protected routes.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use meridian_db::repositories::session::AuthSession;

use crate::error::unauthorized;
use crate::AppState;

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
}

/// Authentication middleware validating opaque bearer session tokens.
///
/// On success the resolved `AuthSession` lands in request extensions for
/// the `AuthUser` extractor; validation also refreshes the session TTL.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let Some(token) = auth_header.and_then(extract_bearer_token) else {
        return unauthorized("Authorization header with Bearer token is required");
    };

    match state.sessions.validate(token).await {
        Ok(session) => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        Err(error) => {
            let mut response = unauthorized("Invalid or expired session");
            if let meridian_db::repositories::session::SessionError::Database(db_error) = &error
            {
                tracing::error!(error = %db_error, "Session validation failed");
                response = crate::error::error_response(
                    500,
                    "InternalServerError",
                    "Session validation failed",
                );
            }
            response
        }
    }
}

/// Extractor for the authenticated caller.
#[derive(Debug, Clone)]
pub struct AuthUser(pub AuthSession);

impl AuthUser {
    /// The authenticated user id.
    #[must_use]
    pub fn user_id(&self) -> uuid::Uuid {
        self.0.user_id
    }

    /// The organization the session is scoped to.
    #[must_use]
    pub fn organization_id(&self) -> uuid::Uuid {
        self.0.organization_id
    }

    /// The user's role name for policy subject matching.
    #[must_use]
    pub fn role(&self) -> &'static str {
        self.0.role.as_str()
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthSession>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| unauthorized("Authentication required"))
    }
}
