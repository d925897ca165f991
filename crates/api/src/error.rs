//! Error response helpers.
//!
//! Every error body carries a `_tag` discriminant plus a human-readable
//! message, per the canonical status mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Builds an error response with a `_tag` discriminant.
#[must_use]
pub fn error_response(status: u16, tag: &str, message: &str) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(json!({
            "_tag": tag,
            "message": message,
        })),
    )
        .into_response()
}

/// Builds a 404 response.
#[must_use]
pub fn not_found(tag: &str, message: &str) -> Response {
    error_response(404, tag, message)
}

/// Builds a 401 response.
#[must_use]
pub fn unauthorized(message: &str) -> Response {
    error_response(401, "UnauthorizedError", message)
}

/// Builds a 403 response carrying the denied action and resource.
#[must_use]
pub fn forbidden(action: &str, resource_type: &str) -> Response {
    let status = StatusCode::FORBIDDEN;
    (
        status,
        Json(json!({
            "_tag": "ForbiddenError",
            "message": format!("Access denied: {action} on {resource_type}"),
            "action": action,
            "resource": resource_type,
        })),
    )
        .into_response()
}

/// Builds a 400 response for malformed request payloads.
#[must_use]
pub fn bad_request(message: &str) -> Response {
    error_response(400, "HttpApiDecodeError", message)
}
