//! Policy-based authorization for handlers.

use axum::response::Response;
use meridian_core::authz::{
    AccessRequest, RequestEnvironment, ResourceAttributes, Subject,
};

use crate::error::{error_response, forbidden};
use crate::middleware::auth::AuthUser;
use crate::AppState;

/// Evaluates the organization's policy snapshot for an action.
///
/// Denials are recorded through the denial sink by the repository; the
/// caller receives a ready 403 response.
///
/// # Errors
///
/// Returns a ready error response: 403 on deny, 500 on evaluation
/// failure.
pub async fn require(
    state: &AppState,
    auth: &AuthUser,
    action: &str,
    resource: ResourceAttributes,
) -> Result<(), Response> {
    let request = AccessRequest {
        subject: Subject {
            user_id: auth.user_id(),
            roles: vec![auth.role().to_string()],
        },
        action: action.to_string(),
        resource,
        environment: RequestEnvironment::now(),
    };

    match state.policies.evaluate(auth.organization_id(), &request).await {
        Ok(decision) if decision.is_allowed() => Ok(()),
        Ok(_) => Err(forbidden(action, &request.resource.resource_type)),
        Err(error) => {
            tracing::error!(error = %error, "Policy evaluation failed");
            Err(error_response(
                500,
                "InternalServerError",
                "Authorization evaluation failed",
            ))
        }
    }
}
