//! REST API routes.

pub mod accounts;
pub mod companies;
pub mod consolidation;
pub mod exchange_rates;
pub mod fiscal;
pub mod intercompany;
pub mod journal_entries;
pub mod organizations;
pub mod policies;
pub mod reports;

use axum::middleware::from_fn_with_state;
use axum::Router;

use crate::middleware::auth::auth_middleware;
use crate::AppState;

/// Builds the `/api/v1` route tree. All routes require a bearer session.
#[must_use]
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(organizations::routes())
        .merge(companies::routes())
        .merge(accounts::routes())
        .merge(journal_entries::routes())
        .merge(fiscal::routes())
        .merge(exchange_rates::routes())
        .merge(intercompany::routes())
        .merge(consolidation::routes())
        .merge(policies::routes())
        .merge(reports::routes())
        .layer(from_fn_with_state(state, auth_middleware))
}
