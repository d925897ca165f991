//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes under `/api/v1`
//! - Bearer-session authentication middleware
//! - Policy-based authorization for mutations
//! - The canonical error → status mapping with `_tag` discriminants

pub mod error;
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use meridian_db::{AuditLogStore, PolicyRepository, SessionRepository};
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: DatabaseConnection,
    /// Session validation.
    pub sessions: SessionRepository,
    /// Policy snapshots and denial sink.
    pub policies: PolicyRepository,
    /// Request-scoped audit sink.
    pub audit: Arc<AuditLogStore>,
}

impl AppState {
    /// Builds the state from a connection pool and session TTL.
    #[must_use]
    pub fn new(db: DatabaseConnection, session_ttl_secs: i64) -> Self {
        Self {
            sessions: SessionRepository::new(db.clone(), session_ttl_secs),
            policies: PolicyRepository::new(db.clone()),
            audit: Arc::new(AuditLogStore::new(db.clone())),
            db,
        }
    }
}

/// Creates the main application router.
#[must_use]
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
