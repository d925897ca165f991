//! Shared types, errors, and configuration for Meridian.
//!
//! This crate provides common types used across all other crates:
//! - Money types with decimal precision
//! - Typed IDs for type-safe entity references
//! - Application-wide error types
//! - Configuration management
//! - The append-only audit sink abstraction

pub mod audit;
pub mod config;
pub mod error;
pub mod types;

pub use audit::{AuditRecord, AuditSink};
pub use config::AppConfig;
pub use error::{AppError, AppResult};
