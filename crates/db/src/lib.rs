//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Database migrations
//! - Repositories owning the transactional orchestration (posting,
//!   year-end close, consolidation run persistence)
//! - The consolidation runner driving runs through the core pipeline

pub mod convert;
pub mod entities;
pub mod migration;
pub mod repositories;
pub mod runner;

pub use repositories::{
    AccountRepository, AuditLogStore, CompanyRepository, ConsolidationRepository,
    ExchangeRateRepository, FiscalRepository, IntercompanyRepository, JournalRepository,
    OrganizationRepository, PolicyRepository, SessionRepository, YearEndRepository,
};
pub use runner::ConsolidationRunner;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a connection pool to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(database_url.to_owned());
    options.max_connections(max_connections);
    Database::connect(options).await
}
