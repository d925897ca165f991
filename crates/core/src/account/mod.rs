//! Chart of accounts hierarchy and templates.
//!
//! This module implements the account domain rules:
//! - Account classification (type, category, normal balance)
//! - Hierarchy validation (same-company parents, acyclicity, depth limit)
//! - Deactivation guards
//! - Chart-of-accounts templates

pub mod error;
pub mod hierarchy;
pub mod templates;
pub mod types;

pub use error::AccountError;
pub use templates::{CoaTemplate, TemplateAccount};
pub use types::{Account, AccountType, CashFlowCategory, NormalBalance};
