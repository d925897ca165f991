//! `SeaORM` entity definitions.

pub mod sea_orm_active_enums;

pub mod accounts;
pub mod audit_log;
pub mod authorization_denials;
pub mod companies;
pub mod consolidation_groups;
pub mod consolidation_members;
pub mod consolidation_runs;
pub mod elimination_rules;
pub mod exchange_rates;
pub mod fiscal_period_reopen_log;
pub mod fiscal_periods;
pub mod fiscal_years;
pub mod intercompany_transactions;
pub mod journal_entries;
pub mod journal_entry_lines;
pub mod journal_entry_sequences;
pub mod organization_users;
pub mod organizations;
pub mod policies;
pub mod sessions;
pub mod users;
