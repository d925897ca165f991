//! Repository abstractions for data access.
//!
//! Repositories own the transactional orchestration: multi-row writes
//! (posting, year-end close, template application) happen inside a single
//! database transaction, and domain rules are delegated to
//! `meridian-core` with data loaded here.

pub mod account;
pub mod audit;
pub mod company;
pub mod consolidation;
pub mod exchange_rate;
pub mod fiscal;
pub mod intercompany;
pub mod journal;
pub mod organization;
pub mod policy;
pub mod session;
pub mod year_end;

pub use account::AccountRepository;
pub use audit::AuditLogStore;
pub use company::CompanyRepository;
pub use consolidation::ConsolidationRepository;
pub use exchange_rate::ExchangeRateRepository;
pub use fiscal::FiscalRepository;
pub use intercompany::IntercompanyRepository;
pub use journal::JournalRepository;
pub use organization::OrganizationRepository;
pub use policy::PolicyRepository;
pub use session::SessionRepository;
pub use year_end::YearEndRepository;
