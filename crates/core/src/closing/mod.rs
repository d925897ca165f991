//! Year-end close and reopen.
//!
//! Closing rolls the year's net income into retained earnings by zeroing
//! every revenue and expense balance through system-generated closing
//! entries, then closes all periods and the year. Reopening reverses the
//! closing entries and restores every income-statement balance.

pub mod error;
pub mod service;
pub mod types;

pub use error::ClosingError;
pub use service::ClosingService;
pub use types::{AccountClosingBalance, CloseBlocker, CloseOutcome, ClosePreview};
