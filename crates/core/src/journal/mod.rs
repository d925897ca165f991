//! Double-entry journal lifecycle and posting rules.
//!
//! This module implements the journal engine:
//! - Entry and line types with dual-currency amounts
//! - Balance and postability validation
//! - The Draft → PendingApproval → Approved → Posted → Reversed state
//!   machine with separation-of-duties enforcement
//! - Posting resolution (rate capture, functional amounts, period gating)
//! - Reversal construction

pub mod error;
pub mod lifecycle;
pub mod posting;
pub mod reversal;
pub mod types;
pub mod validation;

#[cfg(test)]
mod posting_props;

pub use error::JournalError;
pub use lifecycle::{JournalWorkflow, WorkflowAction};
pub use posting::PostingService;
pub use reversal::{ReversalInput, ReversalService};
pub use types::{
    AccountInfo, CreateEntryInput, EntryStatus, EntryTotals, EntryType, JournalLineInput,
    LineSide, ResolvedLine, SourceModule,
};
pub use validation::validate_entry;
