//! Intercompany transaction matching.
//!
//! An intercompany transaction pairs two group companies. Its matching
//! status derives from which journal entries are linked and the variance
//! between the two sides, with an explicit sticky variance-approval state.

pub mod error;
pub mod matching;
pub mod types;

pub use error::IntercompanyError;
pub use matching::{
    derive_status, validate_delete, validate_pair, validate_variance_approval, DEFAULT_TOLERANCE,
};
pub use types::{IntercompanyTransaction, IntercompanyTransactionType, MatchingStatus};
