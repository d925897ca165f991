//! Report error types.

use thiserror::Error;
use uuid::Uuid;

use crate::consolidation::types::RunStatus;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Consolidated reports require a completed run.
    #[error("Consolidation run {run_id} is {status:?}; reports require a completed run")]
    RunNotCompleted {
        /// The run.
        run_id: Uuid,
        /// Its current status.
        status: RunStatus,
    },

    /// The run completed without a trial balance (should not happen).
    #[error("Consolidation run {0} has no trial balance")]
    MissingTrialBalance(Uuid),
}

impl ReportError {
    /// Returns the wire discriminant for API responses.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::RunNotCompleted { .. } => "ConsolidationRunNotCompletedError",
            Self::MissingTrialBalance(_) => "MissingConsolidatedTrialBalanceError",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::RunNotCompleted { .. } => 422,
            Self::MissingTrialBalance(_) => 500,
        }
    }
}
