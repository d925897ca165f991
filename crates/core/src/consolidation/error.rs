//! Consolidation error types.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use super::types::{ConsolidationStep, RunStatus, ValidationReport};

/// Errors that can occur during consolidation operations.
#[derive(Debug, Error)]
pub enum ConsolidationError {
    /// Group not found.
    #[error("Consolidation group not found: {0}")]
    GroupNotFound(Uuid),

    /// Group is inactive.
    #[error("Consolidation group {0} is inactive")]
    GroupInactive(Uuid),

    /// A company is already a member of the group.
    #[error("Company {0} is already a member of the group")]
    MemberAlreadyExists(Uuid),

    /// Ownership must lie in 0..=100.
    #[error("Ownership percentage {0} is out of range")]
    OwnershipOutOfRange(Decimal),

    /// Run not found.
    #[error("Consolidation run not found: {0}")]
    RunNotFound(Uuid),

    /// The run is not in a status that permits the requested action.
    #[error("Consolidation run is {current:?}; cannot {action}")]
    InvalidRunStatus {
        /// Current run status.
        current: RunStatus,
        /// The attempted action.
        action: &'static str,
    },

    /// Validate found blocking issues.
    #[error("Consolidation validation failed with {} issue(s)", report.issues.len())]
    ValidationFailed {
        /// The full report.
        report: ValidationReport,
    },

    /// A member lacks a required translation rate.
    #[error("No {kind} rate available for company {company_id}")]
    MissingTranslationRate {
        /// The member missing the rate.
        company_id: Uuid,
        /// Which rate kind ("average", "closing", "historical").
        kind: &'static str,
    },

    /// An elimination entry failed its balance check.
    #[error("Elimination entry for rule {rule_id} is unbalanced by {imbalance}")]
    UnbalancedElimination {
        /// The offending rule.
        rule_id: Uuid,
        /// The signed imbalance.
        imbalance: Decimal,
    },

    /// The consolidated trial balance does not balance.
    #[error("Consolidated balance sheet is not balanced: debits {debits} != credits {credits}")]
    NotBalanced {
        /// Total debits.
        debits: Decimal,
        /// Total credits.
        credits: Decimal,
    },

    /// A step ran before its predecessor's output was available.
    #[error("Step {step:?} requires output of an earlier step")]
    MissingStepOutput {
        /// The step that could not run.
        step: ConsolidationStep,
    },

    /// Another run holds the (group, period) lock.
    #[error("A consolidation run for this group and period is already in progress")]
    RunAlreadyInProgress,
}

impl ConsolidationError {
    /// Returns the wire discriminant for API responses.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::GroupNotFound(_) => "ConsolidationGroupNotFoundError",
            Self::GroupInactive(_) => "ConsolidationGroupInactiveError",
            Self::MemberAlreadyExists(_) => "ConsolidationMemberAlreadyExistsError",
            Self::OwnershipOutOfRange(_) => "OwnershipOutOfRangeError",
            Self::RunNotFound(_) => "ConsolidationRunNotFoundError",
            Self::InvalidRunStatus { .. } => "ConsolidationRunStatusError",
            Self::ValidationFailed { .. } => "ConsolidationValidationFailedError",
            Self::MissingTranslationRate { .. } => "MissingTranslationRateError",
            Self::UnbalancedElimination { .. } => "UnbalancedEliminationError",
            Self::NotBalanced { .. } => "ConsolidatedBalanceSheetNotBalancedError",
            Self::MissingStepOutput { .. } => "ConsolidationStepOrderError",
            Self::RunAlreadyInProgress => "ConsolidationRunInProgressError",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::GroupNotFound(_) | Self::RunNotFound(_) => 404,
            Self::OwnershipOutOfRange(_) => 400,
            Self::MemberAlreadyExists(_)
            | Self::InvalidRunStatus { .. }
            | Self::RunAlreadyInProgress => 409,
            Self::GroupInactive(_)
            | Self::ValidationFailed { .. }
            | Self::MissingTranslationRate { .. }
            | Self::UnbalancedElimination { .. }
            | Self::NotBalanced { .. } => 422,
            Self::MissingStepOutput { .. } => 500,
        }
    }
}
