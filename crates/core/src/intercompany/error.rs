//! Intercompany error types.

use thiserror::Error;
use uuid::Uuid;

use super::types::MatchingStatus;

/// Errors that can occur during intercompany operations.
#[derive(Debug, Error)]
pub enum IntercompanyError {
    /// Transaction not found.
    #[error("Intercompany transaction not found: {0}")]
    NotFound(Uuid),

    /// Both sides of an intercompany transaction must differ.
    #[error("From and to companies must be different")]
    SameCompany,

    /// Matched or variance-approved transactions cannot be deleted.
    #[error("Cannot delete intercompany transaction in {0:?} status")]
    DeleteForbidden(MatchingStatus),

    /// Variance approval requires an explanation.
    #[error("Variance approval requires an explanation")]
    ExplanationRequired,

    /// Variance approval requires both sides to be linked.
    #[error("Cannot approve variance: both journal entries must be linked")]
    BothSidesRequired,
}

impl IntercompanyError {
    /// Returns the wire discriminant for API responses.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "IntercompanyTransactionNotFoundError",
            Self::SameCompany => "SameCompanyIntercompanyError",
            Self::DeleteForbidden(_) => "IntercompanyDeleteForbiddenError",
            Self::ExplanationRequired => "VarianceExplanationRequiredError",
            Self::BothSidesRequired => "VarianceBothSidesRequiredError",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::SameCompany | Self::ExplanationRequired => 400,
            Self::DeleteForbidden(_) => 409,
            Self::BothSidesRequired => 422,
        }
    }
}
