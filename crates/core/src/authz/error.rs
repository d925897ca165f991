//! Authorization error types.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during authorization operations.
#[derive(Debug, Error)]
pub enum AuthzError {
    /// Policy not found.
    #[error("Policy not found: {0}")]
    PolicyNotFound(Uuid),

    /// System policies cannot be modified or deleted.
    #[error("System policies are immutable")]
    SystemPolicyImmutable,

    /// Priority outside the allowed band.
    #[error("Priority {priority} out of range (system: {is_system})")]
    PriorityOutOfRange {
        /// The rejected priority.
        priority: u16,
        /// Whether the policy is a system policy.
        is_system: bool,
    },

    /// A condition failed to parse (bad CIDR, bad time).
    #[error("Invalid policy condition: {0}")]
    InvalidCondition(String),

    /// The request was denied.
    #[error("Access denied: {action} on {resource_type}")]
    Forbidden {
        /// The denied action.
        action: String,
        /// The resource type.
        resource_type: String,
    },
}

impl AuthzError {
    /// Returns the wire discriminant for API responses.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::PolicyNotFound(_) => "PolicyNotFoundError",
            Self::SystemPolicyImmutable => "SystemPolicyImmutableError",
            Self::PriorityOutOfRange { .. } => "PolicyPriorityOutOfRangeError",
            Self::InvalidCondition(_) => "InvalidPolicyConditionError",
            Self::Forbidden { .. } => "ForbiddenError",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::PolicyNotFound(_) => 404,
            Self::SystemPolicyImmutable => 409,
            Self::PriorityOutOfRange { .. } | Self::InvalidCondition(_) => 400,
            Self::Forbidden { .. } => 403,
        }
    }
}
