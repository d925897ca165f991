//! Journal entry workflow state machine.
//!
//! Transitions are explicit functions returning the resulting state and
//! audit fields; illegal transitions surface as `JournalEntryStatusError`
//! without mutating anything.
//!
//! ```text
//! Draft ──submit──▶ PendingApproval ──approve──▶ Approved ──post──▶ Posted ──reverse──▶ Reversed
//!   ▲                     │
//!   └────── reject ───────┘
//! ```

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::error::JournalError;
use super::types::EntryStatus;

/// The outcome of a workflow transition, carrying audit fields.
#[derive(Debug, Clone)]
pub enum WorkflowAction {
    /// Draft submitted for approval.
    Submit {
        /// The new status (always `PendingApproval`).
        new_status: EntryStatus,
        /// The submitting user.
        submitted_by: Uuid,
        /// When the submission happened.
        submitted_at: DateTime<Utc>,
    },
    /// Pending entry approved.
    Approve {
        /// The new status (always `Approved`).
        new_status: EntryStatus,
        /// The approving user.
        approved_by: Uuid,
        /// When the approval happened.
        approved_at: DateTime<Utc>,
    },
    /// Pending entry rejected back to draft.
    Reject {
        /// The new status (always `Draft`).
        new_status: EntryStatus,
        /// Why the entry was rejected.
        rejection_reason: String,
    },
    /// Approved entry posted to the ledger.
    Post {
        /// The new status (always `Posted`).
        new_status: EntryStatus,
        /// The posting user.
        posted_by: Uuid,
        /// When the posting happened.
        posted_at: DateTime<Utc>,
    },
    /// Posted entry marked as reversed.
    Reverse {
        /// The new status of the original entry (always `Reversed`).
        new_status: EntryStatus,
        /// The reversing user.
        reversed_by: Uuid,
        /// When the reversal happened.
        reversed_at: DateTime<Utc>,
    },
}

impl WorkflowAction {
    /// Returns the status this action transitions to.
    #[must_use]
    pub fn new_status(&self) -> EntryStatus {
        match self {
            Self::Submit { new_status, .. }
            | Self::Approve { new_status, .. }
            | Self::Reject { new_status, .. }
            | Self::Post { new_status, .. }
            | Self::Reverse { new_status, .. } => *new_status,
        }
    }
}

/// Stateless service for journal entry workflow transitions.
pub struct JournalWorkflow;

impl JournalWorkflow {
    /// Submits a draft entry for approval.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStatus` unless the entry is in Draft.
    pub fn submit(
        current: EntryStatus,
        submitted_by: Uuid,
    ) -> Result<WorkflowAction, JournalError> {
        match current {
            EntryStatus::Draft => Ok(WorkflowAction::Submit {
                new_status: EntryStatus::PendingApproval,
                submitted_by,
                submitted_at: Utc::now(),
            }),
            _ => Err(JournalError::InvalidStatus {
                current,
                action: "submit",
            }),
        }
    }

    /// Approves a pending entry.
    ///
    /// When `sod_enabled` is set (organization setting), the approver must
    /// differ from the creator.
    ///
    /// # Errors
    ///
    /// - `InvalidStatus` unless the entry is PendingApproval.
    /// - `SelfApprovalNotAllowed` when SoD rejects the approver.
    pub fn approve(
        current: EntryStatus,
        approved_by: Uuid,
        created_by: Uuid,
        sod_enabled: bool,
    ) -> Result<WorkflowAction, JournalError> {
        if current != EntryStatus::PendingApproval {
            return Err(JournalError::InvalidStatus {
                current,
                action: "approve",
            });
        }
        if sod_enabled && approved_by == created_by {
            return Err(JournalError::SelfApprovalNotAllowed);
        }
        Ok(WorkflowAction::Approve {
            new_status: EntryStatus::Approved,
            approved_by,
            approved_at: Utc::now(),
        })
    }

    /// Rejects a pending entry back to draft.
    ///
    /// # Errors
    ///
    /// - `InvalidStatus` unless the entry is PendingApproval.
    /// - `RejectionReasonRequired` when the reason is blank.
    pub fn reject(
        current: EntryStatus,
        rejection_reason: String,
    ) -> Result<WorkflowAction, JournalError> {
        if rejection_reason.trim().is_empty() {
            return Err(JournalError::RejectionReasonRequired);
        }
        match current {
            EntryStatus::PendingApproval => Ok(WorkflowAction::Reject {
                new_status: EntryStatus::Draft,
                rejection_reason,
            }),
            _ => Err(JournalError::InvalidStatus {
                current,
                action: "reject",
            }),
        }
    }

    /// Posts an approved entry.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStatus` unless the entry is Approved. A concurrent
    /// poster that lost the row lock observes Posted here.
    pub fn post(current: EntryStatus, posted_by: Uuid) -> Result<WorkflowAction, JournalError> {
        match current {
            EntryStatus::Approved => Ok(WorkflowAction::Post {
                new_status: EntryStatus::Posted,
                posted_by,
                posted_at: Utc::now(),
            }),
            _ => Err(JournalError::InvalidStatus {
                current,
                action: "post",
            }),
        }
    }

    /// Marks a posted entry as reversed.
    ///
    /// # Errors
    ///
    /// - `InvalidStatus` unless the entry is Posted.
    /// - `AlreadyReversed` when a reversing entry already exists.
    pub fn reverse(
        current: EntryStatus,
        entry_id: Uuid,
        existing_reversal: Option<Uuid>,
        reversed_by: Uuid,
    ) -> Result<WorkflowAction, JournalError> {
        if existing_reversal.is_some() {
            return Err(JournalError::AlreadyReversed(entry_id));
        }
        match current {
            EntryStatus::Posted => Ok(WorkflowAction::Reverse {
                new_status: EntryStatus::Reversed,
                reversed_by,
                reversed_at: Utc::now(),
            }),
            _ => Err(JournalError::InvalidStatus {
                current,
                action: "reverse",
            }),
        }
    }

    /// Validates that an entry may be updated or deleted.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStatus` unless the entry is in Draft.
    pub fn validate_editable(current: EntryStatus) -> Result<(), JournalError> {
        if current.is_editable() {
            Ok(())
        } else {
            Err(JournalError::InvalidStatus {
                current,
                action: "modify",
            })
        }
    }

    /// Returns true if `from -> to` is a legal transition.
    #[must_use]
    pub fn is_valid_transition(from: EntryStatus, to: EntryStatus) -> bool {
        matches!(
            (from, to),
            (EntryStatus::Draft, EntryStatus::PendingApproval)
                | (
                    EntryStatus::PendingApproval,
                    EntryStatus::Approved | EntryStatus::Draft
                )
                | (EntryStatus::Approved, EntryStatus::Posted)
                | (EntryStatus::Posted, EntryStatus::Reversed)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_from_draft() {
        let action = JournalWorkflow::submit(EntryStatus::Draft, Uuid::new_v4()).unwrap();
        assert_eq!(action.new_status(), EntryStatus::PendingApproval);
    }

    #[test]
    fn test_submit_from_other_states_fails() {
        for status in [
            EntryStatus::PendingApproval,
            EntryStatus::Approved,
            EntryStatus::Posted,
            EntryStatus::Reversed,
        ] {
            assert!(matches!(
                JournalWorkflow::submit(status, Uuid::new_v4()),
                Err(JournalError::InvalidStatus { .. })
            ));
        }
    }

    #[test]
    fn test_approve_from_pending() {
        let creator = Uuid::new_v4();
        let approver = Uuid::new_v4();
        let action =
            JournalWorkflow::approve(EntryStatus::PendingApproval, approver, creator, true)
                .unwrap();
        assert_eq!(action.new_status(), EntryStatus::Approved);
    }

    #[test]
    fn test_self_approval_blocked_when_sod_enabled() {
        let user = Uuid::new_v4();
        assert!(matches!(
            JournalWorkflow::approve(EntryStatus::PendingApproval, user, user, true),
            Err(JournalError::SelfApprovalNotAllowed)
        ));
    }

    #[test]
    fn test_self_approval_allowed_when_sod_disabled() {
        let user = Uuid::new_v4();
        assert!(
            JournalWorkflow::approve(EntryStatus::PendingApproval, user, user, false).is_ok()
        );
    }

    #[test]
    fn test_reject_requires_reason() {
        assert!(matches!(
            JournalWorkflow::reject(EntryStatus::PendingApproval, "   ".to_string()),
            Err(JournalError::RejectionReasonRequired)
        ));
        let action =
            JournalWorkflow::reject(EntryStatus::PendingApproval, "wrong account".to_string())
                .unwrap();
        assert_eq!(action.new_status(), EntryStatus::Draft);
    }

    #[test]
    fn test_post_from_approved_only() {
        let action = JournalWorkflow::post(EntryStatus::Approved, Uuid::new_v4()).unwrap();
        assert_eq!(action.new_status(), EntryStatus::Posted);

        // The loser of a concurrent post sees Posted and gets a status error.
        assert!(matches!(
            JournalWorkflow::post(EntryStatus::Posted, Uuid::new_v4()),
            Err(JournalError::InvalidStatus {
                current: EntryStatus::Posted,
                ..
            })
        ));
    }

    #[test]
    fn test_reverse_from_posted() {
        let entry = Uuid::new_v4();
        let action =
            JournalWorkflow::reverse(EntryStatus::Posted, entry, None, Uuid::new_v4()).unwrap();
        assert_eq!(action.new_status(), EntryStatus::Reversed);
    }

    #[test]
    fn test_reverse_twice_fails() {
        let entry = Uuid::new_v4();
        let existing = Some(Uuid::new_v4());
        assert!(matches!(
            JournalWorkflow::reverse(EntryStatus::Posted, entry, existing, Uuid::new_v4()),
            Err(JournalError::AlreadyReversed(_))
        ));
    }

    #[test]
    fn test_reverse_unposted_fails() {
        assert!(matches!(
            JournalWorkflow::reverse(EntryStatus::Draft, Uuid::new_v4(), None, Uuid::new_v4()),
            Err(JournalError::InvalidStatus { .. })
        ));
    }

    #[test]
    fn test_editable_guard() {
        assert!(JournalWorkflow::validate_editable(EntryStatus::Draft).is_ok());
        for status in [
            EntryStatus::PendingApproval,
            EntryStatus::Approved,
            EntryStatus::Posted,
            EntryStatus::Reversed,
        ] {
            assert!(JournalWorkflow::validate_editable(status).is_err());
        }
    }

    #[test]
    fn test_transition_table() {
        assert!(JournalWorkflow::is_valid_transition(
            EntryStatus::Draft,
            EntryStatus::PendingApproval
        ));
        assert!(JournalWorkflow::is_valid_transition(
            EntryStatus::PendingApproval,
            EntryStatus::Draft
        ));
        assert!(JournalWorkflow::is_valid_transition(
            EntryStatus::Approved,
            EntryStatus::Posted
        ));
        assert!(JournalWorkflow::is_valid_transition(
            EntryStatus::Posted,
            EntryStatus::Reversed
        ));

        assert!(!JournalWorkflow::is_valid_transition(
            EntryStatus::Draft,
            EntryStatus::Posted
        ));
        assert!(!JournalWorkflow::is_valid_transition(
            EntryStatus::Reversed,
            EntryStatus::Draft
        ));
        assert!(!JournalWorkflow::is_valid_transition(
            EntryStatus::Posted,
            EntryStatus::Draft
        ));
    }
}
