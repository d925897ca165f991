//! Matching status derivation.

use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::IntercompanyError;
use super::types::MatchingStatus;

/// Default variance tolerance in functional currency, used when the
/// organization does not configure one.
pub const DEFAULT_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2); // 0.01

/// Derives the matching status from linkage and variance.
///
/// - neither side linked → `Unmatched`
/// - one side linked → `PartiallyMatched`
/// - both linked, |variance| < tolerance → `Matched`
/// - both linked, out of tolerance → keeps `VarianceApproved` when already
///   approved (approval is sticky while both sides stay linked), else
///   `PartiallyMatched` pending correction or explicit approval
#[must_use]
pub fn derive_status(
    from_entry: Option<Uuid>,
    to_entry: Option<Uuid>,
    variance: Decimal,
    tolerance: Decimal,
    current: MatchingStatus,
) -> MatchingStatus {
    match (from_entry, to_entry) {
        (None, None) => MatchingStatus::Unmatched,
        (Some(_), None) | (None, Some(_)) => MatchingStatus::PartiallyMatched,
        (Some(_), Some(_)) => {
            if variance.abs() < tolerance {
                MatchingStatus::Matched
            } else if current == MatchingStatus::VarianceApproved {
                // Approval is sticky while both sides stay linked.
                MatchingStatus::VarianceApproved
            } else {
                MatchingStatus::PartiallyMatched
            }
        }
    }
}

/// Validates the company pair of a new intercompany transaction.
///
/// # Errors
///
/// Returns `SameCompany` when both sides are the same company.
pub fn validate_pair(from_company: Uuid, to_company: Uuid) -> Result<(), IntercompanyError> {
    if from_company == to_company {
        return Err(IntercompanyError::SameCompany);
    }
    Ok(())
}

/// Validates that a transaction may be deleted.
///
/// # Errors
///
/// Returns `DeleteForbidden` for Matched and VarianceApproved
/// transactions.
pub fn validate_delete(status: MatchingStatus) -> Result<(), IntercompanyError> {
    match status {
        MatchingStatus::Matched | MatchingStatus::VarianceApproved => {
            Err(IntercompanyError::DeleteForbidden(status))
        }
        MatchingStatus::Unmatched | MatchingStatus::PartiallyMatched => Ok(()),
    }
}

/// Validates a variance approval request.
///
/// # Errors
///
/// - `BothSidesRequired` unless both journal entries are linked.
/// - `ExplanationRequired` when the explanation is blank.
pub fn validate_variance_approval(
    from_entry: Option<Uuid>,
    to_entry: Option<Uuid>,
    explanation: &str,
) -> Result<(), IntercompanyError> {
    if from_entry.is_none() || to_entry.is_none() {
        return Err(IntercompanyError::BothSidesRequired);
    }
    if explanation.trim().is_empty() {
        return Err(IntercompanyError::ExplanationRequired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_tolerance_is_one_cent() {
        assert_eq!(DEFAULT_TOLERANCE, dec!(0.01));
    }

    #[test]
    fn test_unlinked_is_unmatched() {
        assert_eq!(
            derive_status(None, None, dec!(0), DEFAULT_TOLERANCE, MatchingStatus::Unmatched),
            MatchingStatus::Unmatched
        );
    }

    #[test]
    fn test_one_side_is_partially_matched() {
        let entry = Uuid::new_v4();
        assert_eq!(
            derive_status(
                Some(entry),
                None,
                dec!(0),
                DEFAULT_TOLERANCE,
                MatchingStatus::Unmatched
            ),
            MatchingStatus::PartiallyMatched
        );
        assert_eq!(
            derive_status(
                None,
                Some(entry),
                dec!(0),
                DEFAULT_TOLERANCE,
                MatchingStatus::Unmatched
            ),
            MatchingStatus::PartiallyMatched
        );
    }

    #[test]
    fn test_both_sides_within_tolerance_is_matched() {
        assert_eq!(
            derive_status(
                Some(Uuid::new_v4()),
                Some(Uuid::new_v4()),
                dec!(0.005),
                DEFAULT_TOLERANCE,
                MatchingStatus::Unmatched
            ),
            MatchingStatus::Matched
        );
    }

    #[test]
    fn test_out_of_tolerance_needs_review() {
        assert_eq!(
            derive_status(
                Some(Uuid::new_v4()),
                Some(Uuid::new_v4()),
                dec!(5.00),
                DEFAULT_TOLERANCE,
                MatchingStatus::Unmatched
            ),
            MatchingStatus::PartiallyMatched
        );
    }

    #[test]
    fn test_variance_approval_is_sticky() {
        // Re-derivation with both sides linked keeps the approval.
        assert_eq!(
            derive_status(
                Some(Uuid::new_v4()),
                Some(Uuid::new_v4()),
                dec!(5.00),
                DEFAULT_TOLERANCE,
                MatchingStatus::VarianceApproved
            ),
            MatchingStatus::VarianceApproved
        );

        // Unlinking a side downgrades despite the prior approval.
        assert_eq!(
            derive_status(
                Some(Uuid::new_v4()),
                None,
                dec!(5.00),
                DEFAULT_TOLERANCE,
                MatchingStatus::VarianceApproved
            ),
            MatchingStatus::PartiallyMatched
        );
    }

    #[test]
    fn test_variance_exactly_at_tolerance_is_not_matched() {
        assert_eq!(
            derive_status(
                Some(Uuid::new_v4()),
                Some(Uuid::new_v4()),
                dec!(0.01),
                DEFAULT_TOLERANCE,
                MatchingStatus::Unmatched
            ),
            MatchingStatus::PartiallyMatched
        );
    }

    #[test]
    fn test_validate_pair() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert!(validate_pair(a, b).is_ok());
        assert!(matches!(
            validate_pair(a, a),
            Err(IntercompanyError::SameCompany)
        ));
    }

    #[test]
    fn test_delete_guard() {
        assert!(validate_delete(MatchingStatus::Unmatched).is_ok());
        assert!(validate_delete(MatchingStatus::PartiallyMatched).is_ok());
        assert!(matches!(
            validate_delete(MatchingStatus::Matched),
            Err(IntercompanyError::DeleteForbidden(MatchingStatus::Matched))
        ));
        assert!(validate_delete(MatchingStatus::VarianceApproved).is_err());
    }

    #[test]
    fn test_variance_approval_validation() {
        let entry = Uuid::new_v4();
        assert!(validate_variance_approval(Some(entry), Some(entry), "FX timing").is_ok());
        assert!(matches!(
            validate_variance_approval(Some(entry), None, "FX timing"),
            Err(IntercompanyError::BothSidesRequired)
        ));
        assert!(matches!(
            validate_variance_approval(Some(entry), Some(entry), "  "),
            Err(IntercompanyError::ExplanationRequired)
        ));
    }
}
