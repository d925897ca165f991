//! Account hierarchy validation.
//!
//! The chart of accounts is a forest: parent edges are ids, never owning
//! pointers, and acyclicity is a domain invariant checked on every write
//! that touches a parent edge.

use meridian_shared::types::{AccountId, CompanyId};

use super::error::AccountError;
use super::types::Account;

/// Maximum depth of the account hierarchy.
pub const MAX_HIERARCHY_DEPTH: usize = 6;

/// Validates a prospective parent for an account.
///
/// The parent must belong to the same company and be active.
///
/// # Errors
///
/// Returns `ParentCompanyMismatch` or `Inactive` on violation.
pub fn validate_parent(company_id: CompanyId, parent: &Account) -> Result<(), AccountError> {
    if parent.company_id != company_id {
        return Err(AccountError::ParentCompanyMismatch);
    }
    if !parent.is_active {
        return Err(AccountError::Inactive(parent.id));
    }
    Ok(())
}

/// Walks the ancestor chain from `new_parent_id` and returns the depth the
/// account would sit at (root = 1).
///
/// `parent_of` resolves an account id to its parent edge; it is injected so
/// the walk works against any storage.
///
/// # Errors
///
/// - `CircularHierarchy` if `account_id` appears among the ancestors of the
///   prospective parent (including the parent itself).
/// - `HierarchyTooDeep` if the resulting depth would exceed
///   [`MAX_HIERARCHY_DEPTH`].
pub fn validate_placement<F>(
    account_id: Option<AccountId>,
    new_parent_id: AccountId,
    parent_of: F,
) -> Result<u8, AccountError>
where
    F: Fn(AccountId) -> Option<Option<AccountId>>,
{
    let mut depth = 1usize;
    let mut cursor = Some(new_parent_id);

    while let Some(current) = cursor {
        if account_id == Some(current) {
            return Err(AccountError::CircularHierarchy);
        }
        depth += 1;
        if depth > MAX_HIERARCHY_DEPTH {
            return Err(AccountError::HierarchyTooDeep {
                max: MAX_HIERARCHY_DEPTH,
            });
        }
        cursor = parent_of(current).ok_or(AccountError::ParentNotFound(current))?;
    }

    #[allow(clippy::cast_possible_truncation)]
    Ok(depth as u8)
}

/// Validates that an account may be deactivated.
///
/// Deactivation is a semantic rule, not referential integrity: an account
/// with active children or posted lines stays active.
///
/// # Errors
///
/// Returns `HasActiveChildAccounts` or `HasPostedLines` on violation.
pub fn validate_deactivation(
    has_active_children: bool,
    has_posted_lines: bool,
) -> Result<(), AccountError> {
    if has_active_children {
        return Err(AccountError::HasActiveChildAccounts);
    }
    if has_posted_lines {
        return Err(AccountError::HasPostedLines);
    }
    Ok(())
}

/// Validates the retained-earnings flag for an account.
///
/// # Errors
///
/// Returns `RetainedEarningsNotEquity` if the account is not an equity
/// account, or `RetainedEarningsAlreadyConfigured` if the company already
/// has one.
pub fn validate_retained_earnings(
    account_type: super::types::AccountType,
    company_already_has_one: bool,
) -> Result<(), AccountError> {
    if account_type != super::types::AccountType::Equity {
        return Err(AccountError::RetainedEarningsNotEquity);
    }
    if company_already_has_one {
        return Err(AccountError::RetainedEarningsAlreadyConfigured);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::types::{AccountType, NormalBalance};
    use std::collections::HashMap;

    fn make_account(id: AccountId, company_id: CompanyId, active: bool) -> Account {
        Account {
            id,
            company_id,
            number: "1000".to_string(),
            name: "Cash".to_string(),
            account_type: AccountType::Asset,
            category: "current_asset".to_string(),
            normal_balance: NormalBalance::Debit,
            parent_account_id: None,
            hierarchy_level: 1,
            is_postable: true,
            cash_flow_category: None,
            is_intercompany: false,
            intercompany_partner_id: None,
            currency_restriction: None,
            is_retained_earnings: false,
            is_active: active,
        }
    }

    /// Builds a `parent_of` closure over a parent-edge map.
    fn lookup(
        edges: &HashMap<AccountId, Option<AccountId>>,
    ) -> impl Fn(AccountId) -> Option<Option<AccountId>> + '_ {
        move |id| edges.get(&id).copied()
    }

    #[test]
    fn test_validate_parent_same_company() {
        let company = CompanyId::new();
        let parent = make_account(AccountId::new(), company, true);
        assert!(validate_parent(company, &parent).is_ok());
    }

    #[test]
    fn test_validate_parent_other_company() {
        let parent = make_account(AccountId::new(), CompanyId::new(), true);
        assert!(matches!(
            validate_parent(CompanyId::new(), &parent),
            Err(AccountError::ParentCompanyMismatch)
        ));
    }

    #[test]
    fn test_validate_parent_inactive() {
        let company = CompanyId::new();
        let parent = make_account(AccountId::new(), company, false);
        assert!(matches!(
            validate_parent(company, &parent),
            Err(AccountError::Inactive(_))
        ));
    }

    #[test]
    fn test_placement_depth() {
        // root <- a <- b, placing new account under b = depth 4
        let root = AccountId::new();
        let a = AccountId::new();
        let b = AccountId::new();
        let mut edges = HashMap::new();
        edges.insert(root, None);
        edges.insert(a, Some(root));
        edges.insert(b, Some(a));

        let depth = validate_placement(None, b, lookup(&edges)).unwrap();
        assert_eq!(depth, 4);
    }

    #[test]
    fn test_placement_detects_direct_cycle() {
        let a = AccountId::new();
        let mut edges = HashMap::new();
        edges.insert(a, None);

        // a cannot become its own parent
        assert!(matches!(
            validate_placement(Some(a), a, lookup(&edges)),
            Err(AccountError::CircularHierarchy)
        ));
    }

    #[test]
    fn test_placement_detects_ancestor_cycle() {
        // a <- b <- c; moving a under c would close the loop
        let a = AccountId::new();
        let b = AccountId::new();
        let c = AccountId::new();
        let mut edges = HashMap::new();
        edges.insert(a, None);
        edges.insert(b, Some(a));
        edges.insert(c, Some(b));

        assert!(matches!(
            validate_placement(Some(a), c, lookup(&edges)),
            Err(AccountError::CircularHierarchy)
        ));
    }

    #[test]
    fn test_placement_depth_limit() {
        // Chain of 6 accounts; adding a 7th level must fail.
        let ids: Vec<AccountId> = (0..6).map(|_| AccountId::new()).collect();
        let mut edges = HashMap::new();
        edges.insert(ids[0], None);
        for i in 1..6 {
            edges.insert(ids[i], Some(ids[i - 1]));
        }

        assert!(matches!(
            validate_placement(None, ids[5], lookup(&edges)),
            Err(AccountError::HierarchyTooDeep { max: 6 })
        ));

        // Placing under the 5th element (depth 6) is still fine.
        assert_eq!(validate_placement(None, ids[4], lookup(&edges)).unwrap(), 6);
    }

    #[test]
    fn test_placement_missing_parent() {
        let orphan = AccountId::new();
        let edges = HashMap::new();
        assert!(matches!(
            validate_placement(None, orphan, lookup(&edges)),
            Err(AccountError::ParentNotFound(_))
        ));
    }

    #[test]
    fn test_deactivation_guards() {
        assert!(validate_deactivation(false, false).is_ok());
        assert!(matches!(
            validate_deactivation(true, false),
            Err(AccountError::HasActiveChildAccounts)
        ));
        assert!(matches!(
            validate_deactivation(false, true),
            Err(AccountError::HasPostedLines)
        ));
    }

    #[test]
    fn test_retained_earnings_rules() {
        assert!(validate_retained_earnings(AccountType::Equity, false).is_ok());
        assert!(matches!(
            validate_retained_earnings(AccountType::Revenue, false),
            Err(AccountError::RetainedEarningsNotEquity)
        ));
        assert!(matches!(
            validate_retained_earnings(AccountType::Equity, true),
            Err(AccountError::RetainedEarningsAlreadyConfigured)
        ));
    }
}
