//! Step 3: aggregation across members.

use std::collections::BTreeMap;

use crate::consolidation::types::{
    AggregatedBalance, ConsolidationGroup, ConsolidationMethod, IssueSeverity,
    MemberTrialBalance, ValidationIssue,
};

/// Aggregates translated member balances per account-number key.
///
/// Accounts sharing a number but diverging in (type, category) across
/// members are kept as separate rows and reported as warnings.
/// Equity-method members are excluded: their accounts never aggregate
/// line by line (the NCI step brings in the equity pickup instead).
#[must_use]
pub fn aggregate(
    group: &ConsolidationGroup,
    translated: &[MemberTrialBalance],
) -> (Vec<AggregatedBalance>, Vec<ValidationIssue>) {
    // Key: (number, type, category). BTreeMap keeps output deterministic.
    let mut buckets: BTreeMap<(String, String, String), AggregatedBalance> = BTreeMap::new();

    for tb in translated {
        let equity_method = group
            .member(tb.company_id)
            .is_some_and(|m| m.method == ConsolidationMethod::EquityMethod);
        if equity_method {
            continue;
        }

        for row in &tb.rows {
            let key = (
                row.account_number.clone(),
                row.account_type.to_string(),
                row.category.clone(),
            );
            let bucket = buckets.entry(key).or_insert_with(|| AggregatedBalance {
                account_number: row.account_number.clone(),
                account_name: row.account_name.clone(),
                account_type: row.account_type,
                category: row.category.clone(),
                is_intercompany: false,
                amount: rust_decimal::Decimal::ZERO,
                member_count: 0,
            });
            bucket.amount += row.balance;
            bucket.member_count += 1;
            bucket.is_intercompany |= row.is_intercompany;
        }
    }

    let rows: Vec<AggregatedBalance> = buckets.into_values().collect();

    // Same number split over several semantic keys means members disagree
    // on what the number represents.
    let mut warnings = Vec::new();
    let mut per_number: BTreeMap<&str, u32> = BTreeMap::new();
    for row in &rows {
        *per_number.entry(row.account_number.as_str()).or_default() += 1;
    }
    for (number, count) in per_number {
        if count > 1 {
            warnings.push(ValidationIssue {
                severity: IssueSeverity::Warning,
                code: "divergent_account_semantics".to_string(),
                message: format!(
                    "Account number {number} maps to {count} different (type, category) \
                     combinations across members; rows kept separate"
                ),
            });
        }
    }

    (rows, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountType;
    use crate::consolidation::types::{GroupMember, MemberBalance};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn member(company_id: Uuid, method: ConsolidationMethod) -> GroupMember {
        GroupMember {
            company_id,
            ownership_percentage: dec!(100),
            method,
            acquisition_date: None,
            goodwill: Decimal::ZERO,
            is_vie: false,
        }
    }

    fn make_group(members: Vec<GroupMember>) -> ConsolidationGroup {
        ConsolidationGroup {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            name: "G".to_string(),
            reporting_currency: "USD".to_string(),
            parent_company_id: members[0].company_id,
            members,
            is_active: true,
        }
    }

    fn row(number: &str, account_type: AccountType, category: &str, balance: Decimal) -> MemberBalance {
        MemberBalance {
            account_id: Uuid::new_v4(),
            account_number: number.to_string(),
            account_name: format!("Account {number}"),
            account_type,
            category: category.to_string(),
            is_intercompany: false,
            balance,
        }
    }

    fn tb(company_id: Uuid, rows: Vec<MemberBalance>) -> MemberTrialBalance {
        MemberTrialBalance {
            company_id,
            company_name: "Co".to_string(),
            currency: "USD".to_string(),
            rows,
        }
    }

    #[test]
    fn test_sums_matching_accounts_across_members() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let group = make_group(vec![
            member(a, ConsolidationMethod::FullConsolidation),
            member(b, ConsolidationMethod::FullConsolidation),
        ]);
        let tbs = vec![
            tb(a, vec![row("1010", AccountType::Asset, "current_asset", dec!(100))]),
            tb(b, vec![row("1010", AccountType::Asset, "current_asset", dec!(50))]),
        ];

        let (rows, warnings) = aggregate(&group, &tbs);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].amount, dec!(150));
        assert_eq!(rows[0].member_count, 2);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_divergent_semantics_kept_separate_with_warning() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let group = make_group(vec![
            member(a, ConsolidationMethod::FullConsolidation),
            member(b, ConsolidationMethod::FullConsolidation),
        ]);
        let tbs = vec![
            tb(a, vec![row("5000", AccountType::Expense, "cost_of_goods_sold", dec!(100))]),
            tb(b, vec![row("5000", AccountType::Expense, "cost_of_services", dec!(70))]),
        ];

        let (rows, warnings) = aggregate(&group, &tbs);
        assert_eq!(rows.len(), 2);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code, "divergent_account_semantics");
    }

    #[test]
    fn test_equity_method_members_are_skipped() {
        let parent = Uuid::new_v4();
        let associate = Uuid::new_v4();
        let group = make_group(vec![
            member(parent, ConsolidationMethod::FullConsolidation),
            member(associate, ConsolidationMethod::EquityMethod),
        ]);
        let tbs = vec![
            tb(parent, vec![row("1010", AccountType::Asset, "current_asset", dec!(100))]),
            tb(associate, vec![row("1010", AccountType::Asset, "current_asset", dec!(999))]),
        ];

        let (rows, _) = aggregate(&group, &tbs);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].amount, dec!(100));
        assert_eq!(rows[0].member_count, 1);
    }

    #[test]
    fn test_output_is_sorted_and_deterministic() {
        let a = Uuid::new_v4();
        let group = make_group(vec![member(a, ConsolidationMethod::FullConsolidation)]);
        let tbs = vec![tb(
            a,
            vec![
                row("4000", AccountType::Revenue, "operating_revenue", dec!(-10)),
                row("1010", AccountType::Asset, "current_asset", dec!(10)),
            ],
        )];

        let (rows, _) = aggregate(&group, &tbs);
        let numbers: Vec<&str> = rows.iter().map(|r| r.account_number.as_str()).collect();
        assert_eq!(numbers, vec!["1010", "4000"]);
    }

    #[test]
    fn test_intercompany_flag_propagates() {
        let a = Uuid::new_v4();
        let group = make_group(vec![member(a, ConsolidationMethod::FullConsolidation)]);
        let mut ic_row = row("1600", AccountType::Asset, "intercompany", dec!(25));
        ic_row.is_intercompany = true;
        let tbs = vec![tb(a, vec![ic_row])];

        let (rows, _) = aggregate(&group, &tbs);
        assert!(rows[0].is_intercompany);
    }
}
