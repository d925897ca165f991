//! Step 6: non-controlling interest.
//!
//! For partially-owned, fully-consolidated subsidiaries the NCI share of
//! equity and current income reclassifies into the Non-Controlling
//! Interest row; the parent retains the controlling share. Equity-method
//! members contribute a single-line pickup of the owner's share of their
//! net income instead of line-by-line aggregation.

use meridian_shared::types::money::bankers_round;
use rust_decimal::Decimal;

use crate::account::AccountType;

use super::types::{
    ConsolidationGroup, ConsolidationMethod, EliminationLine, MemberTrialBalance,
    NciAllocation, NciResult,
};

/// Scale of NCI adjustments in reporting currency.
const NCI_SCALE: u32 = 2;

/// Account number of the Non-Controlling Interest equity row.
pub const NCI_ACCOUNT_NUMBER: &str = "3500";
/// Name of the Non-Controlling Interest row.
pub const NCI_ACCOUNT_NAME: &str = "Non-Controlling Interest";

/// Account number of the investment row carrying equity pickups.
pub const INVESTMENT_ACCOUNT_NUMBER: &str = "1400";
/// Account number of the equity-in-earnings row.
pub const EQUITY_EARNINGS_ACCOUNT_NUMBER: &str = "4300";

/// Runs the NCI step over translated member trial balances.
#[must_use]
pub fn allocate_nci(
    group: &ConsolidationGroup,
    translated: &[MemberTrialBalance],
) -> NciResult {
    let mut result = NciResult::default();
    let mut nci_total = Decimal::ZERO;

    for tb in translated {
        let Some(member) = group.member(tb.company_id) else {
            continue;
        };

        match member.method {
            ConsolidationMethod::FullConsolidation => {
                let nci_pct = member.nci_percentage();
                if nci_pct <= Decimal::ZERO {
                    continue;
                }
                let fraction = nci_pct / Decimal::ONE_HUNDRED;

                // Strip the NCI share out of every equity and income
                // statement row; the offset accumulates into the NCI row.
                let mut member_nci = Decimal::ZERO;
                for row in &tb.rows {
                    let relevant = row.account_type == AccountType::Equity
                        || row.account_type.is_income_statement();
                    if !relevant || row.balance.is_zero() {
                        continue;
                    }
                    let share = bankers_round(-row.balance * fraction, NCI_SCALE);
                    if share.is_zero() {
                        continue;
                    }
                    // Equity rows carry credit balances: the adjustment is
                    // a debit on the row, mirrored as a credit to NCI.
                    result.adjustments.push(EliminationLine {
                        account_number: row.account_number.clone(),
                        account_name: row.account_name.clone(),
                        account_type: row.account_type,
                        category: row.category.clone(),
                        amount: share,
                    });
                    member_nci += share;
                }

                if !member_nci.is_zero() {
                    nci_total += member_nci;
                    result.allocations.push(NciAllocation {
                        company_id: tb.company_id,
                        nci_percentage: nci_pct,
                        share_of_net_assets: bankers_round(
                            tb.equity_and_income() * fraction,
                            NCI_SCALE,
                        ),
                        share_of_net_income: bankers_round(
                            tb.net_income() * fraction,
                            NCI_SCALE,
                        ),
                    });
                }
            }
            ConsolidationMethod::EquityMethod => {
                let fraction = member.ownership_percentage / Decimal::ONE_HUNDRED;
                let pickup = bankers_round(tb.net_income() * fraction, NCI_SCALE);
                if pickup.is_zero() {
                    continue;
                }
                // Debit the investment, credit equity in earnings.
                result.adjustments.push(EliminationLine {
                    account_number: INVESTMENT_ACCOUNT_NUMBER.to_string(),
                    account_name: "Investments in Subsidiaries".to_string(),
                    account_type: AccountType::Asset,
                    category: "investment".to_string(),
                    amount: pickup,
                });
                result.adjustments.push(EliminationLine {
                    account_number: EQUITY_EARNINGS_ACCOUNT_NUMBER.to_string(),
                    account_name: "Equity in Earnings of Affiliates".to_string(),
                    account_type: AccountType::Revenue,
                    category: "other_revenue".to_string(),
                    amount: -pickup,
                });
                result.equity_pickups.push(NciAllocation {
                    company_id: tb.company_id,
                    nci_percentage: member.nci_percentage(),
                    share_of_net_assets: Decimal::ZERO,
                    share_of_net_income: pickup,
                });
            }
        }
    }

    if !nci_total.is_zero() {
        result.adjustments.push(EliminationLine {
            account_number: NCI_ACCOUNT_NUMBER.to_string(),
            account_name: NCI_ACCOUNT_NAME.to_string(),
            account_type: AccountType::Equity,
            category: "non_controlling_interest".to_string(),
            amount: -nci_total,
        });
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consolidation::types::{GroupMember, MemberBalance};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn member(
        company_id: Uuid,
        ownership: Decimal,
        method: ConsolidationMethod,
    ) -> GroupMember {
        GroupMember {
            company_id,
            ownership_percentage: ownership,
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

    fn row(number: &str, account_type: AccountType, balance: Decimal) -> MemberBalance {
        MemberBalance {
            account_id: Uuid::new_v4(),
            account_number: number.to_string(),
            account_name: format!("Account {number}"),
            account_type,
            category: "test".to_string(),
            is_intercompany: false,
            balance,
        }
    }

    fn sub_tb(company_id: Uuid) -> MemberTrialBalance {
        MemberTrialBalance {
            company_id,
            company_name: "Sub".to_string(),
            currency: "USD".to_string(),
            rows: vec![
                row("1010", AccountType::Asset, dec!(1500)),
                row("3000", AccountType::Equity, dec!(-1000)),
                row("4000", AccountType::Revenue, dec!(-800)),
                row("6000", AccountType::Expense, dec!(300)),
            ],
        }
    }

    #[test]
    fn test_wholly_owned_member_produces_no_nci() {
        let sub = Uuid::new_v4();
        let group = make_group(vec![member(
            sub,
            dec!(100),
            ConsolidationMethod::FullConsolidation,
        )]);
        let result = allocate_nci(&group, &[sub_tb(sub)]);
        assert!(result.adjustments.is_empty());
        assert!(result.allocations.is_empty());
    }

    #[test]
    fn test_partial_ownership_allocates_nci() {
        let sub = Uuid::new_v4();
        let group = make_group(vec![member(
            sub,
            dec!(80),
            ConsolidationMethod::FullConsolidation,
        )]);
        let result = allocate_nci(&group, &[sub_tb(sub)]);

        // Equity 1000 + net income 500, NCI 20% = 300.
        let allocation = &result.allocations[0];
        assert_eq!(allocation.nci_percentage, dec!(20));
        assert_eq!(allocation.share_of_net_assets, dec!(300.00));
        assert_eq!(allocation.share_of_net_income, dec!(100.00));

        // Adjustments balance: equity/income debits against the NCI credit.
        let total: Decimal = result.adjustments.iter().map(|l| l.amount).sum();
        assert!(total.is_zero());

        let nci_row = result
            .adjustments
            .iter()
            .find(|l| l.account_number == NCI_ACCOUNT_NUMBER)
            .unwrap();
        assert_eq!(nci_row.amount, dec!(-300.00));
        assert_eq!(nci_row.account_type, AccountType::Equity);
    }

    #[test]
    fn test_equity_method_single_line_pickup() {
        let parent = Uuid::new_v4();
        let associate = Uuid::new_v4();
        let group = make_group(vec![
            member(parent, dec!(100), ConsolidationMethod::FullConsolidation),
            member(associate, dec!(30), ConsolidationMethod::EquityMethod),
        ]);

        let result = allocate_nci(&group, &[sub_tb(associate)]);

        // 30% of 500 net income = 150 pickup.
        assert_eq!(result.equity_pickups.len(), 1);
        assert_eq!(result.equity_pickups[0].share_of_net_income, dec!(150.00));

        let investment = result
            .adjustments
            .iter()
            .find(|l| l.account_number == INVESTMENT_ACCOUNT_NUMBER)
            .unwrap();
        assert_eq!(investment.amount, dec!(150.00));
        let earnings = result
            .adjustments
            .iter()
            .find(|l| l.account_number == EQUITY_EARNINGS_ACCOUNT_NUMBER)
            .unwrap();
        assert_eq!(earnings.amount, dec!(-150.00));

        // Balanced overall.
        let total: Decimal = result.adjustments.iter().map(|l| l.amount).sum();
        assert!(total.is_zero());
    }

    #[test]
    fn test_nonmember_trial_balances_are_ignored() {
        let sub = Uuid::new_v4();
        let group = make_group(vec![member(
            sub,
            dec!(80),
            ConsolidationMethod::FullConsolidation,
        )]);
        let stranger = sub_tb(Uuid::new_v4());
        let result = allocate_nci(&group, &[stranger]);
        assert!(result.adjustments.is_empty());
    }
}
