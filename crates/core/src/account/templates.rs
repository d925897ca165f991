//! Chart-of-accounts templates.
//!
//! A template seeds a complete chart for a new company in one atomic
//! operation. Application fails if the company already has any account.

use serde::{Deserialize, Serialize};

use super::types::{AccountType, CashFlowCategory};

/// Available chart-of-accounts templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoaTemplate {
    /// Generic trading/services business.
    GeneralBusiness,
    /// Manufacturing company with inventory and WIP accounts.
    Manufacturing,
    /// Service business without inventory.
    ServiceBusiness,
    /// Holding company with investment and intercompany accounts.
    HoldingCompany,
}

/// One account row in a template.
#[derive(Debug, Clone)]
pub struct TemplateAccount {
    /// 4-digit account number.
    pub number: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Fundamental account type.
    pub account_type: AccountType,
    /// Reporting category.
    pub category: &'static str,
    /// Cash flow classification.
    pub cash_flow_category: Option<CashFlowCategory>,
    /// Whether lines may post here directly (summary accounts are not
    /// postable).
    pub is_postable: bool,
    /// Parent account number within the same template.
    pub parent_number: Option<&'static str>,
    /// Marks the company's retained earnings account.
    pub is_retained_earnings: bool,
    /// Marks intercompany accounts.
    pub is_intercompany: bool,
}

impl TemplateAccount {
    const fn new(
        number: &'static str,
        name: &'static str,
        account_type: AccountType,
        category: &'static str,
    ) -> Self {
        Self {
            number,
            name,
            account_type,
            category,
            cash_flow_category: None,
            is_postable: true,
            parent_number: None,
            is_retained_earnings: false,
            is_intercompany: false,
        }
    }

    const fn summary(mut self) -> Self {
        self.is_postable = false;
        self
    }

    const fn under(mut self, parent: &'static str) -> Self {
        self.parent_number = Some(parent);
        self
    }

    const fn cash_flow(mut self, category: CashFlowCategory) -> Self {
        self.cash_flow_category = Some(category);
        self
    }

    const fn retained_earnings(mut self) -> Self {
        self.is_retained_earnings = true;
        self
    }

    const fn intercompany(mut self) -> Self {
        self.is_intercompany = true;
        self
    }
}

impl CoaTemplate {
    /// Returns the accounts of this template, parents before children.
    #[must_use]
    pub fn accounts(self) -> Vec<TemplateAccount> {
        use AccountType::{Asset, Equity, Expense, Liability, Revenue};
        use CashFlowCategory::{Financing, Investing, Operating};
        use TemplateAccount as T;

        let mut accounts = vec![
            // Shared backbone: every template carries the same skeleton.
            T::new("1000", "Current Assets", Asset, "current_asset").summary(),
            T::new("1010", "Cash", Asset, "current_asset")
                .under("1000")
                .cash_flow(Operating),
            T::new("1100", "Accounts Receivable", Asset, "current_asset")
                .under("1000")
                .cash_flow(Operating),
            T::new("2000", "Current Liabilities", Liability, "current_liability").summary(),
            T::new("2010", "Accounts Payable", Liability, "current_liability")
                .under("2000")
                .cash_flow(Operating),
            T::new("2100", "Accrued Liabilities", Liability, "current_liability")
                .under("2000")
                .cash_flow(Operating),
            T::new("2500", "Long-Term Debt", Liability, "long_term_liability").cash_flow(Financing),
            T::new("3000", "Contributed Capital", Equity, "contributed_capital")
                .cash_flow(Financing),
            T::new("3100", "Retained Earnings", Equity, "retained_earnings").retained_earnings(),
            T::new(
                "3900",
                "Accumulated Other Comprehensive Income",
                Equity,
                "accumulated_oci",
            ),
        ];

        match self {
            Self::GeneralBusiness => accounts.extend([
                T::new("1200", "Inventory", Asset, "current_asset")
                    .under("1000")
                    .cash_flow(Operating),
                T::new("1500", "Fixed Assets", Asset, "fixed_asset").cash_flow(Investing),
                T::new("1510", "Accumulated Depreciation", Asset, "fixed_asset"),
                T::new("4000", "Sales Revenue", Revenue, "operating_revenue"),
                T::new("4900", "Other Income", Revenue, "other_revenue"),
                T::new("5000", "Cost of Goods Sold", Expense, "cost_of_goods_sold"),
                T::new("6000", "Operating Expenses", Expense, "operating_expense").summary(),
                T::new("6010", "Salaries and Wages", Expense, "operating_expense").under("6000"),
                T::new("6020", "Rent Expense", Expense, "operating_expense").under("6000"),
                T::new("6100", "Depreciation Expense", Expense, "operating_expense").under("6000"),
                T::new("7000", "Interest Expense", Expense, "other_expense"),
            ]),
            Self::Manufacturing => accounts.extend([
                T::new("1200", "Raw Materials", Asset, "current_asset")
                    .under("1000")
                    .cash_flow(Operating),
                T::new("1210", "Work in Progress", Asset, "current_asset")
                    .under("1000")
                    .cash_flow(Operating),
                T::new("1220", "Finished Goods", Asset, "current_asset")
                    .under("1000")
                    .cash_flow(Operating),
                T::new("1500", "Plant and Machinery", Asset, "fixed_asset").cash_flow(Investing),
                T::new("1510", "Accumulated Depreciation", Asset, "fixed_asset"),
                T::new("4000", "Product Revenue", Revenue, "operating_revenue"),
                T::new("5000", "Direct Materials", Expense, "cost_of_goods_sold"),
                T::new("5010", "Direct Labor", Expense, "cost_of_goods_sold"),
                T::new("5020", "Manufacturing Overhead", Expense, "cost_of_goods_sold"),
                T::new("6000", "Operating Expenses", Expense, "operating_expense").summary(),
                T::new("6010", "Salaries and Wages", Expense, "operating_expense").under("6000"),
                T::new("6100", "Depreciation Expense", Expense, "operating_expense").under("6000"),
            ]),
            Self::ServiceBusiness => accounts.extend([
                T::new("1300", "Unbilled Receivables", Asset, "current_asset")
                    .under("1000")
                    .cash_flow(Operating),
                T::new("2200", "Deferred Revenue", Liability, "current_liability")
                    .under("2000")
                    .cash_flow(Operating),
                T::new("4000", "Service Revenue", Revenue, "operating_revenue"),
                T::new("5000", "Cost of Services", Expense, "cost_of_services"),
                T::new("6000", "Operating Expenses", Expense, "operating_expense").summary(),
                T::new("6010", "Salaries and Wages", Expense, "operating_expense").under("6000"),
                T::new("6020", "Professional Fees", Expense, "operating_expense").under("6000"),
                T::new("6030", "Software and Tools", Expense, "operating_expense").under("6000"),
            ]),
            Self::HoldingCompany => accounts.extend([
                T::new("1400", "Investments in Subsidiaries", Asset, "investment")
                    .cash_flow(Investing),
                T::new("1450", "Goodwill", Asset, "intangible_asset"),
                T::new("1600", "Intercompany Receivable", Asset, "intercompany")
                    .intercompany(),
                T::new("2600", "Intercompany Payable", Liability, "intercompany")
                    .intercompany(),
                T::new("3500", "Non-Controlling Interest", Equity, "non_controlling_interest"),
                T::new("4100", "Dividend Income", Revenue, "other_revenue"),
                T::new("4200", "Intercompany Revenue", Revenue, "intercompany").intercompany(),
                T::new("5200", "Intercompany Expense", Expense, "intercompany").intercompany(),
                T::new("6000", "Management Fees", Expense, "operating_expense"),
            ]),
        }

        accounts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_templates_have_unique_numbers() {
        for template in [
            CoaTemplate::GeneralBusiness,
            CoaTemplate::Manufacturing,
            CoaTemplate::ServiceBusiness,
            CoaTemplate::HoldingCompany,
        ] {
            let accounts = template.accounts();
            let numbers: HashSet<_> = accounts.iter().map(|a| a.number).collect();
            assert_eq!(numbers.len(), accounts.len(), "{template:?} has duplicates");
        }
    }

    #[test]
    fn test_templates_have_exactly_one_retained_earnings() {
        for template in [
            CoaTemplate::GeneralBusiness,
            CoaTemplate::Manufacturing,
            CoaTemplate::ServiceBusiness,
            CoaTemplate::HoldingCompany,
        ] {
            let count = template
                .accounts()
                .iter()
                .filter(|a| a.is_retained_earnings)
                .count();
            assert_eq!(count, 1, "{template:?}");
        }
    }

    #[test]
    fn test_parents_precede_children() {
        for template in [
            CoaTemplate::GeneralBusiness,
            CoaTemplate::Manufacturing,
            CoaTemplate::ServiceBusiness,
            CoaTemplate::HoldingCompany,
        ] {
            let mut seen = HashSet::new();
            for account in template.accounts() {
                if let Some(parent) = account.parent_number {
                    assert!(seen.contains(parent), "{template:?}: {parent} after child");
                }
                seen.insert(account.number);
            }
        }
    }

    #[test]
    fn test_retained_earnings_is_equity() {
        for template in [
            CoaTemplate::GeneralBusiness,
            CoaTemplate::Manufacturing,
            CoaTemplate::ServiceBusiness,
            CoaTemplate::HoldingCompany,
        ] {
            for account in template.accounts() {
                if account.is_retained_earnings {
                    assert_eq!(account.account_type, AccountType::Equity);
                }
            }
        }
    }

    #[test]
    fn test_holding_template_carries_intercompany_accounts() {
        let accounts = CoaTemplate::HoldingCompany.accounts();
        assert!(accounts.iter().any(|a| a.is_intercompany));
        assert!(accounts.iter().any(|a| a.number == "1400"));
        assert!(accounts.iter().any(|a| a.number == "3500"));
    }

    #[test]
    fn test_all_numbers_are_four_digits() {
        for template in [
            CoaTemplate::GeneralBusiness,
            CoaTemplate::Manufacturing,
            CoaTemplate::ServiceBusiness,
            CoaTemplate::HoldingCompany,
        ] {
            for account in template.accounts() {
                assert!(crate::account::types::validate_number(account.number).is_ok());
            }
        }
    }
}
