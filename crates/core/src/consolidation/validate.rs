//! Step 1: structural validation.

use rust_decimal::Decimal;

use crate::fiscal::FiscalPeriodStatus;

use super::error::ConsolidationError;
use super::types::{
    ConsolidationGroup, IssueSeverity, MemberTrialBalance, RunOptions, ValidationIssue,
    ValidationReport,
};

/// Company attributes Validate needs per member.
#[derive(Debug, Clone)]
pub struct MemberCompanyInfo {
    /// The company.
    pub company_id: uuid::Uuid,
    /// Display name.
    pub name: String,
    /// Whether the company is active.
    pub is_active: bool,
}

/// Runs the Validate step.
///
/// Errors: inactive group, missing/inactive member companies, fiscal
/// period not Closed (unless `skip_validation`), unbalanced member trial
/// balances. Warnings: intercompany imbalances (net intercompany-flagged
/// balance across the group differs from zero).
///
/// # Errors
///
/// Returns `ValidationFailed` carrying the report when blocking issues
/// remain after applying `continue_on_warnings`.
pub fn validate(
    group: &ConsolidationGroup,
    companies: &[MemberCompanyInfo],
    member_tbs: &[MemberTrialBalance],
    period_status: Option<FiscalPeriodStatus>,
    options: RunOptions,
) -> Result<ValidationReport, ConsolidationError> {
    let mut report = ValidationReport::default();

    if !group.is_active {
        report.issues.push(ValidationIssue {
            severity: IssueSeverity::Error,
            code: "group_inactive".to_string(),
            message: format!("Group {} is inactive", group.name),
        });
    }

    for member in &group.members {
        match companies.iter().find(|c| c.company_id == member.company_id) {
            None => report.issues.push(ValidationIssue {
                severity: IssueSeverity::Error,
                code: "member_missing".to_string(),
                message: format!("Member company {} does not exist", member.company_id),
            }),
            Some(company) if !company.is_active => report.issues.push(ValidationIssue {
                severity: IssueSeverity::Error,
                code: "member_inactive".to_string(),
                message: format!("Member company {} is deactivated", company.name),
            }),
            Some(_) => {}
        }
    }

    if !options.skip_validation {
        match period_status {
            Some(FiscalPeriodStatus::Closed) => {}
            Some(FiscalPeriodStatus::Open) => report.issues.push(ValidationIssue {
                severity: IssueSeverity::Error,
                code: "period_open".to_string(),
                message: "Fiscal period for the run date is still open".to_string(),
            }),
            None => report.issues.push(ValidationIssue {
                severity: IssueSeverity::Error,
                code: "period_missing".to_string(),
                message: "No fiscal period covers the run date".to_string(),
            }),
        }
    }

    for tb in member_tbs {
        let imbalance = tb.imbalance();
        if !imbalance.is_zero() {
            report.issues.push(ValidationIssue {
                severity: IssueSeverity::Error,
                code: "member_tb_unbalanced".to_string(),
                message: format!(
                    "Trial balance of {} is out of balance by {}",
                    tb.company_name, imbalance
                ),
            });
        }
    }

    // Intercompany balances should net to zero across the group; record an
    // imbalance as a warning for the elimination steps to surface.
    let ic_net: Decimal = member_tbs
        .iter()
        .flat_map(|tb| tb.rows.iter())
        .filter(|r| r.is_intercompany)
        .map(|r| r.balance)
        .sum();
    if !ic_net.is_zero() {
        report.issues.push(ValidationIssue {
            severity: IssueSeverity::Warning,
            code: "intercompany_imbalance".to_string(),
            message: format!("Intercompany balances do not net to zero: {ic_net}"),
        });
    }

    let blocking = report.has_errors()
        || (report.has_warnings() && !options.continue_on_warnings);
    if blocking {
        return Err(ConsolidationError::ValidationFailed { report });
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountType;
    use crate::consolidation::types::{ConsolidationMethod, GroupMember, MemberBalance};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn make_group(member_ids: &[Uuid]) -> ConsolidationGroup {
        ConsolidationGroup {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            name: "Group".to_string(),
            reporting_currency: "USD".to_string(),
            parent_company_id: member_ids[0],
            members: member_ids
                .iter()
                .map(|id| GroupMember {
                    company_id: *id,
                    ownership_percentage: dec!(100),
                    method: ConsolidationMethod::FullConsolidation,
                    acquisition_date: None,
                    goodwill: Decimal::ZERO,
                    is_vie: false,
                })
                .collect(),
            is_active: true,
        }
    }

    fn company(id: Uuid, active: bool) -> MemberCompanyInfo {
        MemberCompanyInfo {
            company_id: id,
            name: format!("Company {id}"),
            is_active: active,
        }
    }

    fn balanced_tb(company_id: Uuid) -> MemberTrialBalance {
        MemberTrialBalance {
            company_id,
            company_name: "Co".to_string(),
            currency: "USD".to_string(),
            rows: vec![
                MemberBalance {
                    account_id: Uuid::new_v4(),
                    account_number: "1010".to_string(),
                    account_name: "Cash".to_string(),
                    account_type: AccountType::Asset,
                    category: "current_asset".to_string(),
                    is_intercompany: false,
                    balance: dec!(100),
                },
                MemberBalance {
                    account_id: Uuid::new_v4(),
                    account_number: "3000".to_string(),
                    account_name: "Capital".to_string(),
                    account_type: AccountType::Equity,
                    category: "contributed_capital".to_string(),
                    is_intercompany: false,
                    balance: dec!(-100),
                },
            ],
        }
    }

    #[test]
    fn test_clean_validation_passes() {
        let ids = [Uuid::new_v4(), Uuid::new_v4()];
        let group = make_group(&ids);
        let companies: Vec<_> = ids.iter().map(|id| company(*id, true)).collect();
        let tbs: Vec<_> = ids.iter().map(|id| balanced_tb(*id)).collect();

        let report = validate(
            &group,
            &companies,
            &tbs,
            Some(FiscalPeriodStatus::Closed),
            RunOptions::default(),
        )
        .unwrap();
        assert!(report.issues.is_empty());
    }

    #[test]
    fn test_inactive_group_fails() {
        let ids = [Uuid::new_v4()];
        let mut group = make_group(&ids);
        group.is_active = false;
        let companies = vec![company(ids[0], true)];

        let err = validate(
            &group,
            &companies,
            &[],
            Some(FiscalPeriodStatus::Closed),
            RunOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ConsolidationError::ValidationFailed { .. }));
    }

    #[test]
    fn test_missing_and_inactive_members_fail() {
        let ids = [Uuid::new_v4(), Uuid::new_v4()];
        let group = make_group(&ids);
        // Second member missing entirely, first deactivated.
        let companies = vec![company(ids[0], false)];

        let err = validate(
            &group,
            &companies,
            &[],
            Some(FiscalPeriodStatus::Closed),
            RunOptions::default(),
        )
        .unwrap_err();
        let ConsolidationError::ValidationFailed { report } = err else {
            panic!("expected ValidationFailed");
        };
        let codes: Vec<_> = report.issues.iter().map(|i| i.code.as_str()).collect();
        assert!(codes.contains(&"member_inactive"));
        assert!(codes.contains(&"member_missing"));
    }

    #[test]
    fn test_open_period_fails_unless_skipped() {
        let ids = [Uuid::new_v4()];
        let group = make_group(&ids);
        let companies = vec![company(ids[0], true)];

        assert!(validate(
            &group,
            &companies,
            &[],
            Some(FiscalPeriodStatus::Open),
            RunOptions::default(),
        )
        .is_err());

        let options = RunOptions {
            skip_validation: true,
            ..RunOptions::default()
        };
        assert!(validate(
            &group,
            &companies,
            &[],
            Some(FiscalPeriodStatus::Open),
            options,
        )
        .is_ok());
    }

    #[test]
    fn test_unbalanced_member_tb_fails() {
        let ids = [Uuid::new_v4()];
        let group = make_group(&ids);
        let companies = vec![company(ids[0], true)];
        let mut tb = balanced_tb(ids[0]);
        tb.rows[0].balance = dec!(150); // now off by 50

        assert!(validate(
            &group,
            &companies,
            std::slice::from_ref(&tb),
            Some(FiscalPeriodStatus::Closed),
            RunOptions::default(),
        )
        .is_err());
    }

    #[test]
    fn test_ic_imbalance_is_warning_gated_by_option() {
        let ids = [Uuid::new_v4()];
        let group = make_group(&ids);
        let companies = vec![company(ids[0], true)];
        let mut tb = balanced_tb(ids[0]);
        tb.rows[0].is_intercompany = true; // +100 IC, nothing offsetting

        // Without continue_on_warnings the warning blocks the run.
        assert!(validate(
            &group,
            &companies,
            std::slice::from_ref(&tb),
            Some(FiscalPeriodStatus::Closed),
            RunOptions::default(),
        )
        .is_err());

        let options = RunOptions {
            continue_on_warnings: true,
            ..RunOptions::default()
        };
        let report = validate(
            &group,
            &companies,
            std::slice::from_ref(&tb),
            Some(FiscalPeriodStatus::Closed),
            options,
        )
        .unwrap();
        assert!(report.has_warnings());
        assert!(!report.has_errors());
    }
}
