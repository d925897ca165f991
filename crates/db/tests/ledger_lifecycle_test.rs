//! End-to-end ledger lifecycle against a live Postgres.
//!
//! These tests need a database; they are ignored unless you run them
//! explicitly with `DATABASE_URL` pointing at a scratch instance:
//!
//! ```sh
//! DATABASE_URL=postgres://localhost/meridian_test cargo test -p meridian-db -- --ignored
//! ```

use std::collections::BTreeMap;

use chrono::NaiveDate;
use meridian_core::account::AccountType;
use meridian_core::journal::{
    CreateEntryInput, EntryType, JournalLineInput, LineSide, SourceModule,
};
use meridian_db::entities::sea_orm_active_enums::UserRole;
use meridian_db::migration::Migrator;
use meridian_db::repositories::account::{AccountRepository, CreateAccountInput};
use meridian_db::repositories::company::{CompanyRepository, CreateCompanyInput};
use meridian_db::repositories::fiscal::FiscalRepository;
use meridian_db::repositories::journal::JournalRepository;
use meridian_db::repositories::organization::{
    CreateOrganizationInput, OrganizationRepository,
};
use meridian_db::repositories::year_end::YearEndRepository;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;
use uuid::Uuid;

async fn connect() -> DatabaseConnection {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let db = meridian_db::connect(&url, 5).await.expect("connect");
    Migrator::fresh(&db).await.expect("migrate");
    db
}

async fn seed_user(db: &DatabaseConnection, email: &str) -> Uuid {
    let id = Uuid::now_v7();
    let user = meridian_db::entities::users::ActiveModel {
        id: Set(id),
        email: Set(email.to_string()),
        display_name: Set(email.to_string()),
        created_at: Set(chrono::Utc::now().into()),
    };
    user.insert(db).await.expect("insert user");
    id
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn line(account_id: Uuid, side: LineSide, amount: rust_decimal::Decimal) -> JournalLineInput {
    JournalLineInput {
        account_id,
        side,
        amount,
        currency: "USD".to_string(),
        exchange_rate: None,
        memo: None,
        dimensions: BTreeMap::new(),
        intercompany_partner_id: None,
        matching_line_id: None,
    }
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn posted_entry_updates_balances_and_survives_reversal() {
    let db = connect().await;

    let owner = seed_user(&db, "owner@example.com").await;
    let approver = seed_user(&db, "approver@example.com").await;

    let orgs = OrganizationRepository::new(db.clone());
    let organization = orgs
        .create(CreateOrganizationInput {
            name: "Acme Holdings".to_string(),
            reporting_currency: "USD".to_string(),
            locale: "en-US".to_string(),
            owner_user_id: owner,
        })
        .await
        .expect("create organization");
    orgs.add_member(organization.id, approver, UserRole::Approver)
        .await
        .expect("add approver");

    let companies = CompanyRepository::new(db.clone());
    let company = companies
        .create(CreateCompanyInput {
            organization_id: organization.id,
            name: "Acme US".to_string(),
            jurisdiction: "US".to_string(),
            functional_currency: "USD".to_string(),
            reporting_currency: "USD".to_string(),
            fiscal_year_end_month: 12,
            fiscal_year_end_day: 31,
        })
        .await
        .expect("create company");

    let accounts = AccountRepository::new(db.clone());
    let cash = accounts
        .create(CreateAccountInput {
            company_id: company.id,
            number: "1000".to_string(),
            name: "Cash".to_string(),
            account_type: AccountType::Asset,
            category: "current_asset".to_string(),
            parent_account_id: None,
            is_postable: true,
            cash_flow_category: Some("operating".to_string()),
            is_intercompany: false,
            intercompany_partner_id: None,
            currency_restriction: None,
            is_retained_earnings: false,
        })
        .await
        .expect("create cash account");
    let revenue = accounts
        .create(CreateAccountInput {
            company_id: company.id,
            number: "4000".to_string(),
            name: "Sales Revenue".to_string(),
            account_type: AccountType::Revenue,
            category: "operating_revenue".to_string(),
            parent_account_id: None,
            is_postable: true,
            cash_flow_category: None,
            is_intercompany: false,
            intercompany_partner_id: None,
            currency_restriction: None,
            is_retained_earnings: false,
        })
        .await
        .expect("create revenue account");

    let fiscal = FiscalRepository::new(db.clone());
    fiscal
        .create_year(company.id, 2025, date(2025, 1, 1), true)
        .await
        .expect("create fiscal year");

    let journal = JournalRepository::new(db.clone());
    let entry = journal
        .create_entry(CreateEntryInput {
            company_id: company.id,
            entry_type: EntryType::Standard,
            source_module: SourceModule::GeneralLedger,
            transaction_date: date(2025, 6, 15),
            document_date: None,
            posting_date: None,
            description: "June sale".to_string(),
            reference: None,
            lines: vec![
                line(cash.id, LineSide::Debit, dec!(100.00)),
                line(revenue.id, LineSide::Credit, dec!(100.00)),
            ],
            created_by: owner,
        })
        .await
        .expect("create entry");

    journal
        .submit(entry.entry.id, owner)
        .await
        .expect("submit");
    // Separation of duties: a different user approves.
    journal
        .approve(entry.entry.id, approver)
        .await
        .expect("approve");
    let posted = journal
        .post_entry(entry.entry.id, approver)
        .await
        .expect("post");
    assert!(posted.entry.entry_number.is_some());

    let (cash_debit, cash_credit) = journal
        .account_balance(cash.id, date(2025, 6, 30))
        .await
        .expect("cash balance");
    assert_eq!(cash_debit - cash_credit, dec!(100.0000));

    // Reversal nets the ledger back to zero.
    let reversal = journal
        .reverse_entry(entry.entry.id, approver, date(2025, 7, 1))
        .await
        .expect("reverse");
    assert!(reversal.entry.entry_number.is_some());

    let (cash_debit, cash_credit) = journal
        .account_balance(cash.id, date(2025, 7, 31))
        .await
        .expect("cash balance after reversal");
    assert_eq!(cash_debit - cash_credit, dec!(0.0000));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn close_and_reopen_restore_income_statement_balances() {
    let db = connect().await;

    let owner = seed_user(&db, "closer@example.com").await;
    let orgs = OrganizationRepository::new(db.clone());
    let organization = orgs
        .create(CreateOrganizationInput {
            name: "Close Co".to_string(),
            reporting_currency: "USD".to_string(),
            locale: "en-US".to_string(),
            owner_user_id: owner,
        })
        .await
        .expect("create organization");

    let companies = CompanyRepository::new(db.clone());
    let company = companies
        .create(CreateCompanyInput {
            organization_id: organization.id,
            name: "Close Co US".to_string(),
            jurisdiction: "US".to_string(),
            functional_currency: "USD".to_string(),
            reporting_currency: "USD".to_string(),
            fiscal_year_end_month: 12,
            fiscal_year_end_day: 31,
        })
        .await
        .expect("create company");

    let accounts = AccountRepository::new(db.clone());
    let template = accounts
        .apply_template(
            company.id,
            meridian_core::account::CoaTemplate::GeneralBusiness,
        )
        .await
        .expect("apply template");
    let by_number = |n: &str| template.iter().find(|a| a.number == n).unwrap().id;
    let cash = by_number("1010");
    let revenue = by_number("4000");
    let expense = by_number("6010");
    let retained_earnings = by_number("3100");
    companies
        .set_retained_earnings_account(company.id, retained_earnings)
        .await
        .expect("configure retained earnings");

    let fiscal = FiscalRepository::new(db.clone());
    fiscal
        .create_year(company.id, 2025, date(2025, 1, 1), true)
        .await
        .expect("create fiscal year");

    let journal = JournalRepository::new(db.clone());
    let approver = seed_user(&db, "approver2@example.com").await;
    orgs.add_member(organization.id, approver, UserRole::Approver)
        .await
        .expect("add approver");
    for (debit, credit, amount) in [
        (cash, revenue, dec!(10000)),
        (expense, cash, dec!(6000)),
    ] {
        let entry = journal
            .create_entry(CreateEntryInput {
                company_id: company.id,
                entry_type: EntryType::Standard,
                source_module: SourceModule::GeneralLedger,
                transaction_date: date(2025, 3, 10),
                document_date: None,
                posting_date: None,
                description: "activity".to_string(),
                reference: None,
                lines: vec![
                    line(debit, LineSide::Debit, amount),
                    line(credit, LineSide::Credit, amount),
                ],
                created_by: owner,
            })
            .await
            .expect("create");
        journal.submit(entry.entry.id, owner).await.expect("submit");
        journal
            .approve(entry.entry.id, approver)
            .await
            .expect("approve");
        journal
            .post_entry(entry.entry.id, approver)
            .await
            .expect("post");
    }

    let year_end = YearEndRepository::new(db.clone());
    let preview = year_end.preview(company.id, 2025).await.expect("preview");
    assert_eq!(preview.net_income, dec!(4000.0000));
    assert!(preview.can_close());

    let close = year_end
        .close_year(company.id, 2025, owner)
        .await
        .expect("close year");
    assert_eq!(close.net_income, dec!(4000.0000));
    assert!(!close.closing_entry_ids.is_empty());

    // Revenue and expense are zeroed; retained earnings picked up net
    // income.
    let (rev_debit, rev_credit) = journal
        .account_balance(revenue, date(2025, 12, 31))
        .await
        .expect("revenue balance");
    assert_eq!(rev_credit - rev_debit, dec!(0.0000));
    let (re_debit, re_credit) = journal
        .account_balance(retained_earnings, date(2025, 12, 31))
        .await
        .expect("retained earnings balance");
    assert_eq!(re_credit - re_debit, dec!(4000.0000));

    // Reopen restores everything.
    year_end
        .reopen_year(company.id, 2025, owner, Some("audit adjustment".to_string()))
        .await
        .expect("reopen year");
    let (rev_debit, rev_credit) = journal
        .account_balance(revenue, date(2025, 12, 31))
        .await
        .expect("revenue balance after reopen");
    assert_eq!(rev_credit - rev_debit, dec!(10000.0000));
    let (re_debit, re_credit) = journal
        .account_balance(retained_earnings, date(2025, 12, 31))
        .await
        .expect("retained earnings after reopen");
    assert_eq!(re_credit - re_debit, dec!(0.0000));
}
