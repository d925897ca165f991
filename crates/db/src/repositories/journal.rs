//! Journal entry repository.
//!
//! Owns the transactional side of the journal engine: draft CRUD, the
//! approval workflow, and the atomic post/reverse operations. Every state
//! transition is one database transaction; posting serializes on a
//! `SELECT ... FOR UPDATE` of the entry row, and entry numbers come from
//! a locked per-company sequence row.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use meridian_core::account::CashFlowCategory;
use meridian_core::journal::{
    validate_entry, AccountInfo, CreateEntryInput, JournalError, JournalWorkflow,
    PostingService, ResolvedLine, ReversalInput, ReversalService, WorkflowAction,
};
use meridian_core::reports::{AccountBalanceRow, AccountMovement};
use rust_decimal::Decimal;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use crate::entities::{
    accounts, audit_log, companies, exchange_rates, fiscal_periods, journal_entries,
    journal_entry_lines, journal_entry_sequences, organizations,
    sea_orm_active_enums::{self, RateType},
};
use crate::repositories::fiscal::to_domain_period;

/// Error types for journal operations.
#[derive(Debug, thiserror::Error)]
pub enum JournalRepoError {
    /// Domain rule violation.
    #[error(transparent)]
    Domain(#[from] JournalError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl JournalRepoError {
    /// Returns the wire discriminant for API responses.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Domain(err) => err.tag(),
            Self::Database(_) => "InternalServerError",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Domain(err) => err.status_code(),
            Self::Database(_) => 500,
        }
    }
}

/// A journal entry with its lines.
#[derive(Debug, Clone)]
pub struct EntryWithLines {
    /// The entry header.
    pub entry: journal_entries::Model,
    /// The lines, ordered by line number.
    pub lines: Vec<journal_entry_lines::Model>,
}

/// Journal repository.
#[derive(Debug, Clone)]
pub struct JournalRepository {
    db: DatabaseConnection,
}

impl JournalRepository {
    /// Creates a new journal repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a draft entry after structural validation (I1 in the
    /// transaction currency, I2 account rules).
    ///
    /// # Errors
    ///
    /// Surfaces `JournalError` validation failures before any write.
    pub async fn create_entry(
        &self,
        input: CreateEntryInput,
    ) -> Result<EntryWithLines, JournalRepoError> {
        let company = companies::Entity::find_by_id(input.company_id)
            .one(&self.db)
            .await?
            .ok_or(JournalError::AccountCompanyMismatch(input.company_id))?;

        let account_infos = self.account_infos(input.company_id).await?;
        validate_entry(&input, |id| account_infos.get(&id).cloned())?;

        let txn = self.db.begin().await?;
        let now = Utc::now().into();
        let entry_id = Uuid::now_v7();

        let entry = journal_entries::ActiveModel {
            id: Set(entry_id),
            company_id: Set(input.company_id),
            entry_number: Set(None),
            status: Set(sea_orm_active_enums::EntryStatus::Draft),
            entry_type: Set(input.entry_type.into()),
            source_module: Set(input.source_module.into()),
            transaction_date: Set(input.transaction_date),
            document_date: Set(input.document_date),
            posting_date: Set(input.posting_date),
            fiscal_period_id: Set(None),
            description: Set(input.description.clone()),
            reference: Set(input.reference.clone()),
            total_debit: Set(Decimal::ZERO),
            total_credit: Set(Decimal::ZERO),
            functional_currency: Set(company.functional_currency.clone()),
            created_by: Set(input.created_by),
            submitted_by: Set(None),
            submitted_at: Set(None),
            approved_by: Set(None),
            approved_at: Set(None),
            posted_by: Set(None),
            posted_at: Set(None),
            rejection_reason: Set(None),
            reversed_entry_id: Set(None),
            reversing_entry_id: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let entry = entry.insert(&txn).await?;

        let mut lines = Vec::with_capacity(input.lines.len());
        for (index, line) in input.lines.iter().enumerate() {
            let model = journal_entry_lines::ActiveModel {
                id: Set(Uuid::now_v7()),
                entry_id: Set(entry_id),
                company_id: Set(input.company_id),
                line_number: Set(i32::try_from(index + 1).unwrap_or(i32::MAX)),
                account_id: Set(line.account_id),
                side: Set(line.side.into()),
                amount: Set(line.amount),
                currency: Set(line.currency.to_uppercase()),
                exchange_rate: Set(line.exchange_rate.unwrap_or(Decimal::ONE)),
                functional_currency: Set(company.functional_currency.clone()),
                functional_amount: Set(Decimal::ZERO),
                debit: Set(Decimal::ZERO),
                credit: Set(Decimal::ZERO),
                memo: Set(line.memo.clone()),
                dimensions: Set(serde_json::to_value(&line.dimensions)
                    .unwrap_or(serde_json::Value::Null)),
                intercompany_partner_id: Set(line.intercompany_partner_id),
                matching_line_id: Set(line.matching_line_id),
                transaction_date: Set(input.transaction_date),
                is_posted: Set(false),
                created_at: Set(now),
            };
            lines.push(model.insert(&txn).await?);
        }

        txn.commit().await?;
        Ok(EntryWithLines { entry, lines })
    }

    /// Fetches an entry with its lines.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the entry does not exist.
    pub async fn get_entry(&self, id: Uuid) -> Result<EntryWithLines, JournalRepoError> {
        let entry = journal_entries::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(JournalError::NotFound(id))?;
        let lines = journal_entry_lines::Entity::find()
            .filter(journal_entry_lines::Column::EntryId.eq(id))
            .order_by_asc(journal_entry_lines::Column::LineNumber)
            .all(&self.db)
            .await?;
        Ok(EntryWithLines { entry, lines })
    }

    /// Lists a company's entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns database errors.
    pub async fn list(
        &self,
        company_id: Uuid,
        status: Option<sea_orm_active_enums::EntryStatus>,
    ) -> Result<Vec<journal_entries::Model>, JournalRepoError> {
        let mut query = journal_entries::Entity::find()
            .filter(journal_entries::Column::CompanyId.eq(company_id));
        if let Some(status) = status {
            query = query.filter(journal_entries::Column::Status.eq(status));
        }
        Ok(query
            .order_by_desc(journal_entries::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    /// Deletes a draft entry.
    ///
    /// # Errors
    ///
    /// Returns `JournalEntryStatusError` unless the entry is in Draft.
    pub async fn delete_entry(&self, id: Uuid) -> Result<(), JournalRepoError> {
        let entry = self.get_entry(id).await?.entry;
        JournalWorkflow::validate_editable(entry.status.into())?;
        journal_entries::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }

    /// Replaces a draft entry's lines and header fields.
    ///
    /// # Errors
    ///
    /// Returns `JournalEntryStatusError` unless the entry is in Draft;
    /// surfaces validation failures before any write.
    pub async fn update_entry(
        &self,
        id: Uuid,
        input: CreateEntryInput,
    ) -> Result<EntryWithLines, JournalRepoError> {
        let existing = self.get_entry(id).await?.entry;
        JournalWorkflow::validate_editable(existing.status.into())?;

        let account_infos = self.account_infos(existing.company_id).await?;
        validate_entry(&input, |account| account_infos.get(&account).cloned())?;

        let txn = self.db.begin().await?;
        let now = Utc::now().into();

        journal_entry_lines::Entity::delete_many()
            .filter(journal_entry_lines::Column::EntryId.eq(id))
            .exec(&txn)
            .await?;

        for (index, line) in input.lines.iter().enumerate() {
            let model = journal_entry_lines::ActiveModel {
                id: Set(Uuid::now_v7()),
                entry_id: Set(id),
                company_id: Set(existing.company_id),
                line_number: Set(i32::try_from(index + 1).unwrap_or(i32::MAX)),
                account_id: Set(line.account_id),
                side: Set(line.side.into()),
                amount: Set(line.amount),
                currency: Set(line.currency.to_uppercase()),
                exchange_rate: Set(line.exchange_rate.unwrap_or(Decimal::ONE)),
                functional_currency: Set(existing.functional_currency.clone()),
                functional_amount: Set(Decimal::ZERO),
                debit: Set(Decimal::ZERO),
                credit: Set(Decimal::ZERO),
                memo: Set(line.memo.clone()),
                dimensions: Set(serde_json::to_value(&line.dimensions)
                    .unwrap_or(serde_json::Value::Null)),
                intercompany_partner_id: Set(line.intercompany_partner_id),
                matching_line_id: Set(line.matching_line_id),
                transaction_date: Set(input.transaction_date),
                is_posted: Set(false),
                created_at: Set(now),
            };
            model.insert(&txn).await?;
        }

        let mut active: journal_entries::ActiveModel = existing.into();
        active.transaction_date = Set(input.transaction_date);
        active.document_date = Set(input.document_date);
        active.posting_date = Set(input.posting_date);
        active.description = Set(input.description);
        active.reference = Set(input.reference);
        active.entry_type = Set(input.entry_type.into());
        active.updated_at = Set(now);
        active.update(&txn).await?;

        txn.commit().await?;
        self.get_entry(id).await
    }

    /// Submits a draft entry for approval.
    ///
    /// # Errors
    ///
    /// Returns `JournalEntryStatusError` on an illegal transition.
    pub async fn submit(
        &self,
        id: Uuid,
        actor: Uuid,
    ) -> Result<journal_entries::Model, JournalRepoError> {
        let entry = self.get_entry(id).await?.entry;
        let action = JournalWorkflow::submit(entry.status.into(), actor)?;

        let mut active: journal_entries::ActiveModel = entry.into();
        if let WorkflowAction::Submit {
            submitted_by,
            submitted_at,
            ..
        } = &action
        {
            active.submitted_by = Set(Some(*submitted_by));
            active.submitted_at = Set(Some((*submitted_at).into()));
        }
        active.status = Set(action.new_status().into());
        active.updated_at = Set(Utc::now().into());
        Ok(active.update(&self.db).await?)
    }

    /// Approves a pending entry, enforcing separation of duties when the
    /// organization enables it.
    ///
    /// # Errors
    ///
    /// Returns `SelfApprovalNotAllowed` or status errors.
    pub async fn approve(
        &self,
        id: Uuid,
        actor: Uuid,
    ) -> Result<journal_entries::Model, JournalRepoError> {
        let entry = self.get_entry(id).await?.entry;
        let sod_enabled = self.sod_enabled(entry.company_id).await?;
        let action =
            JournalWorkflow::approve(entry.status.into(), actor, entry.created_by, sod_enabled)?;

        let mut active: journal_entries::ActiveModel = entry.into();
        if let WorkflowAction::Approve {
            approved_by,
            approved_at,
            ..
        } = &action
        {
            active.approved_by = Set(Some(*approved_by));
            active.approved_at = Set(Some((*approved_at).into()));
        }
        active.status = Set(action.new_status().into());
        active.updated_at = Set(Utc::now().into());
        Ok(active.update(&self.db).await?)
    }

    /// Rejects a pending entry back to draft.
    ///
    /// # Errors
    ///
    /// Returns `RejectionReasonRequired` or status errors.
    pub async fn reject(
        &self,
        id: Uuid,
        reason: String,
    ) -> Result<journal_entries::Model, JournalRepoError> {
        let entry = self.get_entry(id).await?.entry;
        let action = JournalWorkflow::reject(entry.status.into(), reason)?;

        let mut active: journal_entries::ActiveModel = entry.into();
        if let WorkflowAction::Reject {
            rejection_reason, ..
        } = &action
        {
            active.rejection_reason = Set(Some(rejection_reason.clone()));
        }
        active.status = Set(action.new_status().into());
        active.updated_at = Set(Utc::now().into());
        Ok(active.update(&self.db).await?)
    }

    /// Posts an approved entry atomically.
    ///
    /// Inside one transaction: the entry row is locked, the period gate
    /// checked, the per-company entry number assigned from the locked
    /// sequence row, functional amounts resolved with the captured rates,
    /// the balance re-verified, and an audit record appended. Concurrent
    /// posters serialize on the row lock; the loser sees Posted and gets
    /// `JournalEntryStatusError`.
    ///
    /// # Errors
    ///
    /// Surfaces period, balance, and status violations; the transaction
    /// rolls back on any of them.
    pub async fn post_entry(
        &self,
        id: Uuid,
        actor: Uuid,
    ) -> Result<EntryWithLines, JournalRepoError> {
        let txn = self.db.begin().await?;

        let entry = journal_entries::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(JournalError::NotFound(id))?;
        let action = JournalWorkflow::post(entry.status.into(), actor)?;

        let lines = journal_entry_lines::Entity::find()
            .filter(journal_entry_lines::Column::EntryId.eq(id))
            .order_by_asc(journal_entry_lines::Column::LineNumber)
            .all(&txn)
            .await?;

        let input = Self::reconstruct_input(&entry, &lines);
        let account_infos = Self::account_infos_in(&txn, entry.company_id).await?;
        validate_entry(&input, |account| account_infos.get(&account).cloned())?;

        // Resolve the fiscal period from the posting date (or transaction
        // date) and enforce the open-period gate.
        let periods = Self::company_periods_in(&txn, entry.company_id).await?;
        let period = PostingService::resolve_period(
            &periods,
            input.period_date(),
            entry.entry_type.into(),
        )?;
        let period_id = period.id.into_inner();

        // Spot-rate fallback for lines created without a captured rate.
        let organization_id = Self::organization_of(&txn, entry.company_id).await?;
        let spot_rates = Self::spot_rates_in(
            &txn,
            organization_id,
            &entry.functional_currency,
            &input,
        )
        .await?;
        let (resolved, totals) =
            PostingService::resolve_lines(&input, &entry.functional_currency, |currency, _| {
                spot_rates.get(&currency.to_uppercase()).copied()
            })?;

        let entry_number = Self::next_entry_number(&txn, entry.company_id).await?;

        for (line, resolution) in lines.iter().zip(&resolved) {
            let mut active: journal_entry_lines::ActiveModel = line.clone().into();
            active.exchange_rate = Set(resolution.exchange_rate);
            active.functional_amount = Set(resolution.functional_amount);
            active.debit = Set(resolution.debit);
            active.credit = Set(resolution.credit);
            active.is_posted = Set(true);
            active.update(&txn).await?;
        }

        let company_id = entry.company_id;
        let mut active: journal_entries::ActiveModel = entry.into();
        active.status = Set(sea_orm_active_enums::EntryStatus::Posted);
        active.entry_number = Set(Some(entry_number));
        active.fiscal_period_id = Set(Some(period_id));
        active.total_debit = Set(totals.functional_debit);
        active.total_credit = Set(totals.functional_credit);
        if let WorkflowAction::Post {
            posted_by,
            posted_at,
            ..
        } = &action
        {
            active.posted_by = Set(Some(*posted_by));
            active.posted_at = Set(Some((*posted_at).into()));
        }
        active.updated_at = Set(Utc::now().into());
        active.update(&txn).await?;

        Self::append_audit(
            &txn,
            organization_id,
            Some(actor),
            "journal_entry:post",
            "journal_entry",
            id,
            serde_json::json!({
                "entry_number": entry_number,
                "total_debit": totals.functional_debit.to_string(),
                "total_credit": totals.functional_credit.to_string(),
            }),
        )
        .await?;

        txn.commit().await?;
        info!(entry_id = %id, company_id = %company_id, entry_number, "Journal entry posted");

        self.get_entry(id).await
    }

    /// Reverses a posted entry: creates the flipped entry, posts it in
    /// the same transaction, and links both directions.
    ///
    /// # Errors
    ///
    /// - `JournalEntryAlreadyReversedError` when already reversed.
    /// - `FiscalPeriodClosedError` when the reversal date falls in a
    ///   closed period.
    pub async fn reverse_entry(
        &self,
        id: Uuid,
        actor: Uuid,
        reversal_date: NaiveDate,
    ) -> Result<EntryWithLines, JournalRepoError> {
        let txn = self.db.begin().await?;

        let original = journal_entries::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(JournalError::NotFound(id))?;
        JournalWorkflow::reverse(
            original.status.into(),
            id,
            original.reversing_entry_id,
            actor,
        )?;

        // User-initiated reversals must land in an open period.
        let periods = Self::company_periods_in(&txn, original.company_id).await?;
        let period = meridian_core::fiscal::resolve_period_for_date(&periods, reversal_date)
            .map_err(|_| JournalError::NoFiscalPeriod(reversal_date))?;
        if !period.status.allows_posting() {
            return Err(JournalError::FiscalPeriodClosed(reversal_date).into());
        }
        let period_id = period.id.into_inner();

        let original_lines = journal_entry_lines::Entity::find()
            .filter(journal_entry_lines::Column::EntryId.eq(id))
            .order_by_asc(journal_entry_lines::Column::LineNumber)
            .all(&txn)
            .await?;

        let reversal_input = ReversalService::build_reversal(&ReversalInput {
            original_entry_id: id,
            company_id: original.company_id,
            original_lines: original_lines.iter().map(to_resolved_line).collect(),
            reversal_date,
            original_description: original.description.clone(),
            reversed_by: actor,
        })?;

        let (resolved, totals) = PostingService::resolve_lines(
            &reversal_input,
            &original.functional_currency,
            |_, _| None,
        )?;

        let entry_number = Self::next_entry_number(&txn, original.company_id).await?;
        let now = Utc::now();
        let reversal_id = Uuid::now_v7();

        let reversal = journal_entries::ActiveModel {
            id: Set(reversal_id),
            company_id: Set(original.company_id),
            entry_number: Set(Some(entry_number)),
            status: Set(sea_orm_active_enums::EntryStatus::Posted),
            entry_type: Set(sea_orm_active_enums::EntryType::Reversing),
            source_module: Set(sea_orm_active_enums::SourceModule::System),
            transaction_date: Set(reversal_date),
            document_date: Set(None),
            posting_date: Set(None),
            fiscal_period_id: Set(Some(period_id)),
            description: Set(reversal_input.description.clone()),
            reference: Set(None),
            total_debit: Set(totals.functional_debit),
            total_credit: Set(totals.functional_credit),
            functional_currency: Set(original.functional_currency.clone()),
            created_by: Set(actor),
            submitted_by: Set(None),
            submitted_at: Set(None),
            approved_by: Set(None),
            approved_at: Set(None),
            posted_by: Set(Some(actor)),
            posted_at: Set(Some(now.into())),
            rejection_reason: Set(None),
            reversed_entry_id: Set(Some(id)),
            reversing_entry_id: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        reversal.insert(&txn).await?;

        for line in &resolved {
            Self::insert_posted_line(&txn, reversal_id, original.company_id, reversal_date, line)
                .await?;
        }

        let organization_id = Self::organization_of(&txn, original.company_id).await?;
        let company_id = original.company_id;
        let mut active: journal_entries::ActiveModel = original.into();
        active.status = Set(sea_orm_active_enums::EntryStatus::Reversed);
        active.reversing_entry_id = Set(Some(reversal_id));
        active.updated_at = Set(now.into());
        active.update(&txn).await?;

        Self::append_audit(
            &txn,
            organization_id,
            Some(actor),
            "journal_entry:reverse",
            "journal_entry",
            id,
            serde_json::json!({ "reversing_entry_id": reversal_id }),
        )
        .await?;

        txn.commit().await?;
        info!(entry_id = %id, company_id = %company_id, reversal_id = %reversal_id, "Journal entry reversed");

        self.get_entry(reversal_id).await
    }

    /// Posts an already-resolved system entry (closing, reopen reversal)
    /// inside an existing transaction, bypassing the open-period gate.
    ///
    /// # Errors
    ///
    /// Returns database errors.
    pub(crate) async fn post_system_entry(
        txn: &DatabaseTransaction,
        company_id: Uuid,
        functional_currency: &str,
        input: &CreateEntryInput,
        fiscal_period_id: Uuid,
        reversed_entry_id: Option<Uuid>,
    ) -> Result<Uuid, JournalRepoError> {
        let (resolved, totals) =
            PostingService::resolve_lines(input, functional_currency, |_, _| None)?;
        let entry_number = Self::next_entry_number(txn, company_id).await?;
        let now = Utc::now();
        let entry_id = Uuid::now_v7();

        let entry = journal_entries::ActiveModel {
            id: Set(entry_id),
            company_id: Set(company_id),
            entry_number: Set(Some(entry_number)),
            status: Set(sea_orm_active_enums::EntryStatus::Posted),
            entry_type: Set(input.entry_type.into()),
            source_module: Set(input.source_module.into()),
            transaction_date: Set(input.transaction_date),
            document_date: Set(None),
            posting_date: Set(input.posting_date),
            fiscal_period_id: Set(Some(fiscal_period_id)),
            description: Set(input.description.clone()),
            reference: Set(input.reference.clone()),
            total_debit: Set(totals.functional_debit),
            total_credit: Set(totals.functional_credit),
            functional_currency: Set(functional_currency.to_uppercase()),
            created_by: Set(input.created_by),
            submitted_by: Set(None),
            submitted_at: Set(None),
            approved_by: Set(None),
            approved_at: Set(None),
            posted_by: Set(Some(input.created_by)),
            posted_at: Set(Some(now.into())),
            rejection_reason: Set(None),
            reversed_entry_id: Set(reversed_entry_id),
            reversing_entry_id: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        entry.insert(txn).await?;

        for line in &resolved {
            Self::insert_posted_line(txn, entry_id, company_id, input.transaction_date, line)
                .await?;
        }

        Ok(entry_id)
    }

    /// Returns an account's posted (debit, credit) totals up to a date.
    ///
    /// # Errors
    ///
    /// Returns database errors.
    pub async fn account_balance(
        &self,
        account_id: Uuid,
        as_of: NaiveDate,
    ) -> Result<(Decimal, Decimal), JournalRepoError> {
        let lines = journal_entry_lines::Entity::find()
            .filter(journal_entry_lines::Column::AccountId.eq(account_id))
            .filter(journal_entry_lines::Column::IsPosted.eq(true))
            .filter(journal_entry_lines::Column::TransactionDate.lte(as_of))
            .all(&self.db)
            .await?;
        let debit = lines.iter().map(|l| l.debit).sum();
        let credit = lines.iter().map(|l| l.credit).sum();
        Ok((debit, credit))
    }

    /// Builds report rows for every account of a company at a date.
    ///
    /// Balances derive from posted lines at read time; there is no cached
    /// scalar to race with concurrent posts.
    ///
    /// # Errors
    ///
    /// Returns database errors.
    pub async fn balance_rows(
        &self,
        company_id: Uuid,
        as_of: NaiveDate,
    ) -> Result<Vec<AccountBalanceRow>, JournalRepoError> {
        let account_models = accounts::Entity::find()
            .filter(accounts::Column::CompanyId.eq(company_id))
            .all(&self.db)
            .await?;
        let lines = journal_entry_lines::Entity::find()
            .filter(journal_entry_lines::Column::CompanyId.eq(company_id))
            .filter(journal_entry_lines::Column::IsPosted.eq(true))
            .filter(journal_entry_lines::Column::TransactionDate.lte(as_of))
            .all(&self.db)
            .await?;

        let mut totals: HashMap<Uuid, (Decimal, Decimal)> = HashMap::new();
        for line in lines {
            let entry = totals.entry(line.account_id).or_default();
            entry.0 += line.debit;
            entry.1 += line.credit;
        }

        Ok(account_models
            .into_iter()
            .map(|account| {
                let (debit, credit) = totals.get(&account.id).copied().unwrap_or_default();
                AccountBalanceRow {
                    account_id: account.id,
                    account_number: account.number,
                    account_name: account.name,
                    account_type: account.account_type.into(),
                    category: account.category,
                    cash_flow_category: parse_cash_flow(account.cash_flow_category.as_deref()),
                    debit_total: debit,
                    credit_total: credit,
                }
            })
            .collect())
    }

    /// Builds per-account movements over a period for cash flow and
    /// equity statements.
    ///
    /// # Errors
    ///
    /// Returns database errors.
    pub async fn movements(
        &self,
        company_id: Uuid,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> Result<Vec<AccountMovement>, JournalRepoError> {
        let account_models = accounts::Entity::find()
            .filter(accounts::Column::CompanyId.eq(company_id))
            .all(&self.db)
            .await?;
        let lines = journal_entry_lines::Entity::find()
            .filter(journal_entry_lines::Column::CompanyId.eq(company_id))
            .filter(journal_entry_lines::Column::IsPosted.eq(true))
            .filter(journal_entry_lines::Column::TransactionDate.lte(period_end))
            .all(&self.db)
            .await?;

        let mut beginning: HashMap<Uuid, Decimal> = HashMap::new();
        let mut movement: HashMap<Uuid, Decimal> = HashMap::new();
        for line in lines {
            let signed = line.debit - line.credit;
            if line.transaction_date < period_start {
                *beginning.entry(line.account_id).or_default() += signed;
            } else {
                *movement.entry(line.account_id).or_default() += signed;
            }
        }

        Ok(account_models
            .into_iter()
            .map(|account| {
                let is_cash = account.category == "current_asset"
                    && account.cash_flow_category.as_deref() == Some("operating")
                    && account.name.to_lowercase().contains("cash");
                AccountMovement {
                    account_number: account.number,
                    account_name: account.name,
                    account_type: account.account_type.into(),
                    cash_flow_category: parse_cash_flow(account.cash_flow_category.as_deref()),
                    is_cash,
                    beginning_balance: beginning.get(&account.id).copied().unwrap_or_default(),
                    movement: movement.get(&account.id).copied().unwrap_or_default(),
                }
            })
            .collect())
    }

    /// Counts a company's unposted entries in a date range.
    ///
    /// # Errors
    ///
    /// Returns database errors.
    pub async fn unposted_entry_count(
        &self,
        company_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<u64, JournalRepoError> {
        Ok(journal_entries::Entity::find()
            .filter(journal_entries::Column::CompanyId.eq(company_id))
            .filter(journal_entries::Column::TransactionDate.between(from, to))
            .filter(journal_entries::Column::Status.is_in([
                sea_orm_active_enums::EntryStatus::Draft,
                sea_orm_active_enums::EntryStatus::PendingApproval,
                sea_orm_active_enums::EntryStatus::Approved,
            ]))
            .count(&self.db)
            .await?)
    }

    async fn account_infos(
        &self,
        company_id: Uuid,
    ) -> Result<HashMap<Uuid, AccountInfo>, JournalRepoError> {
        let models = accounts::Entity::find()
            .filter(accounts::Column::CompanyId.eq(company_id))
            .all(&self.db)
            .await?;
        Ok(Self::infos_from(models))
    }

    async fn account_infos_in(
        txn: &DatabaseTransaction,
        company_id: Uuid,
    ) -> Result<HashMap<Uuid, AccountInfo>, JournalRepoError> {
        let models = accounts::Entity::find()
            .filter(accounts::Column::CompanyId.eq(company_id))
            .all(txn)
            .await?;
        Ok(Self::infos_from(models))
    }

    fn infos_from(models: Vec<accounts::Model>) -> HashMap<Uuid, AccountInfo> {
        models
            .into_iter()
            .map(|a| {
                (
                    a.id,
                    AccountInfo {
                        id: a.id,
                        company_id: a.company_id,
                        is_active: a.is_active,
                        is_postable: a.is_postable,
                        currency_restriction: a.currency_restriction,
                    },
                )
            })
            .collect()
    }

    async fn company_periods_in(
        txn: &DatabaseTransaction,
        company_id: Uuid,
    ) -> Result<Vec<meridian_core::fiscal::FiscalPeriod>, JournalRepoError> {
        let models = fiscal_periods::Entity::find()
            .filter(fiscal_periods::Column::CompanyId.eq(company_id))
            .all(txn)
            .await?;
        Ok(models.into_iter().map(to_domain_period).collect())
    }

    async fn organization_of(
        txn: &DatabaseTransaction,
        company_id: Uuid,
    ) -> Result<Uuid, JournalRepoError> {
        let company = companies::Entity::find_by_id(company_id)
            .one(txn)
            .await?
            .ok_or(JournalError::AccountCompanyMismatch(company_id))?;
        Ok(company.organization_id)
    }

    async fn sod_enabled(&self, company_id: Uuid) -> Result<bool, JournalRepoError> {
        let company = companies::Entity::find_by_id(company_id)
            .one(&self.db)
            .await?
            .ok_or(JournalError::AccountCompanyMismatch(company_id))?;
        let organization = organizations::Entity::find_by_id(company.organization_id)
            .one(&self.db)
            .await?;
        Ok(organization.is_none_or(|o| o.sod_enabled))
    }

    /// Loads spot rates for every non-functional currency of the entry.
    async fn spot_rates_in(
        txn: &DatabaseTransaction,
        organization_id: Uuid,
        functional_currency: &str,
        input: &CreateEntryInput,
    ) -> Result<HashMap<String, Decimal>, JournalRepoError> {
        let mut rates = HashMap::new();
        let currencies: std::collections::BTreeSet<String> = input
            .lines
            .iter()
            .filter(|l| {
                !l.currency.eq_ignore_ascii_case(functional_currency) && l.exchange_rate.is_none()
            })
            .map(|l| l.currency.to_uppercase())
            .collect();

        for currency in currencies {
            let candidate = exchange_rates::Entity::find()
                .filter(exchange_rates::Column::OrganizationId.eq(organization_id))
                .filter(exchange_rates::Column::FromCurrency.eq(&currency))
                .filter(
                    exchange_rates::Column::ToCurrency.eq(functional_currency.to_uppercase()),
                )
                .filter(exchange_rates::Column::RateType.eq(RateType::Spot))
                .filter(exchange_rates::Column::EffectiveDate.lte(input.transaction_date))
                .order_by_desc(exchange_rates::Column::EffectiveDate)
                .order_by_desc(exchange_rates::Column::CreatedAt)
                .one(txn)
                .await?;
            if let Some(rate) = candidate {
                rates.insert(currency, rate.rate);
            }
        }
        Ok(rates)
    }

    /// Locks the company's sequence row and returns the next number.
    async fn next_entry_number(
        txn: &DatabaseTransaction,
        company_id: Uuid,
    ) -> Result<i64, JournalRepoError> {
        // Ensure the row exists, then lock it for the increment.
        let seed = journal_entry_sequences::ActiveModel {
            company_id: Set(company_id),
            next_number: Set(1),
        };
        journal_entry_sequences::Entity::insert(seed)
            .on_conflict(
                OnConflict::column(journal_entry_sequences::Column::CompanyId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(txn)
            .await?;

        let row = journal_entry_sequences::Entity::find_by_id(company_id)
            .lock_exclusive()
            .one(txn)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound("journal_entry_sequences".to_string()))?;
        let number = row.next_number;

        let mut active: journal_entry_sequences::ActiveModel = row.into();
        active.next_number = Set(number + 1);
        active.update(txn).await?;

        Ok(number)
    }

    async fn insert_posted_line(
        txn: &DatabaseTransaction,
        entry_id: Uuid,
        company_id: Uuid,
        transaction_date: NaiveDate,
        line: &ResolvedLine,
    ) -> Result<(), JournalRepoError> {
        let model = journal_entry_lines::ActiveModel {
            id: Set(Uuid::now_v7()),
            entry_id: Set(entry_id),
            company_id: Set(company_id),
            line_number: Set(i32::try_from(line.line_number).unwrap_or(i32::MAX)),
            account_id: Set(line.account_id),
            side: Set(line.side.into()),
            amount: Set(line.amount),
            currency: Set(line.currency.clone()),
            exchange_rate: Set(line.exchange_rate),
            functional_currency: Set(line.functional_currency.clone()),
            functional_amount: Set(line.functional_amount),
            debit: Set(line.debit),
            credit: Set(line.credit),
            memo: Set(line.memo.clone()),
            dimensions: Set(
                serde_json::to_value(&line.dimensions).unwrap_or(serde_json::Value::Null)
            ),
            intercompany_partner_id: Set(line.intercompany_partner_id),
            matching_line_id: Set(line.matching_line_id),
            transaction_date: Set(transaction_date),
            is_posted: Set(true),
            created_at: Set(Utc::now().into()),
        };
        model.insert(txn).await?;
        Ok(())
    }

    pub(crate) async fn append_audit<C: ConnectionTrait>(
        conn: &C,
        organization_id: Uuid,
        actor_id: Option<Uuid>,
        action: &str,
        entity_type: &str,
        entity_id: Uuid,
        details: serde_json::Value,
    ) -> Result<(), JournalRepoError> {
        let record = audit_log::ActiveModel {
            id: Set(Uuid::now_v7()),
            organization_id: Set(organization_id),
            actor_id: Set(actor_id),
            action: Set(action.to_string()),
            entity_type: Set(entity_type.to_string()),
            entity_id: Set(entity_id),
            details: Set(details),
            recorded_at: Set(Utc::now().into()),
        };
        record.insert(conn).await?;
        Ok(())
    }

    /// Rebuilds a core input from stored rows (used at posting time).
    fn reconstruct_input(
        entry: &journal_entries::Model,
        lines: &[journal_entry_lines::Model],
    ) -> CreateEntryInput {
        CreateEntryInput {
            company_id: entry.company_id,
            entry_type: entry.entry_type.into(),
            source_module: entry.source_module.into(),
            transaction_date: entry.transaction_date,
            document_date: entry.document_date,
            posting_date: entry.posting_date,
            description: entry.description.clone(),
            reference: entry.reference.clone(),
            lines: lines
                .iter()
                .map(|line| meridian_core::journal::JournalLineInput {
                    account_id: line.account_id,
                    side: line.side.into(),
                    amount: line.amount,
                    currency: line.currency.clone(),
                    // A stored rate of exactly 1 for a foreign-currency line
                    // means none was captured; posting falls back to spot.
                    exchange_rate: if line.currency == entry.functional_currency
                        || line.exchange_rate != Decimal::ONE
                    {
                        Some(line.exchange_rate)
                    } else {
                        None
                    },
                    memo: line.memo.clone(),
                    dimensions: serde_json::from_value(line.dimensions.clone())
                        .unwrap_or_default(),
                    intercompany_partner_id: line.intercompany_partner_id,
                    matching_line_id: line.matching_line_id,
                })
                .collect(),
            created_by: entry.created_by,
        }
    }
}

/// Maps a stored line into the core resolved-line type.
#[must_use]
pub fn to_resolved_line(line: &journal_entry_lines::Model) -> ResolvedLine {
    ResolvedLine {
        line_number: u32::try_from(line.line_number).unwrap_or(u32::MAX),
        account_id: line.account_id,
        side: line.side.into(),
        amount: line.amount,
        currency: line.currency.clone(),
        exchange_rate: line.exchange_rate,
        functional_currency: line.functional_currency.clone(),
        functional_amount: line.functional_amount,
        debit: line.debit,
        credit: line.credit,
        memo: line.memo.clone(),
        dimensions: serde_json::from_value(line.dimensions.clone()).unwrap_or_default(),
        intercompany_partner_id: line.intercompany_partner_id,
        matching_line_id: line.matching_line_id,
    }
}

/// Parses the stored cash flow tag into the core category.
#[must_use]
pub fn parse_cash_flow(value: Option<&str>) -> Option<CashFlowCategory> {
    match value {
        Some("operating") => Some(CashFlowCategory::Operating),
        Some("investing") => Some(CashFlowCategory::Investing),
        Some("financing") => Some(CashFlowCategory::Financing),
        _ => None,
    }
}
