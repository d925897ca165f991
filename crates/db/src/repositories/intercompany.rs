//! Intercompany transaction repository.

use chrono::{NaiveDate, Utc};
use meridian_core::intercompany::{
    self, IntercompanyError, IntercompanyTransaction, MatchingStatus,
};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::{
    intercompany_transactions, journal_entries, organizations,
    sea_orm_active_enums::IcTransactionType,
};

/// Error types for intercompany operations.
#[derive(Debug, thiserror::Error)]
pub enum IntercompanyRepoError {
    /// Domain rule violation.
    #[error(transparent)]
    Domain(#[from] IntercompanyError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl IntercompanyRepoError {
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

/// Input for creating an intercompany transaction.
#[derive(Debug, Clone)]
pub struct CreateIntercompanyInput {
    /// Organization scope.
    pub organization_id: Uuid,
    /// The originating company.
    pub from_company_id: Uuid,
    /// The counterparty company.
    pub to_company_id: Uuid,
    /// Transaction kind.
    pub transaction_type: IcTransactionType,
    /// Transaction date.
    pub transaction_date: NaiveDate,
    /// Agreed amount.
    pub amount: Decimal,
    /// Currency of the amount.
    pub currency: String,
}

/// Which side of the pair a journal entry links to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IcSide {
    /// The originating company's entry.
    From,
    /// The counterparty's entry.
    To,
}

/// Intercompany transaction repository.
#[derive(Debug, Clone)]
pub struct IntercompanyRepository {
    db: DatabaseConnection,
}

impl IntercompanyRepository {
    /// Creates a new intercompany repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an intercompany transaction in Unmatched status.
    ///
    /// # Errors
    ///
    /// Returns `SameCompanyIntercompanyError` when both sides match.
    pub async fn create(
        &self,
        input: CreateIntercompanyInput,
    ) -> Result<intercompany_transactions::Model, IntercompanyRepoError> {
        intercompany::validate_pair(input.from_company_id, input.to_company_id)?;

        let now = Utc::now().into();
        let model = intercompany_transactions::ActiveModel {
            id: Set(Uuid::now_v7()),
            organization_id: Set(input.organization_id),
            from_company_id: Set(input.from_company_id),
            to_company_id: Set(input.to_company_id),
            transaction_type: Set(input.transaction_type),
            transaction_date: Set(input.transaction_date),
            amount: Set(input.amount),
            currency: Set(input.currency.to_uppercase()),
            from_journal_entry_id: Set(None),
            to_journal_entry_id: Set(None),
            matching_status: Set(MatchingStatus::Unmatched.into()),
            variance: Set(Decimal::ZERO),
            variance_explanation: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(model.insert(&self.db).await?)
    }

    /// Fetches a transaction by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when it does not exist.
    pub async fn get(
        &self,
        id: Uuid,
    ) -> Result<intercompany_transactions::Model, IntercompanyRepoError> {
        intercompany_transactions::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| IntercompanyError::NotFound(id).into())
    }

    /// Lists an organization's transactions, newest first.
    ///
    /// # Errors
    ///
    /// Returns database errors.
    pub async fn list(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<intercompany_transactions::Model>, IntercompanyRepoError> {
        Ok(intercompany_transactions::Entity::find()
            .filter(intercompany_transactions::Column::OrganizationId.eq(organization_id))
            .order_by_desc(intercompany_transactions::Column::TransactionDate)
            .all(&self.db)
            .await?)
    }

    /// Links a journal entry to one side and re-derives the matching
    /// status from linkage and variance.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or database errors.
    pub async fn link_entry(
        &self,
        id: Uuid,
        side: IcSide,
        journal_entry_id: Uuid,
    ) -> Result<intercompany_transactions::Model, IntercompanyRepoError> {
        let tx = self.get(id).await?;

        let (from_entry, to_entry) = match side {
            IcSide::From => (Some(journal_entry_id), tx.to_journal_entry_id),
            IcSide::To => (tx.from_journal_entry_id, Some(journal_entry_id)),
        };

        let variance = self.compute_variance(from_entry, to_entry).await?;
        let tolerance = self.tolerance(tx.organization_id).await?;
        let status = intercompany::derive_status(
            from_entry,
            to_entry,
            variance,
            tolerance,
            tx.matching_status.into(),
        );

        let mut active: intercompany_transactions::ActiveModel = tx.into();
        active.from_journal_entry_id = Set(from_entry);
        active.to_journal_entry_id = Set(to_entry);
        active.variance = Set(variance);
        active.matching_status = Set(status.into());
        active.updated_at = Set(Utc::now().into());
        Ok(active.update(&self.db).await?)
    }

    /// Unlinks one side, downgrading the status (including a previously
    /// approved variance).
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or database errors.
    pub async fn unlink_entry(
        &self,
        id: Uuid,
        side: IcSide,
    ) -> Result<intercompany_transactions::Model, IntercompanyRepoError> {
        let tx = self.get(id).await?;

        let (from_entry, to_entry) = match side {
            IcSide::From => (None, tx.to_journal_entry_id),
            IcSide::To => (tx.from_journal_entry_id, None),
        };

        let variance = self.compute_variance(from_entry, to_entry).await?;
        let tolerance = self.tolerance(tx.organization_id).await?;
        let status = intercompany::derive_status(
            from_entry,
            to_entry,
            variance,
            tolerance,
            tx.matching_status.into(),
        );

        let mut active: intercompany_transactions::ActiveModel = tx.into();
        active.from_journal_entry_id = Set(from_entry);
        active.to_journal_entry_id = Set(to_entry);
        active.variance = Set(variance);
        active.matching_status = Set(status.into());
        active.variance_explanation = Set(None);
        active.updated_at = Set(Utc::now().into());
        Ok(active.update(&self.db).await?)
    }

    /// Approves an out-of-tolerance variance with an explanation. The
    /// state sticks until a side is unlinked.
    ///
    /// # Errors
    ///
    /// - `VarianceBothSidesRequiredError` unless both sides are linked.
    /// - `VarianceExplanationRequiredError` for a blank explanation.
    pub async fn approve_variance(
        &self,
        id: Uuid,
        explanation: String,
    ) -> Result<intercompany_transactions::Model, IntercompanyRepoError> {
        let tx = self.get(id).await?;
        intercompany::validate_variance_approval(
            tx.from_journal_entry_id,
            tx.to_journal_entry_id,
            &explanation,
        )?;

        let mut active: intercompany_transactions::ActiveModel = tx.into();
        active.matching_status = Set(MatchingStatus::VarianceApproved.into());
        active.variance_explanation = Set(Some(explanation));
        active.updated_at = Set(Utc::now().into());
        Ok(active.update(&self.db).await?)
    }

    /// Deletes a transaction.
    ///
    /// # Errors
    ///
    /// Returns `IntercompanyDeleteForbiddenError` for matched or
    /// variance-approved transactions.
    pub async fn delete(&self, id: Uuid) -> Result<(), IntercompanyRepoError> {
        let tx = self.get(id).await?;
        intercompany::validate_delete(tx.matching_status.into())?;
        intercompany_transactions::Entity::delete_by_id(id)
            .exec(&self.db)
            .await?;
        Ok(())
    }

    /// Loads an organization's transactions as core domain values.
    ///
    /// # Errors
    ///
    /// Returns database errors.
    pub async fn domain_transactions(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<IntercompanyTransaction>, IntercompanyRepoError> {
        let models = self.list(organization_id).await?;
        Ok(models.into_iter().map(to_domain_transaction).collect())
    }

    /// Variance = |from total − to total| in functional currency; zero
    /// until both sides are linked.
    async fn compute_variance(
        &self,
        from_entry: Option<Uuid>,
        to_entry: Option<Uuid>,
    ) -> Result<Decimal, IntercompanyRepoError> {
        let (Some(from_id), Some(to_id)) = (from_entry, to_entry) else {
            return Ok(Decimal::ZERO);
        };
        let from_total = self.entry_total(from_id).await?;
        let to_total = self.entry_total(to_id).await?;
        Ok((from_total - to_total).abs())
    }

    async fn entry_total(&self, entry_id: Uuid) -> Result<Decimal, IntercompanyRepoError> {
        let entry = journal_entries::Entity::find_by_id(entry_id)
            .one(&self.db)
            .await?;
        Ok(entry.map(|e| e.total_debit).unwrap_or_default())
    }

    async fn tolerance(&self, organization_id: Uuid) -> Result<Decimal, IntercompanyRepoError> {
        let organization = organizations::Entity::find_by_id(organization_id)
            .one(&self.db)
            .await?;
        Ok(organization
            .map_or(intercompany::DEFAULT_TOLERANCE, |o| o.ic_variance_tolerance))
    }
}

/// Maps a stored transaction into the core domain type.
#[must_use]
pub fn to_domain_transaction(
    model: intercompany_transactions::Model,
) -> IntercompanyTransaction {
    IntercompanyTransaction {
        id: model.id,
        organization_id: model.organization_id,
        from_company_id: model.from_company_id,
        to_company_id: model.to_company_id,
        transaction_type: model.transaction_type.into(),
        transaction_date: model.transaction_date,
        amount: model.amount,
        currency: model.currency,
        from_journal_entry_id: model.from_journal_entry_id,
        to_journal_entry_id: model.to_journal_entry_id,
        matching_status: model.matching_status.into(),
        variance: model.variance,
        variance_explanation: model.variance_explanation,
    }
}
