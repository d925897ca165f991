//! Company repository.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::{
    companies, journal_entries,
    sea_orm_active_enums::{CompanyStatus, EntryStatus},
};

/// Error types for company operations.
#[derive(Debug, thiserror::Error)]
pub enum CompanyError {
    /// Company not found.
    #[error("Company not found: {0}")]
    NotFound(Uuid),

    /// Name already used within the organization.
    #[error("Company name '{0}' already exists in this organization")]
    NameAlreadyExists(String),

    /// Deactivation is blocked while unposted entries exist.
    #[error("Company has {0} unposted journal entries")]
    HasUnpostedEntries(u64),

    /// Company is deactivated.
    #[error("Company {0} is deactivated")]
    Deactivated(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl CompanyError {
    /// Returns the wire discriminant for API responses.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "CompanyNotFoundError",
            Self::NameAlreadyExists(_) => "CompanyNameAlreadyExistsError",
            Self::HasUnpostedEntries(_) => "CompanyHasUnpostedEntriesError",
            Self::Deactivated(_) => "CompanyDeactivatedError",
            Self::Database(_) => "InternalServerError",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::NameAlreadyExists(_) => 409,
            Self::HasUnpostedEntries(_) | Self::Deactivated(_) => 422,
            Self::Database(_) => 500,
        }
    }
}

/// Input for creating a company.
#[derive(Debug, Clone)]
pub struct CreateCompanyInput {
    /// Owning organization.
    pub organization_id: Uuid,
    /// Display name, unique per organization.
    pub name: String,
    /// Jurisdiction (country code).
    pub jurisdiction: String,
    /// Functional currency.
    pub functional_currency: String,
    /// Reporting currency.
    pub reporting_currency: String,
    /// Fiscal year end month (1-12).
    pub fiscal_year_end_month: i16,
    /// Fiscal year end day.
    pub fiscal_year_end_day: i16,
}

/// Company repository.
#[derive(Debug, Clone)]
pub struct CompanyRepository {
    db: DatabaseConnection,
}

impl CompanyRepository {
    /// Creates a new company repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a company.
    ///
    /// # Errors
    ///
    /// Returns `NameAlreadyExists` on a duplicate name within the
    /// organization.
    pub async fn create(
        &self,
        input: CreateCompanyInput,
    ) -> Result<companies::Model, CompanyError> {
        let existing = companies::Entity::find()
            .filter(companies::Column::OrganizationId.eq(input.organization_id))
            .filter(companies::Column::Name.eq(&input.name))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(CompanyError::NameAlreadyExists(input.name));
        }

        let now = Utc::now().into();
        let company = companies::ActiveModel {
            id: Set(Uuid::now_v7()),
            organization_id: Set(input.organization_id),
            name: Set(input.name),
            jurisdiction: Set(input.jurisdiction),
            functional_currency: Set(input.functional_currency.to_uppercase()),
            reporting_currency: Set(input.reporting_currency.to_uppercase()),
            fiscal_year_end_month: Set(input.fiscal_year_end_month),
            fiscal_year_end_day: Set(input.fiscal_year_end_day),
            retained_earnings_account_id: Set(None),
            status: Set(CompanyStatus::Active),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(company.insert(&self.db).await?)
    }

    /// Fetches a company by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when it does not exist.
    pub async fn get(&self, id: Uuid) -> Result<companies::Model, CompanyError> {
        companies::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(CompanyError::NotFound(id))
    }

    /// Fetches a company and verifies it is active.
    ///
    /// # Errors
    ///
    /// Returns `Deactivated` for soft-deleted companies.
    pub async fn get_active(&self, id: Uuid) -> Result<companies::Model, CompanyError> {
        let company = self.get(id).await?;
        if company.status != CompanyStatus::Active {
            return Err(CompanyError::Deactivated(id));
        }
        Ok(company)
    }

    /// Lists companies of an organization, name-ordered.
    ///
    /// # Errors
    ///
    /// Returns database errors.
    pub async fn list(&self, organization_id: Uuid) -> Result<Vec<companies::Model>, CompanyError> {
        Ok(companies::Entity::find()
            .filter(companies::Column::OrganizationId.eq(organization_id))
            .order_by_asc(companies::Column::Name)
            .all(&self.db)
            .await?)
    }

    /// Points the company at its retained earnings account.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the company does not exist.
    pub async fn set_retained_earnings_account(
        &self,
        company_id: Uuid,
        account_id: Uuid,
    ) -> Result<companies::Model, CompanyError> {
        let company = self.get(company_id).await?;
        let mut active: companies::ActiveModel = company.into();
        active.retained_earnings_account_id = Set(Some(account_id));
        active.updated_at = Set(Utc::now().into());
        Ok(active.update(&self.db).await?)
    }

    /// Soft-deactivates a company.
    ///
    /// # Errors
    ///
    /// Returns `HasUnpostedEntries` while draft, pending, or approved
    /// entries exist.
    pub async fn deactivate(&self, company_id: Uuid) -> Result<companies::Model, CompanyError> {
        let company = self.get(company_id).await?;

        let unposted = journal_entries::Entity::find()
            .filter(journal_entries::Column::CompanyId.eq(company_id))
            .filter(journal_entries::Column::Status.is_in([
                EntryStatus::Draft,
                EntryStatus::PendingApproval,
                EntryStatus::Approved,
            ]))
            .count(&self.db)
            .await?;
        if unposted > 0 {
            return Err(CompanyError::HasUnpostedEntries(unposted));
        }

        let mut active: companies::ActiveModel = company.into();
        active.status = Set(CompanyStatus::Deactivated);
        active.updated_at = Set(Utc::now().into());
        Ok(active.update(&self.db).await?)
    }
}
