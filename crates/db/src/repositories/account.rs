//! Chart of accounts repository.

use std::collections::HashMap;

use chrono::Utc;
use meridian_core::account::{
    hierarchy, templates::CoaTemplate, types as account_types, AccountError, AccountType,
    NormalBalance,
};
use meridian_shared::types::{AccountId, CompanyId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::{accounts, journal_entry_lines};

/// Error types for chart of accounts operations.
#[derive(Debug, thiserror::Error)]
pub enum AccountRepoError {
    /// Domain rule violation.
    #[error(transparent)]
    Domain(#[from] AccountError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl AccountRepoError {
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

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    /// Owning company.
    pub company_id: Uuid,
    /// 4-digit number, unique per company.
    pub number: String,
    /// Display name.
    pub name: String,
    /// Fundamental type.
    pub account_type: AccountType,
    /// Reporting category.
    pub category: String,
    /// Optional parent account.
    pub parent_account_id: Option<Uuid>,
    /// Whether lines may post here directly.
    pub is_postable: bool,
    /// Cash flow classification.
    pub cash_flow_category: Option<String>,
    /// Intercompany flag.
    pub is_intercompany: bool,
    /// Counterparty company for intercompany accounts.
    pub intercompany_partner_id: Option<Uuid>,
    /// Restricts postings to one currency.
    pub currency_restriction: Option<String>,
    /// Marks the company's retained earnings account.
    pub is_retained_earnings: bool,
}

/// Chart of accounts repository.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an account, validating number uniqueness, parent placement
    /// (same company, acyclic, depth ≤ 6), and the retained-earnings flag.
    ///
    /// # Errors
    ///
    /// Surfaces `AccountError` domain violations and database errors.
    pub async fn create(
        &self,
        input: CreateAccountInput,
    ) -> Result<accounts::Model, AccountRepoError> {
        account_types::validate_number(&input.number)?;

        let existing = accounts::Entity::find()
            .filter(accounts::Column::CompanyId.eq(input.company_id))
            .filter(accounts::Column::Number.eq(&input.number))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(AccountError::NumberAlreadyExists {
                number: input.number,
            }
            .into());
        }

        let hierarchy_level = match input.parent_account_id {
            Some(parent_id) => {
                self.validate_placement(input.company_id, None, parent_id).await?
            }
            None => 1,
        };

        if input.is_retained_earnings {
            let already = accounts::Entity::find()
                .filter(accounts::Column::CompanyId.eq(input.company_id))
                .filter(accounts::Column::IsRetainedEarnings.eq(true))
                .count(&self.db)
                .await?;
            hierarchy::validate_retained_earnings(input.account_type, already > 0)?;
        }

        let now = Utc::now().into();
        let account = accounts::ActiveModel {
            id: Set(Uuid::now_v7()),
            company_id: Set(input.company_id),
            number: Set(input.number),
            name: Set(input.name),
            account_type: Set(input.account_type.into()),
            category: Set(input.category),
            normal_balance: Set(match input.account_type.normal_balance() {
                NormalBalance::Debit => crate::entities::sea_orm_active_enums::NormalBalance::Debit,
                NormalBalance::Credit => {
                    crate::entities::sea_orm_active_enums::NormalBalance::Credit
                }
            }),
            parent_account_id: Set(input.parent_account_id),
            hierarchy_level: Set(i16::from(hierarchy_level)),
            is_postable: Set(input.is_postable),
            cash_flow_category: Set(input.cash_flow_category),
            is_intercompany: Set(input.is_intercompany),
            intercompany_partner_id: Set(input.intercompany_partner_id),
            currency_restriction: Set(input.currency_restriction.map(|c| c.to_uppercase())),
            is_retained_earnings: Set(input.is_retained_earnings),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(account.insert(&self.db).await?)
    }

    /// Fetches an account by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when it does not exist.
    pub async fn get(&self, id: Uuid) -> Result<accounts::Model, AccountRepoError> {
        accounts::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AccountError::NotFound(AccountId::from_uuid(id)).into())
    }

    /// Lists a company's accounts, number-ordered.
    ///
    /// # Errors
    ///
    /// Returns database errors.
    pub async fn list(&self, company_id: Uuid) -> Result<Vec<accounts::Model>, AccountRepoError> {
        Ok(accounts::Entity::find()
            .filter(accounts::Column::CompanyId.eq(company_id))
            .order_by_asc(accounts::Column::Number)
            .all(&self.db)
            .await?)
    }

    /// Moves an account under a new parent, re-validating acyclicity and
    /// depth by walking the ancestor chain.
    ///
    /// # Errors
    ///
    /// Surfaces `CircularHierarchy`, `HierarchyTooDeep`, and company
    /// mismatches.
    pub async fn reparent(
        &self,
        account_id: Uuid,
        new_parent_id: Option<Uuid>,
    ) -> Result<accounts::Model, AccountRepoError> {
        let account = self.get(account_id).await?;

        let hierarchy_level = match new_parent_id {
            Some(parent_id) => {
                self.validate_placement(account.company_id, Some(account_id), parent_id)
                    .await?
            }
            None => 1,
        };

        let mut active: accounts::ActiveModel = account.into();
        active.parent_account_id = Set(new_parent_id);
        active.hierarchy_level = Set(i16::from(hierarchy_level));
        active.updated_at = Set(Utc::now().into());
        Ok(active.update(&self.db).await?)
    }

    /// Deactivates an account.
    ///
    /// # Errors
    ///
    /// Returns `HasActiveChildAccounts` while an active child exists and
    /// `HasPostedLines` while posted lines reference the account.
    pub async fn deactivate(&self, account_id: Uuid) -> Result<accounts::Model, AccountRepoError> {
        let account = self.get(account_id).await?;

        let active_children = accounts::Entity::find()
            .filter(accounts::Column::ParentAccountId.eq(account_id))
            .filter(accounts::Column::IsActive.eq(true))
            .count(&self.db)
            .await?;
        let posted_lines = journal_entry_lines::Entity::find()
            .filter(journal_entry_lines::Column::AccountId.eq(account_id))
            .filter(journal_entry_lines::Column::IsPosted.eq(true))
            .count(&self.db)
            .await?;
        hierarchy::validate_deactivation(active_children > 0, posted_lines > 0)?;

        let mut active: accounts::ActiveModel = account.into();
        active.is_active = Set(false);
        active.updated_at = Set(Utc::now().into());
        Ok(active.update(&self.db).await?)
    }

    /// Applies a chart-of-accounts template atomically.
    ///
    /// # Errors
    ///
    /// Returns `CompanyAlreadyHasAccounts` unless the chart is empty.
    pub async fn apply_template(
        &self,
        company_id: Uuid,
        template: CoaTemplate,
    ) -> Result<Vec<accounts::Model>, AccountRepoError> {
        let existing = accounts::Entity::find()
            .filter(accounts::Column::CompanyId.eq(company_id))
            .count(&self.db)
            .await?;
        if existing > 0 {
            return Err(AccountError::CompanyAlreadyHasAccounts.into());
        }

        let txn = self.db.begin().await?;
        let now = Utc::now().into();
        let mut created = Vec::new();
        let mut ids_by_number: HashMap<&'static str, (Uuid, i16)> = HashMap::new();

        for spec in template.accounts() {
            let (parent_id, level) = match spec.parent_number {
                Some(parent_number) => {
                    let (id, parent_level) = ids_by_number
                        .get(parent_number)
                        .copied()
                        .ok_or(AccountError::ParentNotFound(AccountId::new()))?;
                    (Some(id), parent_level + 1)
                }
                None => (None, 1),
            };

            let id = Uuid::now_v7();
            let account = accounts::ActiveModel {
                id: Set(id),
                company_id: Set(company_id),
                number: Set(spec.number.to_string()),
                name: Set(spec.name.to_string()),
                account_type: Set(spec.account_type.into()),
                normal_balance: Set(match spec.account_type.normal_balance() {
                    NormalBalance::Debit => {
                        crate::entities::sea_orm_active_enums::NormalBalance::Debit
                    }
                    NormalBalance::Credit => {
                        crate::entities::sea_orm_active_enums::NormalBalance::Credit
                    }
                }),
                category: Set(spec.category.to_string()),
                parent_account_id: Set(parent_id),
                hierarchy_level: Set(level),
                is_postable: Set(spec.is_postable),
                cash_flow_category: Set(spec.cash_flow_category.map(|c| {
                    match c {
                        meridian_core::account::CashFlowCategory::Operating => "operating",
                        meridian_core::account::CashFlowCategory::Investing => "investing",
                        meridian_core::account::CashFlowCategory::Financing => "financing",
                    }
                    .to_string()
                })),
                is_intercompany: Set(spec.is_intercompany),
                intercompany_partner_id: Set(None),
                currency_restriction: Set(None),
                is_retained_earnings: Set(spec.is_retained_earnings),
                is_active: Set(true),
                created_at: Set(now),
                updated_at: Set(now),
            };
            let model = account.insert(&txn).await?;
            ids_by_number.insert(spec.number, (id, level));
            created.push(model);
        }

        txn.commit().await?;
        Ok(created)
    }

    /// Walks the prospective ancestor chain and returns the new level.
    async fn validate_placement(
        &self,
        company_id: Uuid,
        account_id: Option<Uuid>,
        parent_id: Uuid,
    ) -> Result<u8, AccountRepoError> {
        let parent = self.get(parent_id).await?;
        let company = CompanyId::from_uuid(company_id);

        // Map the parent into the core domain type for validation.
        let parent_domain = meridian_core::account::Account {
            id: AccountId::from_uuid(parent.id),
            company_id: CompanyId::from_uuid(parent.company_id),
            number: parent.number.clone(),
            name: parent.name.clone(),
            account_type: parent.account_type.into(),
            category: parent.category.clone(),
            normal_balance: match parent.normal_balance {
                crate::entities::sea_orm_active_enums::NormalBalance::Debit => {
                    NormalBalance::Debit
                }
                crate::entities::sea_orm_active_enums::NormalBalance::Credit => {
                    NormalBalance::Credit
                }
            },
            parent_account_id: parent.parent_account_id.map(AccountId::from_uuid),
            hierarchy_level: u8::try_from(parent.hierarchy_level).unwrap_or(1),
            is_postable: parent.is_postable,
            cash_flow_category: None,
            is_intercompany: parent.is_intercompany,
            intercompany_partner_id: None,
            currency_restriction: parent.currency_restriction.clone(),
            is_retained_earnings: parent.is_retained_earnings,
            is_active: parent.is_active,
        };
        hierarchy::validate_parent(company, &parent_domain)?;

        // The chart of accounts is small; load the company's parent edges
        // once and let the pure walk detect cycles and depth.
        let all = self.list(company_id).await?;
        let edges: HashMap<AccountId, Option<AccountId>> = all
            .iter()
            .map(|a| {
                (
                    AccountId::from_uuid(a.id),
                    a.parent_account_id.map(AccountId::from_uuid),
                )
            })
            .collect();

        let level = hierarchy::validate_placement(
            account_id.map(AccountId::from_uuid),
            AccountId::from_uuid(parent_id),
            |id| edges.get(&id).copied(),
        )?;
        Ok(level)
    }
}
