//! Consolidation repository.
//!
//! Groups, members, elimination rules, and durable run persistence. The
//! run row's JSONB payload (the serialized core run record) is the ground
//! truth a worker resumes from; queue polling uses the denormalized
//! status column with `FOR UPDATE SKIP LOCKED`, and one run per
//! (group, period) is enforced with a Postgres advisory lock on the key.

use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};
use meridian_core::consolidation::{
    AccountSelector, ConsolidationError, ConsolidationGroup, ConsolidationRun, GroupMember,
    MemberCompanyInfo, MemberTrialBalance, RunInputs, RunOptions, RunStatus, TranslationRates,
};
use meridian_core::consolidation::types::{EliminationRule, MemberBalance, TriggerCondition};
use meridian_core::fiscal::FiscalPeriodRef;
use meridian_core::fx;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, DbErr,
    EntityTrait, QueryFilter, QueryOrder, Set, Statement,
};
use uuid::Uuid;

use crate::entities::{
    accounts, companies, consolidation_groups, consolidation_members, consolidation_runs,
    elimination_rules, fiscal_periods, fiscal_years, organizations,
    sea_orm_active_enums::{self, CompanyStatus},
};
use crate::repositories::exchange_rate::ExchangeRateRepository;
use crate::repositories::intercompany::IntercompanyRepository;
use crate::repositories::journal::JournalRepository;

/// Error types for consolidation operations.
#[derive(Debug, thiserror::Error)]
pub enum ConsolidationRepoError {
    /// Domain rule violation.
    #[error(transparent)]
    Domain(#[from] ConsolidationError),

    /// A stored payload failed to (de)serialize.
    #[error("Invalid run payload: {0}")]
    InvalidPayload(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl ConsolidationRepoError {
    /// Returns the wire discriminant for API responses.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Domain(err) => err.tag(),
            Self::InvalidPayload(_) => "InternalServerError",
            Self::Database(_) => "InternalServerError",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Domain(err) => err.status_code(),
            Self::InvalidPayload(_) | Self::Database(_) => 500,
        }
    }
}

/// Input for creating a consolidation group.
#[derive(Debug, Clone)]
pub struct CreateGroupInput {
    /// Organization scope.
    pub organization_id: Uuid,
    /// Display name.
    pub name: String,
    /// Reporting currency.
    pub reporting_currency: String,
    /// The parent company (added as a 100% member).
    pub parent_company_id: Uuid,
}

/// Input for adding a group member.
#[derive(Debug, Clone)]
pub struct AddMemberInput {
    /// The group.
    pub group_id: Uuid,
    /// The member company.
    pub company_id: Uuid,
    /// Parent ownership percentage.
    pub ownership_percentage: Decimal,
    /// Consolidation method.
    pub method: sea_orm_active_enums::ConsolidationMethod,
    /// Acquisition date.
    pub acquisition_date: Option<NaiveDate>,
    /// Goodwill at acquisition.
    pub goodwill: Decimal,
    /// Variable-interest-entity flag.
    pub is_vie: bool,
}

/// Input for creating an elimination rule.
#[derive(Debug, Clone)]
pub struct CreateRuleInput {
    /// The group.
    pub group_id: Uuid,
    /// Display name.
    pub name: String,
    /// The debit/credit pattern.
    pub rule_type: sea_orm_active_enums::EliminationRuleType,
    /// Gating conditions.
    pub trigger_conditions: Vec<TriggerCondition>,
    /// Source-side selectors.
    pub source_selectors: Vec<AccountSelector>,
    /// Target-side selectors.
    pub target_selectors: Vec<AccountSelector>,
    /// Explicit debit account for deferral rules.
    pub debit_account_id: Option<Uuid>,
    /// Explicit credit account for deferral rules.
    pub credit_account_id: Option<Uuid>,
    /// Evaluation order, ascending.
    pub priority: u16,
}

/// Consolidation repository.
#[derive(Debug, Clone)]
pub struct ConsolidationRepository {
    db: DatabaseConnection,
}

impl ConsolidationRepository {
    /// Creates a new consolidation repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a group with the parent as its first (100%) member.
    ///
    /// # Errors
    ///
    /// Returns database errors.
    pub async fn create_group(
        &self,
        input: CreateGroupInput,
    ) -> Result<consolidation_groups::Model, ConsolidationRepoError> {
        let now = Utc::now().into();
        let group = consolidation_groups::ActiveModel {
            id: Set(Uuid::now_v7()),
            organization_id: Set(input.organization_id),
            name: Set(input.name),
            reporting_currency: Set(input.reporting_currency.to_uppercase()),
            parent_company_id: Set(input.parent_company_id),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let group = group.insert(&self.db).await?;

        let parent_member = consolidation_members::ActiveModel {
            id: Set(Uuid::now_v7()),
            group_id: Set(group.id),
            company_id: Set(input.parent_company_id),
            ownership_percentage: Set(Decimal::ONE_HUNDRED),
            method: Set(sea_orm_active_enums::ConsolidationMethod::FullConsolidation),
            acquisition_date: Set(None),
            goodwill: Set(Decimal::ZERO),
            is_vie: Set(false),
            created_at: Set(now),
        };
        parent_member.insert(&self.db).await?;

        Ok(group)
    }

    /// Fetches a group row.
    ///
    /// # Errors
    ///
    /// Returns `GroupNotFound` when it does not exist.
    pub async fn get_group(
        &self,
        id: Uuid,
    ) -> Result<consolidation_groups::Model, ConsolidationRepoError> {
        consolidation_groups::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ConsolidationError::GroupNotFound(id).into())
    }

    /// Lists an organization's groups.
    ///
    /// # Errors
    ///
    /// Returns database errors.
    pub async fn list_groups(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<consolidation_groups::Model>, ConsolidationRepoError> {
        Ok(consolidation_groups::Entity::find()
            .filter(consolidation_groups::Column::OrganizationId.eq(organization_id))
            .order_by_asc(consolidation_groups::Column::Name)
            .all(&self.db)
            .await?)
    }

    /// Adds a member company to a group.
    ///
    /// # Errors
    ///
    /// - `ConsolidationMemberAlreadyExistsError` for a duplicate company.
    /// - `OwnershipOutOfRangeError` outside 0..=100.
    pub async fn add_member(
        &self,
        input: AddMemberInput,
    ) -> Result<consolidation_members::Model, ConsolidationRepoError> {
        if input.ownership_percentage < Decimal::ZERO
            || input.ownership_percentage > Decimal::ONE_HUNDRED
        {
            return Err(
                ConsolidationError::OwnershipOutOfRange(input.ownership_percentage).into(),
            );
        }

        let existing = consolidation_members::Entity::find()
            .filter(consolidation_members::Column::GroupId.eq(input.group_id))
            .filter(consolidation_members::Column::CompanyId.eq(input.company_id))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(ConsolidationError::MemberAlreadyExists(input.company_id).into());
        }

        let member = consolidation_members::ActiveModel {
            id: Set(Uuid::now_v7()),
            group_id: Set(input.group_id),
            company_id: Set(input.company_id),
            ownership_percentage: Set(input.ownership_percentage),
            method: Set(input.method),
            acquisition_date: Set(input.acquisition_date),
            goodwill: Set(input.goodwill),
            is_vie: Set(input.is_vie),
            created_at: Set(Utc::now().into()),
        };
        Ok(member.insert(&self.db).await?)
    }

    /// Creates an elimination rule.
    ///
    /// # Errors
    ///
    /// Returns database errors.
    pub async fn create_rule(
        &self,
        input: CreateRuleInput,
    ) -> Result<elimination_rules::Model, ConsolidationRepoError> {
        let now = Utc::now().into();
        let rule = elimination_rules::ActiveModel {
            id: Set(Uuid::now_v7()),
            group_id: Set(input.group_id),
            name: Set(input.name),
            rule_type: Set(input.rule_type),
            trigger_conditions: Set(to_json(&input.trigger_conditions)?),
            source_selectors: Set(to_json(&input.source_selectors)?),
            target_selectors: Set(to_json(&input.target_selectors)?),
            debit_account_id: Set(input.debit_account_id),
            credit_account_id: Set(input.credit_account_id),
            is_automatic: Set(true),
            priority: Set(i16::try_from(input.priority).unwrap_or(100)),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(rule.insert(&self.db).await?)
    }

    /// Lists a group's rules, priority-ascending.
    ///
    /// # Errors
    ///
    /// Returns database errors.
    pub async fn list_rules(
        &self,
        group_id: Uuid,
    ) -> Result<Vec<elimination_rules::Model>, ConsolidationRepoError> {
        Ok(elimination_rules::Entity::find()
            .filter(elimination_rules::Column::GroupId.eq(group_id))
            .order_by_asc(elimination_rules::Column::Priority)
            .all(&self.db)
            .await?)
    }

    /// Initiates a run for a group and period.
    ///
    /// # Errors
    ///
    /// Returns `ConsolidationRunInProgressError` while another run for
    /// the same (group, period) is pending or in progress.
    pub async fn initiate_run(
        &self,
        group_id: Uuid,
        period: FiscalPeriodRef,
        as_of_date: NaiveDate,
        options: RunOptions,
        initiated_by: Uuid,
    ) -> Result<ConsolidationRun, ConsolidationRepoError> {
        let group = self.get_group(group_id).await?;
        if !group.is_active {
            return Err(ConsolidationError::GroupInactive(group_id).into());
        }

        let active = consolidation_runs::Entity::find()
            .filter(consolidation_runs::Column::GroupId.eq(group_id))
            .filter(consolidation_runs::Column::FiscalYear.eq(period.year))
            .filter(consolidation_runs::Column::PeriodNumber.eq(i16::from(period.period)))
            .filter(consolidation_runs::Column::Status.is_in([
                sea_orm_active_enums::RunStatus::Pending,
                sea_orm_active_enums::RunStatus::InProgress,
            ]))
            .one(&self.db)
            .await?;
        if active.is_some() {
            return Err(ConsolidationError::RunAlreadyInProgress.into());
        }

        let run = ConsolidationRun::new(group_id, period, as_of_date, options, initiated_by);

        let model = consolidation_runs::ActiveModel {
            id: Set(run.id),
            group_id: Set(group_id),
            fiscal_year: Set(period.year),
            period_number: Set(i16::from(period.period)),
            as_of_date: Set(as_of_date),
            status: Set(run.status.into()),
            payload: Set(to_json(&run)?),
            initiated_by: Set(initiated_by),
            initiated_at: Set(run.initiated_at.into()),
            started_at: Set(None),
            completed_at: Set(None),
            error_message: Set(None),
            updated_at: Set(Utc::now().into()),
        };
        model.insert(&self.db).await?;

        Ok(run)
    }

    /// Loads a run's payload.
    ///
    /// # Errors
    ///
    /// Returns `ConsolidationRunNotFoundError` for unknown ids.
    pub async fn get_run(&self, id: Uuid) -> Result<ConsolidationRun, ConsolidationRepoError> {
        let model = consolidation_runs::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(ConsolidationError::RunNotFound(id))?;
        from_json(model.payload)
    }

    /// Persists a run's payload and denormalized columns.
    ///
    /// # Errors
    ///
    /// Returns database errors.
    pub async fn save_run(&self, run: &ConsolidationRun) -> Result<(), ConsolidationRepoError> {
        let model = consolidation_runs::Entity::find_by_id(run.id)
            .one(&self.db)
            .await?
            .ok_or(ConsolidationError::RunNotFound(run.id))?;

        let mut active: consolidation_runs::ActiveModel = model.into();
        active.status = Set(run.status.into());
        active.payload = Set(to_json(run)?);
        active.started_at = Set(run.started_at.map(Into::into));
        active.completed_at = Set(run.completed_at.map(Into::into));
        active.error_message = Set(run.error_message.clone());
        active.updated_at = Set(Utc::now().into());
        active.update(&self.db).await?;
        Ok(())
    }

    /// Cancels a run (Pending or InProgress only). The cooperative cancel
    /// flag is the persisted status: the worker re-reads it between
    /// steps and stops at the next boundary.
    ///
    /// # Errors
    ///
    /// Returns `ConsolidationRunStatusError` for finished runs.
    pub async fn cancel_run(&self, id: Uuid) -> Result<ConsolidationRun, ConsolidationRepoError> {
        let mut run = self.get_run(id).await?;
        meridian_core::consolidation::ConsolidationPipeline::cancel(&mut run)?;
        self.save_run(&run).await?;
        Ok(run)
    }

    /// Claims the oldest pending run using `FOR UPDATE SKIP LOCKED`, then
    /// takes the (group, period) advisory lock. Returns `None` when the
    /// queue is empty or the key is locked by another worker.
    ///
    /// # Errors
    ///
    /// Returns database errors.
    pub async fn claim_pending_run(
        &self,
    ) -> Result<Option<ConsolidationRun>, ConsolidationRepoError> {
        let stmt = Statement::from_string(
            DbBackend::Postgres,
            r"UPDATE consolidation_runs
              SET status = 'in_progress', updated_at = NOW()
              WHERE id = (
                  SELECT id FROM consolidation_runs
                  WHERE status = 'pending'
                  ORDER BY initiated_at ASC
                  LIMIT 1
                  FOR UPDATE SKIP LOCKED
              )
              RETURNING id",
        );
        let Some(row) = self.db.query_one(stmt).await? else {
            return Ok(None);
        };
        let run_id: Uuid = row.try_get("", "id")?;

        let mut run = self.get_run(run_id).await?;
        if !self.try_lock_period(&run).await? {
            // Another worker holds the key; requeue and move on.
            run.status = RunStatus::Pending;
            self.save_run(&run).await?;
            return Ok(None);
        }

        run.status = RunStatus::InProgress;
        self.save_run(&run).await?;
        Ok(Some(run))
    }

    /// Releases the run's (group, period) advisory lock.
    ///
    /// # Errors
    ///
    /// Returns database errors.
    pub async fn release_period_lock(
        &self,
        run: &ConsolidationRun,
    ) -> Result<(), ConsolidationRepoError> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT pg_advisory_unlock(hashtextextended($1, 0))",
            [Self::lock_key(run).into()],
        );
        self.db.query_one(stmt).await?;
        Ok(())
    }

    async fn try_lock_period(
        &self,
        run: &ConsolidationRun,
    ) -> Result<bool, ConsolidationRepoError> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT pg_try_advisory_lock(hashtextextended($1, 0)) AS locked",
            [Self::lock_key(run).into()],
        );
        let row = self
            .db
            .query_one(stmt)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound("advisory lock".to_string()))?;
        Ok(row.try_get("", "locked")?)
    }

    fn lock_key(run: &ConsolidationRun) -> String {
        format!(
            "consolidation:{}:{}:{}",
            run.group_id, run.period.year, run.period.period
        )
    }

    /// Loads the frozen inputs of a run: group, member companies and
    /// trial balances, translation rates, rules, intercompany
    /// transactions, the account-number index, and period metadata.
    ///
    /// # Errors
    ///
    /// Returns domain and database errors.
    pub async fn load_inputs(
        &self,
        run: &ConsolidationRun,
    ) -> Result<RunInputs, ConsolidationRepoError> {
        let group_model = self.get_group(run.group_id).await?;
        let organization = organizations::Entity::find_by_id(group_model.organization_id)
            .one(&self.db)
            .await?;
        let tolerance = organization
            .as_ref()
            .map_or(meridian_core::intercompany::DEFAULT_TOLERANCE, |o| {
                o.ic_variance_tolerance
            });

        let member_models = consolidation_members::Entity::find()
            .filter(consolidation_members::Column::GroupId.eq(run.group_id))
            .order_by_asc(consolidation_members::Column::CreatedAt)
            .all(&self.db)
            .await?;

        let members: Vec<GroupMember> = member_models
            .iter()
            .map(|m| GroupMember {
                company_id: m.company_id,
                ownership_percentage: m.ownership_percentage,
                method: m.method.clone().into(),
                acquisition_date: m.acquisition_date,
                goodwill: m.goodwill,
                is_vie: m.is_vie,
            })
            .collect();

        let group = ConsolidationGroup {
            id: group_model.id,
            organization_id: group_model.organization_id,
            name: group_model.name.clone(),
            reporting_currency: group_model.reporting_currency.clone(),
            parent_company_id: group_model.parent_company_id,
            members,
            is_active: group_model.is_active,
        };

        // Member companies, their frozen trial balances, and the account
        // number index.
        let journal = JournalRepository::new(self.db.clone());
        let rates_repo = ExchangeRateRepository::new(self.db.clone());
        let mut companies_info = Vec::new();
        let mut member_tbs = Vec::new();
        let mut rates = BTreeMap::new();
        let mut account_numbers = BTreeMap::new();

        // Period metadata comes from the parent company's calendar.
        let (period_status, period_start, period_end) = self
            .parent_period(group.parent_company_id, run.period)
            .await?
            .map_or((None, run.as_of_date, run.as_of_date), |p| {
                (Some(p.0), p.1, p.2)
            });

        for member in &group.members {
            let Some(company) = companies::Entity::find_by_id(member.company_id)
                .one(&self.db)
                .await?
            else {
                companies_info.push(MemberCompanyInfo {
                    company_id: member.company_id,
                    name: member.company_id.to_string(),
                    is_active: false,
                });
                continue;
            };

            companies_info.push(MemberCompanyInfo {
                company_id: company.id,
                name: company.name.clone(),
                is_active: company.status == CompanyStatus::Active,
            });

            let balance_rows = journal.balance_rows(company.id, run.as_of_date).await
                .map_err(|e| ConsolidationRepoError::InvalidPayload(e.to_string()))?;
            let rows: Vec<MemberBalance> = balance_rows
                .into_iter()
                .filter(|r| !r.signed_balance().is_zero())
                .map(|r| MemberBalance {
                    account_id: r.account_id,
                    account_number: r.account_number.clone(),
                    account_name: r.account_name.clone(),
                    account_type: r.account_type,
                    category: r.category.clone(),
                    is_intercompany: false,
                    balance: r.signed_balance(),
                })
                .collect();

            // Mark intercompany rows from the chart of accounts.
            let company_accounts = accounts::Entity::find()
                .filter(accounts::Column::CompanyId.eq(company.id))
                .all(&self.db)
                .await?;
            let ic_numbers: std::collections::BTreeSet<&str> = company_accounts
                .iter()
                .filter(|a| a.is_intercompany)
                .map(|a| a.number.as_str())
                .collect();
            let rows = rows
                .into_iter()
                .map(|mut r| {
                    r.is_intercompany = ic_numbers.contains(r.account_number.as_str());
                    r
                })
                .collect();

            for account in &company_accounts {
                account_numbers.insert(account.id, account.number.clone());
            }

            member_tbs.push(MemberTrialBalance {
                company_id: company.id,
                company_name: company.name.clone(),
                currency: company.functional_currency.clone(),
                rows,
            });

            // Translation rates for members not already in reporting
            // currency.
            if !company
                .functional_currency
                .eq_ignore_ascii_case(&group.reporting_currency)
            {
                let average = rates_repo
                    .get_period_average(
                        group.organization_id,
                        &company.functional_currency,
                        &group.reporting_currency,
                        period_start,
                        period_end,
                    )
                    .await
                    .map_err(|e| ConsolidationRepoError::InvalidPayload(e.to_string()))?;
                let closing = rates_repo
                    .get_period_closing(
                        group.organization_id,
                        &company.functional_currency,
                        &group.reporting_currency,
                        period_end,
                    )
                    .await
                    .map_err(|e| ConsolidationRepoError::InvalidPayload(e.to_string()))?;
                let historical_date = member.acquisition_date.unwrap_or(period_end);
                let historical = rates_repo
                    .get_closest(
                        group.organization_id,
                        &company.functional_currency,
                        &group.reporting_currency,
                        fx::RateType::Historical,
                        historical_date,
                    )
                    .await
                    .map_err(|e| ConsolidationRepoError::InvalidPayload(e.to_string()))?
                    .map(|(rate, _)| rate);

                if let (Some(average), Some(closing)) = (average, closing) {
                    rates.insert(
                        company.id,
                        TranslationRates {
                            average,
                            closing,
                            // Contributed capital translates at the
                            // acquisition-date rate; absent a stored
                            // historical rate the closing rate stands in.
                            historical: historical.unwrap_or(closing),
                        },
                    );
                }
            }
        }

        let ic_repo = IntercompanyRepository::new(self.db.clone());
        let ic_transactions = ic_repo
            .domain_transactions(group.organization_id)
            .await
            .map_err(|e| ConsolidationRepoError::InvalidPayload(e.to_string()))?;

        let rule_models = self.list_rules(run.group_id).await?;
        let mut rules = Vec::with_capacity(rule_models.len());
        for model in rule_models {
            rules.push(to_domain_rule(model)?);
        }

        Ok(RunInputs {
            group,
            companies: companies_info,
            member_tbs,
            rates,
            rules,
            ic_transactions,
            account_numbers,
            period_status,
            period_start,
            period_end,
            ic_tolerance: tolerance,
        })
    }

    /// Resolves the parent company's period for the run's period ref.
    async fn parent_period(
        &self,
        parent_company_id: Uuid,
        period: FiscalPeriodRef,
    ) -> Result<
        Option<(meridian_core::fiscal::FiscalPeriodStatus, NaiveDate, NaiveDate)>,
        ConsolidationRepoError,
    > {
        let Some(year) = fiscal_years::Entity::find()
            .filter(fiscal_years::Column::CompanyId.eq(parent_company_id))
            .filter(fiscal_years::Column::Year.eq(period.year))
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        let Some(model) = fiscal_periods::Entity::find()
            .filter(fiscal_periods::Column::FiscalYearId.eq(year.id))
            .filter(fiscal_periods::Column::PeriodNumber.eq(i16::from(period.period)))
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        Ok(Some((
            model.status.into(),
            model.start_date,
            model.end_date,
        )))
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, ConsolidationRepoError> {
    serde_json::to_value(value).map_err(|e| ConsolidationRepoError::InvalidPayload(e.to_string()))
}

fn from_json<T: serde::de::DeserializeOwned>(
    value: serde_json::Value,
) -> Result<T, ConsolidationRepoError> {
    serde_json::from_value(value)
        .map_err(|e| ConsolidationRepoError::InvalidPayload(e.to_string()))
}

/// Maps a stored rule into the core domain type.
///
/// # Errors
///
/// Returns `InvalidPayload` when selector JSON fails to parse.
pub fn to_domain_rule(
    model: elimination_rules::Model,
) -> Result<EliminationRule, ConsolidationRepoError> {
    Ok(EliminationRule {
        id: model.id,
        group_id: model.group_id,
        name: model.name,
        rule_type: model.rule_type.into(),
        trigger_conditions: from_json(model.trigger_conditions)?,
        source_selectors: from_json(model.source_selectors)?,
        target_selectors: from_json(model.target_selectors)?,
        debit_account_id: model.debit_account_id,
        credit_account_id: model.credit_account_id,
        is_automatic: model.is_automatic,
        priority: u16::try_from(model.priority).unwrap_or(0),
        is_active: model.is_active,
    })
}
