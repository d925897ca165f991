//! `SeaORM` entity for the companies table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::CompanyStatus;

/// A legal entity under an organization.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "companies")]
pub struct Model {
    /// Primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Owning organization.
    pub organization_id: Uuid,
    /// Name, unique per organization.
    pub name: String,
    /// Jurisdiction (country code).
    pub jurisdiction: String,
    /// The currency the company operates in.
    pub functional_currency: String,
    /// The currency the company reports in.
    pub reporting_currency: String,
    /// Fiscal year end month (1-12).
    pub fiscal_year_end_month: i16,
    /// Fiscal year end day.
    pub fiscal_year_end_day: i16,
    /// The retained earnings account year-end close offsets into.
    pub retained_earnings_account_id: Option<Uuid>,
    /// Lifecycle status.
    pub status: CompanyStatus,
    /// Row creation time.
    pub created_at: DateTimeWithTimeZone,
    /// Last update time.
    pub updated_at: DateTimeWithTimeZone,
}

/// No eagerly-declared relations; repositories query explicitly.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
