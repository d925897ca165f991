//! `SeaORM` entity for the fiscal periods table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::FiscalPeriodStatus;

/// A fiscal period within a fiscal year.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "fiscal_periods")]
pub struct Model {
    /// Primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Owning fiscal year.
    pub fiscal_year_id: Uuid,
    /// Owning company (denormalized for date resolution).
    pub company_id: Uuid,
    /// Period number (1-12, 13 for adjustment).
    pub period_number: i16,
    /// Display name (e.g. "2025-06").
    pub name: String,
    /// First day.
    pub start_date: Date,
    /// Last day.
    pub end_date: Date,
    /// True for the adjustment period.
    pub is_adjustment: bool,
    /// Status.
    pub status: FiscalPeriodStatus,
    /// Who closed the period.
    pub closed_by: Option<Uuid>,
    /// When it was closed.
    pub closed_at: Option<DateTimeWithTimeZone>,
    /// Row creation time.
    pub created_at: DateTimeWithTimeZone,
    /// Last update time.
    pub updated_at: DateTimeWithTimeZone,
}

/// No eagerly-declared relations; repositories query explicitly.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
