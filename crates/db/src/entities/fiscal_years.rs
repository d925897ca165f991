//! `SeaORM` entity for the fiscal years table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::FiscalYearStatus;

/// A fiscal year of a company.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "fiscal_years")]
pub struct Model {
    /// Primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Owning company.
    pub company_id: Uuid,
    /// Year number, unique per company.
    pub year: i32,
    /// First day.
    pub start_date: Date,
    /// Last day.
    pub end_date: Date,
    /// Status.
    pub status: FiscalYearStatus,
    /// Who closed the year.
    pub closed_by: Option<Uuid>,
    /// When it was closed.
    pub closed_at: Option<DateTimeWithTimeZone>,
    /// Row creation time.
    pub created_at: DateTimeWithTimeZone,
}

/// No eagerly-declared relations; repositories query explicitly.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
