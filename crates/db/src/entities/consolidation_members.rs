//! `SeaORM` entity for consolidation group members.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::ConsolidationMethod;

/// A member company of a group. Unique on (group, company).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "consolidation_members")]
pub struct Model {
    /// Primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Owning group.
    pub group_id: Uuid,
    /// The member company.
    pub company_id: Uuid,
    /// Parent ownership percentage, 0..=100.
    pub ownership_percentage: Decimal,
    /// Consolidation method.
    pub method: ConsolidationMethod,
    /// Acquisition date.
    pub acquisition_date: Option<Date>,
    /// Goodwill at acquisition, in reporting currency.
    pub goodwill: Decimal,
    /// Variable-interest-entity flag.
    pub is_vie: bool,
    /// Row creation time.
    pub created_at: DateTimeWithTimeZone,
}

/// No eagerly-declared relations; repositories query explicitly.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
