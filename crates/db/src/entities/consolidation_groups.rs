//! `SeaORM` entity for the consolidation groups table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A consolidation group.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "consolidation_groups")]
pub struct Model {
    /// Primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Organization scope.
    pub organization_id: Uuid,
    /// Display name.
    pub name: String,
    /// Currency consolidated statements present in.
    pub reporting_currency: String,
    /// The parent company.
    pub parent_company_id: Uuid,
    /// Whether the group can run consolidations.
    pub is_active: bool,
    /// Row creation time.
    pub created_at: DateTimeWithTimeZone,
    /// Last update time.
    pub updated_at: DateTimeWithTimeZone,
}

/// No eagerly-declared relations; repositories query explicitly.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
