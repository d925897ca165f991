//! `SeaORM` entity for the authorization policies table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::PolicyEffect;

/// An attribute-based access policy.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "policies")]
pub struct Model {
    /// Primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Organization scope.
    pub organization_id: Uuid,
    /// Display name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Subject condition (JSON).
    pub subject: Json,
    /// Resource condition (JSON).
    pub resource: Json,
    /// Action condition (JSON).
    pub action: Json,
    /// Environment condition (JSON), if any.
    pub environment: Option<Json>,
    /// Allow or deny.
    pub effect: PolicyEffect,
    /// Priority 0..=1000.
    pub priority: i16,
    /// System policies are immutable.
    pub is_system: bool,
    /// Inactive policies never match.
    pub is_active: bool,
    /// Who created the policy.
    pub created_by: Option<Uuid>,
    /// Row creation time.
    pub created_at: DateTimeWithTimeZone,
    /// Last update time.
    pub updated_at: DateTimeWithTimeZone,
}

/// No eagerly-declared relations; repositories query explicitly.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
