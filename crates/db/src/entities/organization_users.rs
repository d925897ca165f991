//! `SeaORM` entity for the organization membership table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::UserRole;

/// A user's membership and role in an organization.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "organization_users")]
pub struct Model {
    /// Organization half of the composite key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub organization_id: Uuid,
    /// User half of the composite key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: Uuid,
    /// Role within the organization.
    pub role: UserRole,
    /// Row creation time.
    pub created_at: DateTimeWithTimeZone,
}

/// No eagerly-declared relations; repositories query explicitly.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
