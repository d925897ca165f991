//! `SeaORM` entity for the append-only authorization denial log.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One denied request. Rows are append-only.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "authorization_denials")]
pub struct Model {
    /// Primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Organization scope.
    pub organization_id: Uuid,
    /// The denied user.
    pub user_id: Uuid,
    /// The attempted action.
    pub action: String,
    /// The resource type.
    pub resource_type: String,
    /// The resource id, when known.
    pub resource_id: Option<Uuid>,
    /// The policy ids that matched during evaluation (JSON array).
    pub matched_policy_ids: Json,
    /// Caller IP.
    pub ip_address: Option<String>,
    /// Caller user agent.
    pub user_agent: Option<String>,
    /// When the denial happened.
    pub denied_at: DateTimeWithTimeZone,
}

/// No eagerly-declared relations; repositories query explicitly.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
