//! `SeaORM` entity for the append-only audit log.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One audit record. Rows are append-only.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "audit_log")]
pub struct Model {
    /// Primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Organization scope.
    pub organization_id: Uuid,
    /// The acting user (system actions carry none).
    pub actor_id: Option<Uuid>,
    /// Action name, e.g. `journal_entry:post`.
    pub action: String,
    /// Entity type the action targeted.
    pub entity_type: String,
    /// Entity id the action targeted.
    pub entity_id: Uuid,
    /// Structured details (JSON).
    pub details: Json,
    /// When the action happened.
    pub recorded_at: DateTimeWithTimeZone,
}

/// No eagerly-declared relations; repositories query explicitly.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
