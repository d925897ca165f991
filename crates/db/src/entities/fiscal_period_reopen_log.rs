//! `SeaORM` entity for the append-only period reopen log.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One reopen event. Rows are append-only, never updated or deleted.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "fiscal_period_reopen_log")]
pub struct Model {
    /// Primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// The reopened period.
    pub fiscal_period_id: Uuid,
    /// Who reopened it.
    pub reopened_by: Uuid,
    /// When it was reopened.
    pub reopened_at: DateTimeWithTimeZone,
    /// Optional justification.
    pub reason: Option<String>,
}

/// No eagerly-declared relations; repositories query explicitly.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
