//! `SeaORM` entity for elimination rules.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::EliminationRuleType;

/// An elimination rule attached to a group.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "elimination_rules")]
pub struct Model {
    /// Primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Owning group.
    pub group_id: Uuid,
    /// Display name.
    pub name: String,
    /// The debit/credit pattern.
    pub rule_type: EliminationRuleType,
    /// Gating conditions (JSON array).
    pub trigger_conditions: Json,
    /// Source-side selectors (JSON array).
    pub source_selectors: Json,
    /// Target-side selectors (JSON array).
    pub target_selectors: Json,
    /// Explicit debit account for deferral rules.
    pub debit_account_id: Option<Uuid>,
    /// Explicit credit account for deferral rules.
    pub credit_account_id: Option<Uuid>,
    /// Automatic rules run in every consolidation.
    pub is_automatic: bool,
    /// Evaluation order, ascending.
    pub priority: i16,
    /// Inactive rules never fire.
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
