//! `SeaORM` entity for consolidation runs.
//!
//! The `payload` column persists the full run record — step states,
//! options, intermediate outputs, and the consolidated trial balance — as
//! JSONB; it is the ground truth a crashed worker resumes from. Status
//! and timing columns are denormalized for queue polling.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::RunStatus;

/// A durable consolidation run.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "consolidation_runs")]
pub struct Model {
    /// Primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// The group being consolidated.
    pub group_id: Uuid,
    /// Fiscal year of the consolidated period.
    pub fiscal_year: i32,
    /// Period number of the consolidated period.
    pub period_number: i16,
    /// Balance cut-off date.
    pub as_of_date: Date,
    /// Run status (denormalized from payload for polling).
    pub status: RunStatus,
    /// The serialized run record (steps, outputs, trial balance).
    pub payload: Json,
    /// Who initiated the run.
    pub initiated_by: Uuid,
    /// When it was initiated.
    pub initiated_at: DateTimeWithTimeZone,
    /// When the first step started.
    pub started_at: Option<DateTimeWithTimeZone>,
    /// When the run finished.
    pub completed_at: Option<DateTimeWithTimeZone>,
    /// Failure message, if failed.
    pub error_message: Option<String>,
    /// Last update time.
    pub updated_at: DateTimeWithTimeZone,
}

/// No eagerly-declared relations; repositories query explicitly.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
