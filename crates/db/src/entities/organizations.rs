//! `SeaORM` entity for the organizations table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// An organization (tenant).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "organizations")]
pub struct Model {
    /// Primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Display name, unique.
    pub name: String,
    /// Currency consolidated statements present in.
    pub reporting_currency: String,
    /// Locale tag (e.g. "en-US").
    pub locale: String,
    /// Default decimal places for presentation.
    pub default_decimal_places: i16,
    /// Intercompany variance tolerance in functional currency.
    pub ic_variance_tolerance: Decimal,
    /// Whether approval requires a second pair of eyes.
    pub sod_enabled: bool,
    /// Row creation time.
    pub created_at: DateTimeWithTimeZone,
    /// Last update time.
    pub updated_at: DateTimeWithTimeZone,
}

/// No eagerly-declared relations; repositories query explicitly.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
