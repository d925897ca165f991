//! `SeaORM` entity for the exchange rates table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::RateType;

/// An effective-dated exchange rate.
///
/// Unique on (organization, from, to, effective date, rate type).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "exchange_rates")]
pub struct Model {
    /// Primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Organization scope.
    pub organization_id: Uuid,
    /// Source currency.
    pub from_currency: String,
    /// Target currency.
    pub to_currency: String,
    /// Effective date.
    pub effective_date: Date,
    /// Rate kind.
    pub rate_type: RateType,
    /// Units of target per unit of source.
    pub rate: Decimal,
    /// Provider name or "manual".
    pub source: Option<String>,
    /// Who created the rate.
    pub created_by: Option<Uuid>,
    /// Row creation time; tie-breaker for same-day rates.
    pub created_at: DateTimeWithTimeZone,
}

/// No eagerly-declared relations; repositories query explicitly.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
