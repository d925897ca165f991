//! `SeaORM` entity for the chart of accounts table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{AccountType, NormalBalance};

/// A chart of accounts node.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    /// Primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Owning company.
    pub company_id: Uuid,
    /// 4-digit number, unique per company.
    pub number: String,
    /// Display name.
    pub name: String,
    /// Fundamental type.
    pub account_type: AccountType,
    /// Reporting category.
    pub category: String,
    /// Normal balance side.
    pub normal_balance: NormalBalance,
    /// Parent account in the same company.
    pub parent_account_id: Option<Uuid>,
    /// Depth in the hierarchy (roots are 1).
    pub hierarchy_level: i16,
    /// Whether lines may post here directly.
    pub is_postable: bool,
    /// Cash flow classification ("operating" | "investing" | "financing").
    pub cash_flow_category: Option<String>,
    /// Intercompany flag.
    pub is_intercompany: bool,
    /// Counterparty company for intercompany accounts.
    pub intercompany_partner_id: Option<Uuid>,
    /// Restricts postings to one currency when set.
    pub currency_restriction: Option<String>,
    /// The company's retained earnings account flag.
    pub is_retained_earnings: bool,
    /// Whether the account is active.
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
