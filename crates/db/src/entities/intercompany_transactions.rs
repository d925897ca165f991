//! `SeaORM` entity for the intercompany transactions table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{IcTransactionType, MatchingStatus};

/// An intercompany transaction pairing two group companies.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "intercompany_transactions")]
pub struct Model {
    /// Primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Organization scope.
    pub organization_id: Uuid,
    /// The originating company.
    pub from_company_id: Uuid,
    /// The counterparty company.
    pub to_company_id: Uuid,
    /// Transaction kind.
    pub transaction_type: IcTransactionType,
    /// Transaction date.
    pub transaction_date: Date,
    /// Agreed amount.
    pub amount: Decimal,
    /// Currency of the amount.
    pub currency: String,
    /// Originating side's journal entry.
    pub from_journal_entry_id: Option<Uuid>,
    /// Counterparty's journal entry.
    pub to_journal_entry_id: Option<Uuid>,
    /// Derived matching status.
    pub matching_status: MatchingStatus,
    /// Absolute variance between the booked sides.
    pub variance: Decimal,
    /// Reviewer explanation for an approved variance.
    pub variance_explanation: Option<String>,
    /// Row creation time.
    pub created_at: DateTimeWithTimeZone,
    /// Last update time.
    pub updated_at: DateTimeWithTimeZone,
}

/// No eagerly-declared relations; repositories query explicitly.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
