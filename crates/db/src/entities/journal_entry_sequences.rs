//! `SeaORM` entity for per-company entry number sequences.
//!
//! The row is locked (`SELECT ... FOR UPDATE`) while an entry posts, so
//! numbers are strictly monotonic per company though not necessarily
//! contiguous (a failed post abandons its number).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// The next entry number for a company.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "journal_entry_sequences")]
pub struct Model {
    /// Company primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub company_id: Uuid,
    /// The next number to assign.
    pub next_number: i64,
}

/// No eagerly-declared relations; repositories query explicitly.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
