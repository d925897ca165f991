//! `SeaORM` entity for the sessions table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A bearer session.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "sessions")]
pub struct Model {
    /// Primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// The authenticated user.
    pub user_id: Uuid,
    /// The organization the session is scoped to.
    pub organization_id: Uuid,
    /// SHA-256 digest of the opaque bearer token.
    pub token_hash: String,
    /// Expiry; refresh extends it.
    pub expires_at: DateTimeWithTimeZone,
    /// Row creation time.
    pub created_at: DateTimeWithTimeZone,
}

/// No eagerly-declared relations; repositories query explicitly.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
