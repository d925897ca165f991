//! Session repository.
//!
//! Sessions authenticate opaque bearer tokens: the raw token leaves the
//! server exactly once (on creation) and only its SHA-256 digest is
//! stored. Validation refreshes the TTL.

use chrono::{Duration, Utc};
use rand::RngCore;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::entities::{organization_users, sessions, sea_orm_active_enums::UserRole};

/// Error types for session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Token unknown or expired.
    #[error("Session is invalid or expired")]
    Invalid,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl SessionError {
    /// Returns the wire discriminant for API responses.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Invalid => "SessionInvalidError",
            Self::Database(_) => "InternalServerError",
        }
    }
}

/// An authenticated caller resolved from a bearer token.
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// The session row id.
    pub session_id: Uuid,
    /// The authenticated user.
    pub user_id: Uuid,
    /// The organization the session is scoped to.
    pub organization_id: Uuid,
    /// The user's role in the organization.
    pub role: UserRole,
}

/// Session repository.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    db: DatabaseConnection,
    ttl_secs: i64,
}

impl SessionRepository {
    /// Creates a new session repository with the configured TTL.
    #[must_use]
    pub const fn new(db: DatabaseConnection, ttl_secs: i64) -> Self {
        Self { db, ttl_secs }
    }

    /// Creates a session and returns the opaque bearer token.
    ///
    /// # Errors
    ///
    /// Returns database errors.
    pub async fn create(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
    ) -> Result<String, SessionError> {
        let mut raw = [0u8; 32];
        rand::rng().fill_bytes(&mut raw);
        let token = base64_url::encode(&raw);

        let now = Utc::now();
        let session = sessions::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(user_id),
            organization_id: Set(organization_id),
            token_hash: Set(Self::hash(&token)),
            expires_at: Set((now + Duration::seconds(self.ttl_secs)).into()),
            created_at: Set(now.into()),
        };
        session.insert(&self.db).await?;

        Ok(token)
    }

    /// Validates a bearer token, refreshing its TTL.
    ///
    /// # Errors
    ///
    /// Returns `Invalid` for unknown, expired, or orphaned sessions.
    pub async fn validate(&self, token: &str) -> Result<AuthSession, SessionError> {
        let session = sessions::Entity::find()
            .filter(sessions::Column::TokenHash.eq(Self::hash(token)))
            .one(&self.db)
            .await?
            .ok_or(SessionError::Invalid)?;

        let now = Utc::now();
        if session.expires_at < now {
            return Err(SessionError::Invalid);
        }

        let membership = organization_users::Entity::find_by_id((
            session.organization_id,
            session.user_id,
        ))
        .one(&self.db)
        .await?
        .ok_or(SessionError::Invalid)?;

        // Sliding expiry: every authenticated request extends the session.
        let session_id = session.id;
        let user_id = session.user_id;
        let organization_id = session.organization_id;
        let mut active: sessions::ActiveModel = session.into();
        active.expires_at = Set((now + Duration::seconds(self.ttl_secs)).into());
        active.update(&self.db).await?;

        Ok(AuthSession {
            session_id,
            user_id,
            organization_id,
            role: membership.role,
        })
    }

    /// Revokes a session by token.
    ///
    /// # Errors
    ///
    /// Returns database errors.
    pub async fn revoke(&self, token: &str) -> Result<(), SessionError> {
        sessions::Entity::delete_many()
            .filter(sessions::Column::TokenHash.eq(Self::hash(token)))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    fn hash(token: &str) -> String {
        let digest = Sha256::digest(token.as_bytes());
        base64_url::encode(&digest)
    }
}
