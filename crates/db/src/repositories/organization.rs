//! Organization repository.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, Set,
};
use uuid::Uuid;

use crate::entities::{companies, organization_users, organizations, sea_orm_active_enums::UserRole};

/// Error types for organization operations.
#[derive(Debug, thiserror::Error)]
pub enum OrganizationError {
    /// Organization not found.
    #[error("Organization not found: {0}")]
    NotFound(Uuid),

    /// Name already taken.
    #[error("Organization name '{0}' already exists")]
    NameAlreadyExists(String),

    /// Deletion is blocked while companies exist.
    #[error("Organization still has {0} companies")]
    HasCompanies(u64),

    /// The last owner cannot be removed.
    #[error("Organization owner cannot be removed")]
    OwnerCannotBeRemoved,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl OrganizationError {
    /// Returns the wire discriminant for API responses.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "OrganizationNotFoundError",
            Self::NameAlreadyExists(_) => "OrganizationNameAlreadyExistsError",
            Self::HasCompanies(_) => "OrganizationHasCompaniesError",
            Self::OwnerCannotBeRemoved => "OwnerCannotBeRemovedError",
            Self::Database(_) => "InternalServerError",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::NameAlreadyExists(_) => 409,
            Self::HasCompanies(_) | Self::OwnerCannotBeRemoved => 422,
            Self::Database(_) => 500,
        }
    }
}

/// Input for creating an organization.
#[derive(Debug, Clone)]
pub struct CreateOrganizationInput {
    /// Display name, unique.
    pub name: String,
    /// Reporting currency (ISO 4217).
    pub reporting_currency: String,
    /// Locale tag.
    pub locale: String,
    /// The first admin user.
    pub owner_user_id: Uuid,
}

/// Organization repository.
#[derive(Debug, Clone)]
pub struct OrganizationRepository {
    db: DatabaseConnection,
}

impl OrganizationRepository {
    /// Creates a new organization repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an organization and its owner membership.
    ///
    /// # Errors
    ///
    /// Returns `NameAlreadyExists` on a duplicate name.
    pub async fn create(
        &self,
        input: CreateOrganizationInput,
    ) -> Result<organizations::Model, OrganizationError> {
        let existing = organizations::Entity::find()
            .filter(organizations::Column::Name.eq(&input.name))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(OrganizationError::NameAlreadyExists(input.name));
        }

        let now = Utc::now().into();
        let organization = organizations::ActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(input.name),
            reporting_currency: Set(input.reporting_currency.to_uppercase()),
            locale: Set(input.locale),
            default_decimal_places: Set(2),
            ic_variance_tolerance: Set(Decimal::new(1, 2)),
            sod_enabled: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let organization = organization.insert(&self.db).await?;

        let membership = organization_users::ActiveModel {
            organization_id: Set(organization.id),
            user_id: Set(input.owner_user_id),
            role: Set(UserRole::Owner),
            created_at: Set(now),
        };
        membership.insert(&self.db).await?;

        Ok(organization)
    }

    /// Fetches an organization by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when it does not exist.
    pub async fn get(&self, id: Uuid) -> Result<organizations::Model, OrganizationError> {
        organizations::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(OrganizationError::NotFound(id))
    }

    /// Deletes an organization.
    ///
    /// # Errors
    ///
    /// Returns `HasCompanies` when any company still exists.
    pub async fn delete(&self, id: Uuid) -> Result<(), OrganizationError> {
        let company_count = companies::Entity::find()
            .filter(companies::Column::OrganizationId.eq(id))
            .count(&self.db)
            .await?;
        if company_count > 0 {
            return Err(OrganizationError::HasCompanies(company_count));
        }

        let result = organizations::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(OrganizationError::NotFound(id));
        }
        Ok(())
    }

    /// Adds a member with a role.
    ///
    /// # Errors
    ///
    /// Returns database errors (duplicate membership violates the key).
    pub async fn add_member(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
        role: UserRole,
    ) -> Result<(), OrganizationError> {
        let membership = organization_users::ActiveModel {
            organization_id: Set(organization_id),
            user_id: Set(user_id),
            role: Set(role),
            created_at: Set(Utc::now().into()),
        };
        membership.insert(&self.db).await?;
        Ok(())
    }

    /// Removes a member. The owner cannot be removed.
    ///
    /// # Errors
    ///
    /// Returns `OwnerCannotBeRemoved` for the owner membership.
    pub async fn remove_member(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), OrganizationError> {
        let membership = organization_users::Entity::find_by_id((organization_id, user_id))
            .one(&self.db)
            .await?
            .ok_or(OrganizationError::NotFound(user_id))?;
        if membership.role == UserRole::Owner {
            return Err(OrganizationError::OwnerCannotBeRemoved);
        }
        organization_users::Entity::delete_by_id((organization_id, user_id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    /// Returns a user's role in the organization, if a member.
    ///
    /// # Errors
    ///
    /// Returns database errors.
    pub async fn member_role(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<UserRole>, OrganizationError> {
        let membership = organization_users::Entity::find_by_id((organization_id, user_id))
            .one(&self.db)
            .await?;
        Ok(membership.map(|m| m.role))
    }

    /// Returns true if the user belongs to the organization.
    ///
    /// # Errors
    ///
    /// Returns database errors.
    pub async fn is_member(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, OrganizationError> {
        Ok(self.member_role(organization_id, user_id).await?.is_some())
    }
}
