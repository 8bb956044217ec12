use async_trait::async_trait;
use atrium_core::{AppResult, OrganizationId};
use atrium_domain::{CustomRole, CustomRoleId};

use crate::AuthorizationRepository;

/// Input payload for creating custom roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCustomRoleInput {
    /// Unique role name in organization scope.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Raw permission values, validated against the registry.
    pub permissions: Vec<String>,
}

/// Input payload for updating custom roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateCustomRoleInput {
    /// Replacement name.
    pub name: String,
    /// Replacement description.
    pub description: Option<String>,
    /// Replacement permission values.
    pub permissions: Vec<String>,
    /// Version the caller last read.
    pub expected_version: i64,
}

/// Repository port for custom role administration.
///
/// Role names are unique per organization; clashes surface as
/// `AppError::Conflict`.
#[async_trait]
pub trait CustomRoleRepository: AuthorizationRepository {
    /// Lists organization roles ordered by name.
    async fn list_custom_roles(
        &self,
        organization_id: OrganizationId,
    ) -> AppResult<Vec<CustomRole>>;

    /// Persists a new role.
    async fn create_custom_role(
        &self,
        organization_id: OrganizationId,
        custom_role: CustomRole,
    ) -> AppResult<()>;

    /// Replaces a role when the version still matches.
    ///
    /// `custom_role` carries the new contents at `expected_version + 1`.
    async fn update_custom_role(
        &self,
        organization_id: OrganizationId,
        custom_role: CustomRole,
        expected_version: i64,
    ) -> AppResult<CustomRole>;

    /// Removes a role and clears it from every user assigned to it.
    async fn delete_custom_role(
        &self,
        organization_id: OrganizationId,
        custom_role_id: CustomRoleId,
    ) -> AppResult<()>;
}
