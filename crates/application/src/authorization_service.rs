use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use atrium_core::{AppError, AppResult, OrganizationId};
use atrium_domain::{
    CustomRole, CustomRoleId, PermissionRegistry, PermissionSet, Principal, SystemRole,
    compare_roles,
};
use tracing::warn;

mod permissions;
mod roles;

#[cfg(test)]
mod tests;

/// Repository port for custom role lookups during permission resolution.
#[async_trait]
pub trait AuthorizationRepository: Send + Sync {
    /// Finds a custom role in the organization scope.
    async fn find_custom_role(
        &self,
        organization_id: OrganizationId,
        custom_role_id: CustomRoleId,
    ) -> AppResult<Option<CustomRole>>;
}

/// Application service answering permission and role questions.
///
/// Boolean queries never fail: a missing principal yields an empty
/// permission set, and a dangling or unreachable custom role falls back to
/// the principal's system role defaults.
#[derive(Clone)]
pub struct AuthorizationService {
    registry: Arc<PermissionRegistry>,
    repository: Arc<dyn AuthorizationRepository>,
}

impl AuthorizationService {
    /// Creates a new authorization service from its registry and repository.
    #[must_use]
    pub fn new(
        registry: Arc<PermissionRegistry>,
        repository: Arc<dyn AuthorizationRepository>,
    ) -> Self {
        Self {
            registry,
            repository,
        }
    }

    /// Returns the permission registry the service resolves against.
    #[must_use]
    pub fn registry(&self) -> &PermissionRegistry {
        &self.registry
    }

    /// Computes the effective permission set of a principal.
    pub async fn resolve_permissions(&self, principal: Option<&Principal>) -> PermissionSet {
        let Some(principal) = principal else {
            return PermissionSet::empty();
        };

        if principal.role() == SystemRole::Superadmin {
            return PermissionSet::wildcard();
        }

        let defaults = self.registry.role_defaults(principal.role());
        let Some(custom_role_id) = principal.custom_role_id() else {
            return defaults.clone();
        };

        match self
            .repository
            .find_custom_role(principal.organization_id(), custom_role_id)
            .await
        {
            Ok(Some(custom_role)) => custom_role.permissions().iter().collect(),
            Ok(None) => {
                warn!(
                    organization_id = %principal.organization_id(),
                    subject = principal.subject(),
                    custom_role_id = %custom_role_id,
                    "assigned custom role no longer exists, using system role defaults"
                );
                defaults.clone()
            }
            Err(error) => {
                warn!(
                    error = %error,
                    organization_id = %principal.organization_id(),
                    subject = principal.subject(),
                    custom_role_id = %custom_role_id,
                    "custom role lookup failed, using system role defaults"
                );
                defaults.clone()
            }
        }
    }

    /// Compares two system roles by hierarchy rank.
    #[must_use]
    pub fn compare_roles(left: SystemRole, right: SystemRole) -> Ordering {
        compare_roles(left, right)
    }

    /// Ensures a principal holds a permission.
    pub async fn require_permission(&self, principal: &Principal, required: &str) -> AppResult<()> {
        if self.has_permission(Some(principal), required).await {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "subject '{}' is missing permission '{required}' in organization '{}'",
            principal.subject(),
            principal.organization_id()
        )))
    }

    /// Ensures a principal's system role ranks at least `min_role`.
    pub fn require_min_role(&self, principal: &Principal, min_role: SystemRole) -> AppResult<()> {
        if self.has_min_role(Some(principal), min_role) {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "subject '{}' requires at least role '{min_role}'",
            principal.subject()
        )))
    }
}
