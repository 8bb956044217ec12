//! User directory ports and application service.
//!
//! The directory maps authenticated identities to organization members and
//! owns their role assignments. Principals are always rebuilt from the
//! directory, never from session data, so role changes apply on the next
//! request.

use std::sync::Arc;

use async_trait::async_trait;

use atrium_core::{AppError, AppResult, OrganizationId, UserIdentity};
use atrium_domain::{CustomRoleId, Principal, SystemRole, UserAccount, UserId};

use crate::{AuditRepository, AuthorizationRepository, LifecycleGuard};

mod assignment;
mod directory;


/// Repository port for organization-scoped user directory storage.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Finds a user by identity provider subject.
    async fn find_user_by_subject(
        &self,
        organization_id: OrganizationId,
        subject: &str,
    ) -> AppResult<Option<UserAccount>>;

    /// Finds a user by identifier.
    async fn find_user(
        &self,
        organization_id: OrganizationId,
        user_id: UserId,
    ) -> AppResult<Option<UserAccount>>;

    /// Lists organization members ordered by display name.
    async fn list_users(&self, organization_id: OrganizationId) -> AppResult<Vec<UserAccount>>;

    /// Returns the member for an identity, creating it on first sight.
    ///
    /// The first member of an organization becomes `superadmin`; later
    /// members start as `member`. Existing records are returned unchanged.
    async fn ensure_user(&self, identity: &UserIdentity) -> AppResult<UserAccount>;

    /// Replaces the role assignment when the version still matches.
    async fn assign_role(
        &self,
        organization_id: OrganizationId,
        user_id: UserId,
        role: SystemRole,
        custom_role_id: Option<CustomRoleId>,
        expected_version: i64,
    ) -> AppResult<UserAccount>;
}

/// Input payload for role assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignRoleInput {
    /// New system role.
    pub role: SystemRole,
    /// Optional custom role replacing the system role defaults.
    pub custom_role_id: Option<CustomRoleId>,
    /// Version the caller last read.
    pub expected_version: i64,
}

/// Application service for the user directory.
#[derive(Clone)]
pub struct UserService {
    guard: LifecycleGuard,
    repository: Arc<dyn UserRepository>,
    custom_roles: Arc<dyn AuthorizationRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl UserService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        guard: LifecycleGuard,
        repository: Arc<dyn UserRepository>,
        custom_roles: Arc<dyn AuthorizationRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            guard,
            repository,
            custom_roles,
            audit_repository,
        }
    }

    /// Resolves the principal for an authenticated identity.
    pub async fn resolve_principal(&self, identity: &UserIdentity) -> AppResult<Principal> {
        self.repository
            .find_user_by_subject(identity.organization_id(), identity.subject())
            .await?
            .map(|user| user.principal())
            .ok_or_else(|| {
                AppError::Unauthorized(format!(
                    "subject '{}' is not a member of organization '{}'",
                    identity.subject(),
                    identity.organization_id()
                ))
            })
    }
}
