use std::sync::Arc;

use atrium_core::{AppError, AppResult};
use atrium_domain::{AuditAction, CustomRole, Permission, Principal, SystemRole, permissions};

use crate::security_admin_ports::CustomRoleRepository;
use crate::{AuditEvent, AuditRepository, LifecycleGuard};

mod roles;

#[cfg(test)]
mod tests;

/// Application service for custom role administration.
#[derive(Clone)]
pub struct SecurityAdminService {
    guard: LifecycleGuard,
    repository: Arc<dyn CustomRoleRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl SecurityAdminService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        guard: LifecycleGuard,
        repository: Arc<dyn CustomRoleRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            guard,
            repository,
            audit_repository,
        }
    }

    /// Lists every registered permission.
    pub async fn list_permissions(&self, actor: &Principal) -> AppResult<Vec<Permission>> {
        self.guard.authorize(actor, permissions::ROLES_VIEW).await?;

        Ok(self
            .guard
            .authorization_service()
            .registry()
            .permissions()
            .cloned()
            .collect())
    }

    fn validate_permissions(
        &self,
        actor: &Principal,
        values: &[String],
    ) -> AppResult<Vec<Permission>> {
        let permissions = self
            .guard
            .authorization_service()
            .registry()
            .validate_custom_role_permissions(values)?;

        if permissions.iter().any(Permission::is_wildcard)
            && actor.role() != SystemRole::Superadmin
        {
            return Err(AppError::Forbidden(
                "only superadmins may define wildcard custom roles".to_owned(),
            ));
        }

        Ok(permissions)
    }

    async fn append_role_event(
        &self,
        actor: &Principal,
        action: AuditAction,
        custom_role: &CustomRole,
        detail: String,
    ) -> AppResult<()> {
        self.audit_repository
            .append_event(AuditEvent {
                organization_id: actor.organization_id(),
                subject: actor.subject().to_owned(),
                action,
                resource_type: "custom_role".to_owned(),
                resource_id: custom_role.id().to_string(),
                detail: Some(detail),
            })
            .await
    }
}
