use atrium_domain::{CustomRoleId, CustomRoleName};

use crate::AuthorizationRepository;
use crate::security_admin_ports::{CreateCustomRoleInput, UpdateCustomRoleInput};

use super::*;

impl SecurityAdminService {
    /// Lists organization custom roles.
    pub async fn list_custom_roles(&self, actor: &Principal) -> AppResult<Vec<CustomRole>> {
        self.guard.authorize(actor, permissions::ROLES_VIEW).await?;

        self.repository
            .list_custom_roles(actor.organization_id())
            .await
    }

    /// Returns one custom role.
    pub async fn get_custom_role(
        &self,
        actor: &Principal,
        custom_role_id: CustomRoleId,
    ) -> AppResult<CustomRole> {
        self.guard.authorize(actor, permissions::ROLES_VIEW).await?;

        self.load_custom_role(actor, custom_role_id).await
    }

    /// Creates a custom role and emits an audit event.
    pub async fn create_custom_role(
        &self,
        actor: &Principal,
        input: CreateCustomRoleInput,
    ) -> AppResult<CustomRole> {
        self.guard
            .authorize(actor, permissions::ROLES_MANAGE)
            .await?;

        let name = CustomRoleName::new(input.name)?;
        let permissions = self.validate_permissions(actor, &input.permissions)?;
        let custom_role = CustomRole::new(
            CustomRoleId::new(),
            actor.organization_id(),
            name,
            input.description,
            permissions,
            1,
        )?;

        self.repository
            .create_custom_role(actor.organization_id(), custom_role.clone())
            .await?;

        self.append_role_event(
            actor,
            AuditAction::SecurityRoleCreated,
            &custom_role,
            format!("created custom role '{}'", custom_role.name().as_str()),
        )
        .await?;

        Ok(custom_role)
    }

    /// Replaces a custom role when the caller's version is current.
    pub async fn update_custom_role(
        &self,
        actor: &Principal,
        custom_role_id: CustomRoleId,
        input: UpdateCustomRoleInput,
    ) -> AppResult<CustomRole> {
        self.guard
            .authorize(actor, permissions::ROLES_MANAGE)
            .await?;

        let current = self.load_custom_role(actor, custom_role_id).await?;
        self.guard
            .ensure_version("custom role", current.version(), input.expected_version)?;

        if current.grants_everything() && actor.role() != SystemRole::Superadmin {
            return Err(AppError::Forbidden(
                "only superadmins may modify wildcard custom roles".to_owned(),
            ));
        }

        let name = CustomRoleName::new(input.name)?;
        let permissions = self.validate_permissions(actor, &input.permissions)?;
        let replacement = CustomRole::new(
            custom_role_id,
            actor.organization_id(),
            name,
            input.description,
            permissions,
            current.version() + 1,
        )?;

        let updated = self
            .repository
            .update_custom_role(
                actor.organization_id(),
                replacement,
                input.expected_version,
            )
            .await?;

        self.append_role_event(
            actor,
            AuditAction::SecurityRoleUpdated,
            &updated,
            format!(
                "updated custom role '{}' with {} permission(s)",
                updated.name().as_str(),
                updated.permissions().len()
            ),
        )
        .await?;

        Ok(updated)
    }

    /// Deletes a custom role.
    ///
    /// Users holding the role fall back to their system role defaults.
    pub async fn delete_custom_role(
        &self,
        actor: &Principal,
        custom_role_id: CustomRoleId,
    ) -> AppResult<()> {
        self.guard
            .authorize(actor, permissions::ROLES_MANAGE)
            .await?;

        let current = self.load_custom_role(actor, custom_role_id).await?;
        if current.grants_everything() && actor.role() != SystemRole::Superadmin {
            return Err(AppError::Forbidden(
                "only superadmins may delete wildcard custom roles".to_owned(),
            ));
        }

        self.repository
            .delete_custom_role(actor.organization_id(), custom_role_id)
            .await?;

        self.append_role_event(
            actor,
            AuditAction::SecurityRoleDeleted,
            &current,
            format!("deleted custom role '{}'", current.name().as_str()),
        )
        .await
    }

    async fn load_custom_role(
        &self,
        actor: &Principal,
        custom_role_id: CustomRoleId,
    ) -> AppResult<CustomRole> {
        let custom_role = self
            .repository
            .find_custom_role(actor.organization_id(), custom_role_id)
            .await?;

        self.guard
            .require_found("custom role", custom_role_id, custom_role)
    }
}
