use atrium_domain::{AuditAction, permissions};

use crate::AuditEvent;

use super::*;

impl UserService {
    /// Changes a member's system role and custom role.
    ///
    /// Requires `users.edit` and at least `admin`. Only superadmins may
    /// grant or revoke `superadmin` or hand out a wildcard custom role.
    /// Nobody may change their own role.
    pub async fn assign_role(
        &self,
        actor: &Principal,
        user_id: UserId,
        input: AssignRoleInput,
    ) -> AppResult<UserAccount> {
        self.guard
            .authorize(actor, permissions::USERS_EDIT)
            .await?;
        self.guard
            .authorization_service()
            .require_min_role(actor, SystemRole::Admin)?;

        let current = self.load_user(actor, user_id).await?;
        if current.subject() == actor.subject() {
            return Err(AppError::Forbidden(
                "users cannot change their own role".to_owned(),
            ));
        }

        let touches_superadmin =
            input.role == SystemRole::Superadmin || current.role() == SystemRole::Superadmin;
        if touches_superadmin && actor.role() != SystemRole::Superadmin {
            return Err(AppError::Forbidden(
                "only superadmins may grant or revoke the superadmin role".to_owned(),
            ));
        }

        if let Some(custom_role_id) = input.custom_role_id {
            let custom_role = self
                .custom_roles
                .find_custom_role(actor.organization_id(), custom_role_id)
                .await?
                .ok_or_else(|| {
                    AppError::ReferenceNotFound(format!(
                        "custom role '{custom_role_id}' was not found"
                    ))
                })?;

            if custom_role.grants_everything() && actor.role() != SystemRole::Superadmin {
                return Err(AppError::Forbidden(
                    "only superadmins may assign a wildcard custom role".to_owned(),
                ));
            }
        }

        self.guard
            .ensure_version("user", current.version(), input.expected_version)?;

        let updated = self
            .repository
            .assign_role(
                actor.organization_id(),
                user_id,
                input.role,
                input.custom_role_id,
                input.expected_version,
            )
            .await?;

        let custom_role = input
            .custom_role_id
            .map(|custom_role_id| format!(" with custom role '{custom_role_id}'"))
            .unwrap_or_default();
        self.audit_repository
            .append_event(AuditEvent {
                organization_id: actor.organization_id(),
                subject: actor.subject().to_owned(),
                action: AuditAction::SecurityRoleAssigned,
                resource_type: "user".to_owned(),
                resource_id: user_id.to_string(),
                detail: Some(format!(
                    "assigned role '{}'{custom_role} to subject '{}'",
                    input.role,
                    updated.subject()
                )),
            })
            .await?;

        Ok(updated)
    }
}
