use std::collections::HashMap;

use async_trait::async_trait;
use atrium_application::{AuthorizationRepository, CustomRoleRepository, UserRepository};
use atrium_core::{AppError, AppResult, OrganizationId, UserIdentity};
use atrium_domain::{CustomRole, CustomRoleId, EmailAddress, SystemRole, UserAccount, UserId};
use chrono::Utc;
use tokio::sync::RwLock;


/// In-memory user directory and custom role storage.
#[derive(Debug, Default)]
pub struct InMemoryDirectoryRepository {
    users: RwLock<HashMap<(OrganizationId, UserId), UserAccount>>,
    custom_roles: RwLock<HashMap<(OrganizationId, CustomRoleId), CustomRole>>,
}

impl InMemoryDirectoryRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryDirectoryRepository {
    async fn find_user_by_subject(
        &self,
        organization_id: OrganizationId,
        subject: &str,
    ) -> AppResult<Option<UserAccount>> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find_map(|((stored_organization_id, _), user)| {
                (stored_organization_id == &organization_id && user.subject() == subject)
                    .then_some(user.clone())
            }))
    }

    async fn find_user(
        &self,
        organization_id: OrganizationId,
        user_id: UserId,
    ) -> AppResult<Option<UserAccount>> {
        Ok(self
            .users
            .read()
            .await
            .get(&(organization_id, user_id))
            .cloned())
    }

    async fn list_users(&self, organization_id: OrganizationId) -> AppResult<Vec<UserAccount>> {
        let users = self.users.read().await;

        let mut values: Vec<UserAccount> = users
            .iter()
            .filter_map(|((stored_organization_id, _), user)| {
                (stored_organization_id == &organization_id).then_some(user.clone())
            })
            .collect();
        values.sort_by(|left, right| {
            left.display_name()
                .cmp(right.display_name())
                .then_with(|| left.subject().cmp(right.subject()))
        });

        Ok(values)
    }

    async fn ensure_user(&self, identity: &UserIdentity) -> AppResult<UserAccount> {
        let organization_id = identity.organization_id();
        let mut users = self.users.write().await;

        if let Some(existing) = users.iter().find_map(|((stored_organization_id, _), user)| {
            (stored_organization_id == &organization_id && user.subject() == identity.subject())
                .then_some(user)
        }) {
            return Ok(existing.clone());
        }

        let has_members = users
            .keys()
            .any(|(stored_organization_id, _)| stored_organization_id == &organization_id);
        let role = if has_members {
            SystemRole::Member
        } else {
            SystemRole::Superadmin
        };

        let email = identity.email().map(EmailAddress::new).transpose()?;
        let user = UserAccount::restore(
            UserId::new(),
            organization_id,
            identity.subject(),
            email,
            identity.display_name(),
            role,
            None,
            1,
            Utc::now(),
        )?;

        users.insert((organization_id, user.id()), user.clone());
        Ok(user)
    }

    async fn assign_role(
        &self,
        organization_id: OrganizationId,
        user_id: UserId,
        role: SystemRole,
        custom_role_id: Option<CustomRoleId>,
        expected_version: i64,
    ) -> AppResult<UserAccount> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(&(organization_id, user_id))
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' was not found")))?;

        if user.version() != expected_version {
            return Err(AppError::VersionConflict(format!(
                "user '{user_id}' was modified concurrently (expected version {expected_version}, current version {})",
                user.version()
            )));
        }

        user.assign_role(role, custom_role_id);
        Ok(user.clone())
    }
}

#[async_trait]
impl AuthorizationRepository for InMemoryDirectoryRepository {
    async fn find_custom_role(
        &self,
        organization_id: OrganizationId,
        custom_role_id: CustomRoleId,
    ) -> AppResult<Option<CustomRole>> {
        Ok(self
            .custom_roles
            .read()
            .await
            .get(&(organization_id, custom_role_id))
            .cloned())
    }
}

#[async_trait]
impl CustomRoleRepository for InMemoryDirectoryRepository {
    async fn list_custom_roles(
        &self,
        organization_id: OrganizationId,
    ) -> AppResult<Vec<CustomRole>> {
        let custom_roles = self.custom_roles.read().await;

        let mut values: Vec<CustomRole> = custom_roles
            .iter()
            .filter_map(|((stored_organization_id, _), custom_role)| {
                (stored_organization_id == &organization_id).then_some(custom_role.clone())
            })
            .collect();
        values.sort_by(|left, right| left.name().as_str().cmp(right.name().as_str()));

        Ok(values)
    }

    async fn create_custom_role(
        &self,
        organization_id: OrganizationId,
        custom_role: CustomRole,
    ) -> AppResult<()> {
        let mut custom_roles = self.custom_roles.write().await;

        if name_taken(&custom_roles, organization_id, &custom_role) {
            return Err(AppError::Conflict(format!(
                "custom role '{}' already exists",
                custom_role.name().as_str()
            )));
        }

        custom_roles.insert((organization_id, custom_role.id()), custom_role);
        Ok(())
    }

    async fn update_custom_role(
        &self,
        organization_id: OrganizationId,
        custom_role: CustomRole,
        expected_version: i64,
    ) -> AppResult<CustomRole> {
        let mut custom_roles = self.custom_roles.write().await;
        let key = (organization_id, custom_role.id());

        let Some(current) = custom_roles.get(&key) else {
            return Err(AppError::NotFound(format!(
                "custom role '{}' was not found",
                custom_role.id()
            )));
        };

        if current.version() != expected_version {
            return Err(AppError::VersionConflict(format!(
                "custom role '{}' was modified concurrently (expected version {expected_version}, current version {})",
                custom_role.id(),
                current.version()
            )));
        }

        if name_taken(&custom_roles, organization_id, &custom_role) {
            return Err(AppError::Conflict(format!(
                "custom role '{}' already exists",
                custom_role.name().as_str()
            )));
        }

        custom_roles.insert(key, custom_role.clone());
        Ok(custom_role)
    }

    async fn delete_custom_role(
        &self,
        organization_id: OrganizationId,
        custom_role_id: CustomRoleId,
    ) -> AppResult<()> {
        let mut custom_roles = self.custom_roles.write().await;
        let mut users = self.users.write().await;

        if custom_roles
            .remove(&(organization_id, custom_role_id))
            .is_none()
        {
            return Err(AppError::NotFound(format!(
                "custom role '{custom_role_id}' was not found"
            )));
        }

        for ((stored_organization_id, _), user) in users.iter_mut() {
            if stored_organization_id == &organization_id
                && user.custom_role_id() == Some(custom_role_id)
            {
                let role = user.role();
                user.assign_role(role, None);
            }
        }

        Ok(())
    }
}

fn name_taken(
    custom_roles: &HashMap<(OrganizationId, CustomRoleId), CustomRole>,
    organization_id: OrganizationId,
    candidate: &CustomRole,
) -> bool {
    custom_roles
        .iter()
        .any(|((stored_organization_id, stored_id), stored)| {
            stored_organization_id == &organization_id
                && stored_id != &candidate.id()
                && stored
                    .name()
                    .as_str()
                    .eq_ignore_ascii_case(candidate.name().as_str())
        })
}
