use std::collections::BTreeSet;

use atrium_core::{AppError, AppResult};

use crate::security::permissions;
use crate::{Permission, PermissionSet, SystemRole};

/// Registered permissions and the default grants of each system role.
///
/// Built once at startup and shared read-only between the permission engine
/// and the services that validate custom roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionRegistry {
    permissions: BTreeSet<Permission>,
    member_defaults: PermissionSet,
    admin_defaults: PermissionSet,
    superadmin_defaults: PermissionSet,
}

impl PermissionRegistry {
    /// Creates a registry from registered permissions and role defaults.
    ///
    /// Superadmin always holds `*` alone. Defaults for the other roles must
    /// be non-empty and may only reference registered permissions or
    /// `resource.*` patterns over registered resources.
    pub fn new(
        permissions: impl IntoIterator<Item = Permission>,
        member_defaults: impl IntoIterator<Item = Permission>,
        admin_defaults: impl IntoIterator<Item = Permission>,
    ) -> AppResult<Self> {
        let permissions: BTreeSet<Permission> = permissions.into_iter().collect();

        if let Some(pattern) = permissions
            .iter()
            .find(|permission| permission.is_wildcard() || permission.is_resource_wildcard())
        {
            return Err(AppError::Validation(format!(
                "registered permission '{pattern}' must be concrete"
            )));
        }

        let member_defaults =
            validate_defaults(&permissions, SystemRole::Member, member_defaults)?;
        let admin_defaults = validate_defaults(&permissions, SystemRole::Admin, admin_defaults)?;

        Ok(Self {
            permissions,
            member_defaults,
            admin_defaults,
            superadmin_defaults: PermissionSet::wildcard(),
        })
    }

    /// Returns the application's standard registry.
    pub fn standard() -> AppResult<Self> {
        Self::new(
            permissions::ALL
                .iter()
                .map(|value| Permission::new(*value))
                .collect::<AppResult<Vec<_>>>()?,
            [
                Permission::new(permissions::PROJECTS_VIEW)?,
                Permission::new(permissions::CLIENTS_VIEW)?,
                Permission::new(permissions::COMPANIES_VIEW)?,
                Permission::new(permissions::USERS_VIEW)?,
            ],
            [
                Permission::new("projects.*")?,
                Permission::new("clients.*")?,
                Permission::new("companies.*")?,
                Permission::new("users.*")?,
                Permission::new(permissions::ROLES_VIEW)?,
            ],
        )
    }

    /// Returns all registered concrete permissions.
    pub fn permissions(&self) -> impl Iterator<Item = &Permission> {
        self.permissions.iter()
    }

    /// Returns whether a concrete permission is registered.
    #[must_use]
    pub fn is_registered(&self, permission: &Permission) -> bool {
        self.permissions.contains(permission)
    }

    /// Returns the default permission set of a system role.
    #[must_use]
    pub fn role_defaults(&self, role: SystemRole) -> &PermissionSet {
        match role {
            SystemRole::Member => &self.member_defaults,
            SystemRole::Admin => &self.admin_defaults,
            SystemRole::Superadmin => &self.superadmin_defaults,
        }
    }

    /// Validates a custom role permission list.
    ///
    /// Accepts either `*` alone or a deduplicated subset of registered
    /// permissions. Resource patterns are not accepted for custom roles.
    pub fn validate_custom_role_permissions(
        &self,
        values: &[String],
    ) -> AppResult<Vec<Permission>> {
        if values.is_empty() {
            return Err(AppError::Validation(
                "custom role must grant at least one permission".to_owned(),
            ));
        }

        let parsed = values
            .iter()
            .map(|value| Permission::new(value.as_str()))
            .collect::<AppResult<Vec<_>>>()?;

        if parsed.iter().any(Permission::is_wildcard) {
            if parsed.iter().all(Permission::is_wildcard) {
                return Ok(vec![Permission::wildcard()]);
            }

            return Err(AppError::Validation(
                "wildcard permission cannot be combined with other permissions".to_owned(),
            ));
        }

        let mut unique = BTreeSet::new();
        for permission in parsed {
            if !self.is_registered(&permission) {
                return Err(AppError::Validation(format!(
                    "unknown permission value '{permission}'"
                )));
            }
            unique.insert(permission);
        }

        Ok(unique.into_iter().collect())
    }
}

fn validate_defaults(
    registered: &BTreeSet<Permission>,
    role: SystemRole,
    defaults: impl IntoIterator<Item = Permission>,
) -> AppResult<PermissionSet> {
    let defaults: PermissionSet = defaults.into_iter().collect();

    if defaults.is_empty() {
        return Err(AppError::Validation(format!(
            "role '{role}' must have at least one default permission"
        )));
    }

    for permission in defaults.iter() {
        let known = if permission.is_wildcard() {
            true
        } else if permission.is_resource_wildcard() {
            registered
                .iter()
                .any(|candidate| candidate.resource() == permission.resource())
        } else {
            registered.contains(permission)
        };

        if !known {
            return Err(AppError::Validation(format!(
                "default permission '{permission}' of role '{role}' is not registered"
            )));
        }
    }

    Ok(defaults)
}

#[cfg(test)]
mod tests {
    use super::PermissionRegistry;
    use crate::{Permission, SystemRole};

    fn standard() -> PermissionRegistry {
        PermissionRegistry::standard().unwrap_or_else(|error| panic!("{error}"))
    }

    #[test]
    fn every_role_has_non_empty_defaults() {
        let registry = standard();
        for role in SystemRole::all() {
            assert!(!registry.role_defaults(*role).is_empty());
        }
    }

    #[test]
    fn superadmin_defaults_are_wildcard_only() {
        let registry = standard();
        let defaults = registry.role_defaults(SystemRole::Superadmin);
        assert_eq!(defaults.len(), 1);
        assert!(defaults.contains(&Permission::wildcard()));
    }

    #[test]
    fn admin_defaults_cover_resource_actions() {
        let registry = standard();
        let defaults = registry.role_defaults(SystemRole::Admin);
        assert!(defaults.allows("projects.delete"));
        assert!(defaults.allows("companies.delete"));
        assert!(defaults.allows("roles.view"));
        assert!(!defaults.allows("roles.manage"));
    }

    #[test]
    fn defaults_must_reference_registered_permissions() {
        let registry = PermissionRegistry::new(
            [Permission::new("projects.view").unwrap_or_else(|_| Permission::wildcard())],
            [Permission::new("invoices.view").unwrap_or_else(|_| Permission::wildcard())],
            [Permission::new("projects.*").unwrap_or_else(|_| Permission::wildcard())],
        );
        assert!(registry.is_err());
    }

    #[test]
    fn custom_role_permissions_are_deduplicated() {
        let registry = standard();
        let validated = registry.validate_custom_role_permissions(&[
            "projects.view".to_owned(),
            "projects.view".to_owned(),
            "clients.edit".to_owned(),
        ]);
        assert!(validated.is_ok_and(|permissions| permissions.len() == 2));
    }

    #[test]
    fn custom_role_permissions_reject_unknown_and_patterns() {
        let registry = standard();
        assert!(
            registry
                .validate_custom_role_permissions(&["invoices.view".to_owned()])
                .is_err()
        );
        assert!(
            registry
                .validate_custom_role_permissions(&["projects.*".to_owned()])
                .is_err()
        );
        assert!(registry.validate_custom_role_permissions(&[]).is_err());
    }

    #[test]
    fn custom_role_wildcard_must_stand_alone() {
        let registry = standard();
        assert!(
            registry
                .validate_custom_role_permissions(&["*".to_owned()])
                .is_ok_and(|permissions| permissions == vec![Permission::wildcard()])
        );
        assert!(
            registry
                .validate_custom_role_permissions(&["*".to_owned(), "projects.view".to_owned()])
                .is_err()
        );
    }
}
