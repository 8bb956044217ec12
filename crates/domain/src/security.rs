use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use atrium_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Reserved permission value granting every permission.
pub const WILDCARD_PERMISSION: &str = "*";

/// Stable permission identifiers known to the application.
pub mod permissions {
    /// Allows listing and reading projects.
    pub const PROJECTS_VIEW: &str = "projects.view";
    /// Allows creating projects.
    pub const PROJECTS_CREATE: &str = "projects.create";
    /// Allows editing projects and changing their status.
    pub const PROJECTS_EDIT: &str = "projects.edit";
    /// Allows deleting projects.
    pub const PROJECTS_DELETE: &str = "projects.delete";
    /// Allows listing and reading clients.
    pub const CLIENTS_VIEW: &str = "clients.view";
    /// Allows creating clients.
    pub const CLIENTS_CREATE: &str = "clients.create";
    /// Allows editing clients.
    pub const CLIENTS_EDIT: &str = "clients.edit";
    /// Allows removing clients.
    pub const CLIENTS_DELETE: &str = "clients.delete";
    /// Allows listing and reading companies.
    pub const COMPANIES_VIEW: &str = "companies.view";
    /// Allows creating companies.
    pub const COMPANIES_CREATE: &str = "companies.create";
    /// Allows editing companies.
    pub const COMPANIES_EDIT: &str = "companies.edit";
    /// Allows deleting companies.
    pub const COMPANIES_DELETE: &str = "companies.delete";
    /// Allows listing and reading users.
    pub const USERS_VIEW: &str = "users.view";
    /// Allows editing users and their role assignment.
    pub const USERS_EDIT: &str = "users.edit";
    /// Allows reading custom role definitions.
    pub const ROLES_VIEW: &str = "roles.view";
    /// Allows creating, updating and deleting custom roles.
    pub const ROLES_MANAGE: &str = "roles.manage";

    /// Every registered concrete permission.
    pub const ALL: &[&str] = &[
        PROJECTS_VIEW,
        PROJECTS_CREATE,
        PROJECTS_EDIT,
        PROJECTS_DELETE,
        CLIENTS_VIEW,
        CLIENTS_CREATE,
        CLIENTS_EDIT,
        CLIENTS_DELETE,
        COMPANIES_VIEW,
        COMPANIES_CREATE,
        COMPANIES_EDIT,
        COMPANIES_DELETE,
        USERS_VIEW,
        USERS_EDIT,
        ROLES_VIEW,
        ROLES_MANAGE,
    ];
}

/// Validated permission identifier.
///
/// Accepted shapes are `*`, `resource.action` and `resource.*`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Permission(String);

impl Permission {
    /// Creates a validated permission identifier.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();

        if trimmed == WILDCARD_PERMISSION {
            return Ok(Self::wildcard());
        }

        let Some((resource, action)) = trimmed.split_once('.') else {
            return Err(AppError::Validation(format!(
                "permission '{trimmed}' must have the form 'resource.action'"
            )));
        };

        if !is_valid_segment(resource) {
            return Err(AppError::Validation(format!(
                "permission '{trimmed}' has an invalid resource segment"
            )));
        }

        if action != "*" && !is_valid_segment(action) {
            return Err(AppError::Validation(format!(
                "permission '{trimmed}' has an invalid action segment"
            )));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the `*` permission.
    #[must_use]
    pub fn wildcard() -> Self {
        Self(WILDCARD_PERMISSION.to_owned())
    }

    /// Returns the underlying identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns whether this is the `*` permission.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.0 == WILDCARD_PERMISSION
    }

    /// Returns whether this is a `resource.*` pattern.
    #[must_use]
    pub fn is_resource_wildcard(&self) -> bool {
        self.0.ends_with(".*")
    }

    /// Returns the resource segment, or `None` for `*`.
    #[must_use]
    pub fn resource(&self) -> Option<&str> {
        self.0.split_once('.').map(|(resource, _)| resource)
    }

    /// Returns whether holding this permission satisfies `required`.
    #[must_use]
    pub fn grants(&self, required: &str) -> bool {
        matches_permission(self.as_str(), required)
    }
}

impl Display for Permission {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl FromStr for Permission {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::new(value)
    }
}

impl TryFrom<String> for Permission {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Permission> for String {
    fn from(value: Permission) -> Self {
        value.0
    }
}

fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment.chars().all(|character| {
            character.is_ascii_lowercase()
                || character.is_ascii_digit()
                || character == '_'
                || character == '-'
        })
}

/// Returns whether a held permission satisfies a required permission.
///
/// `users.*` covers `users.view` but neither `users` nor `users.sub.view`.
/// Any required string of the form `users.<x>` where `<x>` has no further
/// `.` is covered, including an empty `<x>`.
#[must_use]
pub fn matches_permission(held: &str, required: &str) -> bool {
    if held == WILDCARD_PERMISSION || held == required {
        return true;
    }

    let Some(prefix) = held.strip_suffix(".*") else {
        return false;
    };

    required
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('.'))
        .map(|action| !action.contains('.'))
        .unwrap_or(false)
}

/// Effective permission set resolved for one principal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSet(BTreeSet<Permission>);

impl PermissionSet {
    /// Creates an empty set.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates the set that only holds `*`.
    #[must_use]
    pub fn wildcard() -> Self {
        Self(BTreeSet::from([Permission::wildcard()]))
    }

    /// Returns whether any held permission satisfies `required`.
    #[must_use]
    pub fn allows(&self, required: &str) -> bool {
        self.0.iter().any(|held| held.grants(required))
    }

    /// Returns whether the set holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of held permissions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether the exact permission is held.
    #[must_use]
    pub fn contains(&self, permission: &Permission) -> bool {
        self.0.contains(permission)
    }

    /// Iterates held permissions in lexical order.
    pub fn iter(&self) -> impl Iterator<Item = &Permission> {
        self.0.iter()
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<T: IntoIterator<Item = Permission>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> FromIterator<&'a Permission> for PermissionSet {
    fn from_iter<T: IntoIterator<Item = &'a Permission>>(iter: T) -> Self {
        Self(iter.into_iter().cloned().collect())
    }
}

/// Stable audit actions emitted by application use-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Emitted when a custom role is created.
    SecurityRoleCreated,
    /// Emitted when a custom role is updated.
    SecurityRoleUpdated,
    /// Emitted when a custom role is deleted.
    SecurityRoleDeleted,
    /// Emitted when a role is assigned to a user.
    SecurityRoleAssigned,
    /// Emitted when a project is created.
    ProjectCreated,
    /// Emitted when a project status changes.
    ProjectStatusChanged,
    /// Emitted when a project is deleted.
    ProjectDeleted,
    /// Emitted when a client is removed.
    ClientDeleted,
    /// Emitted when a company is deleted.
    CompanyDeleted,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SecurityRoleCreated => "security.role.created",
            Self::SecurityRoleUpdated => "security.role.updated",
            Self::SecurityRoleDeleted => "security.role.deleted",
            Self::SecurityRoleAssigned => "security.role.assigned",
            Self::ProjectCreated => "project.created",
            Self::ProjectStatusChanged => "project.status_changed",
            Self::ProjectDeleted => "project.deleted",
            Self::ClientDeleted => "client.deleted",
            Self::CompanyDeleted => "company.deleted",
        }
    }
}
