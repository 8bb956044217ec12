use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use atrium_core::{AppError, AppResult, OrganizationId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Permission;

/// Maximum length of a custom role name.
pub const CUSTOM_ROLE_NAME_MAX_LENGTH: usize = 50;
/// Maximum length of a custom role description.
pub const CUSTOM_ROLE_DESCRIPTION_MAX_LENGTH: usize = 200;

/// Built-in role hierarchy, ordered from least to most privileged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemRole {
    /// Regular organization member.
    Member,
    /// Organization administrator.
    Admin,
    /// Unrestricted operator.
    Superadmin,
}

impl SystemRole {
    /// Returns the hierarchy rank; higher ranks are more privileged.
    #[must_use]
    pub fn rank(self) -> u8 {
        match self {
            Self::Member => 1,
            Self::Admin => 2,
            Self::Superadmin => 3,
        }
    }

    /// Returns a stable storage value for this role.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Admin => "admin",
            Self::Superadmin => "superadmin",
        }
    }

    /// Returns all roles in ascending rank.
    #[must_use]
    pub fn all() -> &'static [Self] {
        &[Self::Member, Self::Admin, Self::Superadmin]
    }

    /// Returns whether this role ranks at least as high as `minimum`.
    #[must_use]
    pub fn at_least(self, minimum: Self) -> bool {
        self.rank() >= minimum.rank()
    }
}

/// Compares two system roles by hierarchy rank.
#[must_use]
pub fn compare_roles(left: SystemRole, right: SystemRole) -> Ordering {
    left.rank().cmp(&right.rank())
}

impl Display for SystemRole {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for SystemRole {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "member" => Ok(Self::Member),
            "admin" => Ok(Self::Admin),
            "superadmin" => Ok(Self::Superadmin),
            _ => Err(AppError::Validation(format!("unknown role value '{value}'"))),
        }
    }
}

/// Stable identifier of a custom role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomRoleId(Uuid);

impl CustomRoleId {
    /// Creates a random custom role identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for CustomRoleId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for CustomRoleId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Validated custom role name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomRoleName(String);

impl CustomRoleName {
    /// Creates a validated name from letters, digits, spaces, `_` and `-`.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();

        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "role name must not be empty".to_owned(),
            ));
        }

        if trimmed.chars().count() > CUSTOM_ROLE_NAME_MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "role name must be at most {CUSTOM_ROLE_NAME_MAX_LENGTH} characters"
            )));
        }

        if !trimmed.chars().all(|character| {
            character.is_ascii_alphanumeric()
                || character == ' '
                || character == '_'
                || character == '-'
        }) {
            return Err(AppError::Validation(
                "role name may only contain letters, digits, spaces, '_' and '-'".to_owned(),
            ));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the underlying name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Organization-defined named permission set.
///
/// When assigned to a principal it replaces, rather than extends, the
/// defaults of the principal's system role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomRole {
    id: CustomRoleId,
    organization_id: OrganizationId,
    name: CustomRoleName,
    description: Option<String>,
    permissions: Vec<Permission>,
    version: i64,
}

impl CustomRole {
    /// Creates a validated custom role.
    ///
    /// Permissions must already be checked against the registry; this
    /// constructor only enforces shape invariants.
    pub fn new(
        id: CustomRoleId,
        organization_id: OrganizationId,
        name: CustomRoleName,
        description: Option<String>,
        permissions: Vec<Permission>,
        version: i64,
    ) -> AppResult<Self> {
        let description = normalize_description(description)?;

        if permissions.is_empty() {
            return Err(AppError::Validation(
                "custom role must grant at least one permission".to_owned(),
            ));
        }

        if permissions.iter().any(Permission::is_wildcard) && permissions.len() > 1 {
            return Err(AppError::Validation(
                "wildcard permission cannot be combined with other permissions".to_owned(),
            ));
        }

        if version < 1 {
            return Err(AppError::Validation(
                "custom role version must be positive".to_owned(),
            ));
        }

        Ok(Self {
            id,
            organization_id,
            name,
            description,
            permissions,
            version,
        })
    }

    /// Returns the role identifier.
    #[must_use]
    pub fn id(&self) -> CustomRoleId {
        self.id
    }

    /// Returns the owning organization.
    #[must_use]
    pub fn organization_id(&self) -> OrganizationId {
        self.organization_id
    }

    /// Returns the role name.
    #[must_use]
    pub fn name(&self) -> &CustomRoleName {
        &self.name
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the granted permissions.
    #[must_use]
    pub fn permissions(&self) -> &[Permission] {
        &self.permissions
    }

    /// Returns whether the role grants the global wildcard.
    #[must_use]
    pub fn grants_everything(&self) -> bool {
        self.permissions.iter().any(Permission::is_wildcard)
    }

    /// Returns the optimistic concurrency version.
    #[must_use]
    pub fn version(&self) -> i64 {
        self.version
    }
}

fn normalize_description(description: Option<String>) -> AppResult<Option<String>> {
    let Some(description) = description else {
        return Ok(None);
    };

    let trimmed = description.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    if trimmed.chars().count() > CUSTOM_ROLE_DESCRIPTION_MAX_LENGTH {
        return Err(AppError::Validation(format!(
            "role description must be at most {CUSTOM_ROLE_DESCRIPTION_MAX_LENGTH} characters"
        )));
    }

    Ok(Some(trimmed.to_owned()))
}
