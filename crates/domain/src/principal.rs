use atrium_core::OrganizationId;
use serde::{Deserialize, Serialize};

use crate::{CustomRoleId, SystemRole};

/// Authenticated actor subject to authorization checks.
///
/// The custom role is held by id only; the role itself is owned by the
/// organization's role registry and may disappear independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    subject: String,
    organization_id: OrganizationId,
    role: SystemRole,
    custom_role_id: Option<CustomRoleId>,
}

impl Principal {
    /// Creates a principal from resolved identity and role data.
    #[must_use]
    pub fn new(
        subject: impl Into<String>,
        organization_id: OrganizationId,
        role: SystemRole,
        custom_role_id: Option<CustomRoleId>,
    ) -> Self {
        Self {
            subject: subject.into(),
            organization_id,
            role,
            custom_role_id,
        }
    }

    /// Returns the stable subject claim.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }

    /// Returns the organization the principal acts in.
    #[must_use]
    pub fn organization_id(&self) -> OrganizationId {
        self.organization_id
    }

    /// Returns the underlying system role.
    #[must_use]
    pub fn role(&self) -> SystemRole {
        self.role
    }

    /// Returns the assigned custom role, if any.
    #[must_use]
    pub fn custom_role_id(&self) -> Option<CustomRoleId> {
        self.custom_role_id
    }
}
