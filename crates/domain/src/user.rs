//! User directory types.

use atrium_core::{AppError, AppResult, NonEmptyString, OrganizationId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{CustomRoleId, Principal, SystemRole};

/// Unique identifier for a user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a new random user identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a user identifier from an existing UUID value.
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

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Validated, lowercased email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a validated email address.
    ///
    /// Performs basic structural validation: exactly one `@`, non-empty
    /// local part, and a domain containing at least one `.`.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim().to_lowercase();

        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "email address must not be empty".to_owned(),
            ));
        }

        let Some((local, domain)) = trimmed.split_once('@') else {
            return Err(AppError::Validation(
                "email address must contain exactly one '@'".to_owned(),
            ));
        };

        if domain.contains('@') {
            return Err(AppError::Validation(
                "email address must contain exactly one '@'".to_owned(),
            ));
        }

        if local.is_empty() {
            return Err(AppError::Validation(
                "email local part must not be empty".to_owned(),
            ));
        }

        if domain.is_empty() || !domain.contains('.') {
            return Err(AppError::Validation(
                "email domain must contain at least one '.'".to_owned(),
            ));
        }

        if trimmed.len() > 254 {
            return Err(AppError::Validation(
                "email address must not exceed 254 characters".to_owned(),
            ));
        }

        Ok(Self(trimmed))
    }

    /// Returns the validated email string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

/// Directory entry for one organization member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    id: UserId,
    organization_id: OrganizationId,
    subject: NonEmptyString,
    email: Option<EmailAddress>,
    display_name: String,
    role: SystemRole,
    custom_role_id: Option<CustomRoleId>,
    version: i64,
    created_at: DateTime<Utc>,
}

impl UserAccount {
    /// Rebuilds a user record.
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: UserId,
        organization_id: OrganizationId,
        subject: impl Into<String>,
        email: Option<EmailAddress>,
        display_name: impl Into<String>,
        role: SystemRole,
        custom_role_id: Option<CustomRoleId>,
        version: i64,
        created_at: DateTime<Utc>,
    ) -> AppResult<Self> {
        if version < 1 {
            return Err(AppError::Validation(
                "user version must be positive".to_owned(),
            ));
        }

        let subject = NonEmptyString::new(subject)?;
        let display_name = display_name.into();
        let display_name = if display_name.trim().is_empty() {
            subject.as_str().to_owned()
        } else {
            display_name.trim().to_owned()
        };

        Ok(Self {
            id,
            organization_id,
            subject,
            email,
            display_name,
            role,
            custom_role_id,
            version,
            created_at,
        })
    }

    /// Returns the user identifier.
    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Returns the organization the user belongs to.
    #[must_use]
    pub fn organization_id(&self) -> OrganizationId {
        self.organization_id
    }

    /// Returns the identity provider subject.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }

    /// Returns the email, if known.
    #[must_use]
    pub fn email(&self) -> Option<&EmailAddress> {
        self.email.as_ref()
    }

    /// Returns the display name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the system role.
    #[must_use]
    pub fn role(&self) -> SystemRole {
        self.role
    }

    /// Returns the assigned custom role, if any.
    #[must_use]
    pub fn custom_role_id(&self) -> Option<CustomRoleId> {
        self.custom_role_id
    }

    /// Returns the optimistic concurrency version.
    #[must_use]
    pub fn version(&self) -> i64 {
        self.version
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the principal this user acts as.
    #[must_use]
    pub fn principal(&self) -> Principal {
        Principal::new(
            self.subject.as_str(),
            self.organization_id,
            self.role,
            self.custom_role_id,
        )
    }

    /// Replaces the role assignment and bumps the version once.
    pub fn assign_role(&mut self, role: SystemRole, custom_role_id: Option<CustomRoleId>) {
        self.role = role;
        self.custom_role_id = custom_role_id;
        self.version += 1;
    }
}
