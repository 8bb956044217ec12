use std::fmt::{Display, Formatter};

use atrium_core::{AppError, AppResult, NonEmptyString, OrganizationId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EmailAddress;

/// Maximum length of a client name.
pub const CLIENT_NAME_MAX_LENGTH: usize = 100;

/// Stable identifier of a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClientId(Uuid);

impl ClientId {
    /// Creates a random client identifier.
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

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for ClientId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Editable client attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientDetails {
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: Option<String>,
    /// Contact phone number.
    pub phone: Option<String>,
}

impl ClientDetails {
    /// Validates and normalizes the attributes.
    pub fn normalized(self) -> AppResult<Self> {
        let name = NonEmptyString::new(self.name.trim())?;
        if name.as_str().chars().count() > CLIENT_NAME_MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "client name must be at most {CLIENT_NAME_MAX_LENGTH} characters"
            )));
        }

        let email = self
            .email
            .filter(|value| !value.trim().is_empty())
            .map(|value| EmailAddress::new(value).map(String::from))
            .transpose()?;

        let phone = self
            .phone
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());

        Ok(Self {
            name: name.into(),
            email,
            phone,
        })
    }
}

/// Organization-scoped client that projects may reference.
///
/// Removal is a soft delete; dependent projects keep existing with their
/// reference cleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    id: ClientId,
    organization_id: OrganizationId,
    details: ClientDetails,
    version: i64,
    deleted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Client {
    /// Creates a new client at version 1.
    pub fn create(
        organization_id: OrganizationId,
        details: ClientDetails,
        now: DateTime<Utc>,
    ) -> AppResult<Self> {
        Ok(Self {
            id: ClientId::new(),
            organization_id,
            details: details.normalized()?,
            version: 1,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rebuilds a persisted client.
    pub fn restore(
        id: ClientId,
        organization_id: OrganizationId,
        details: ClientDetails,
        version: i64,
        deleted_at: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> AppResult<Self> {
        if version < 1 {
            return Err(AppError::Validation(
                "client version must be positive".to_owned(),
            ));
        }

        Ok(Self {
            id,
            organization_id,
            details: details.normalized()?,
            version,
            deleted_at,
            created_at,
            updated_at,
        })
    }

    /// Returns the client identifier.
    #[must_use]
    pub fn id(&self) -> ClientId {
        self.id
    }

    /// Returns the owning organization.
    #[must_use]
    pub fn organization_id(&self) -> OrganizationId {
        self.organization_id
    }

    /// Returns the editable attributes.
    #[must_use]
    pub fn details(&self) -> &ClientDetails {
        &self.details
    }

    /// Returns the optimistic concurrency version.
    #[must_use]
    pub fn version(&self) -> i64 {
        self.version
    }

    /// Returns the soft-delete timestamp.
    #[must_use]
    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    /// Returns whether the client was soft-deleted.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last modification timestamp.
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Replaces the attributes and bumps the version once.
    pub fn apply_update(&mut self, details: ClientDetails, now: DateTime<Utc>) -> AppResult<()> {
        self.details = details.normalized()?;
        self.version += 1;
        self.updated_at = now;
        Ok(())
    }

    /// Marks the client as removed and bumps the version once.
    pub fn mark_deleted(&mut self, now: DateTime<Utc>) {
        self.deleted_at = Some(now);
        self.version += 1;
        self.updated_at = now;
    }
}
