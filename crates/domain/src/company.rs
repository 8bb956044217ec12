use std::fmt::{Display, Formatter};

use atrium_core::{AppError, AppResult, NonEmptyString, OrganizationId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum length of a company name.
pub const COMPANY_NAME_MAX_LENGTH: usize = 100;
/// Maximum length of a company website URL.
pub const COMPANY_WEBSITE_MAX_LENGTH: usize = 200;
/// Maximum length of a company industry label.
pub const COMPANY_INDUSTRY_MAX_LENGTH: usize = 100;

/// Stable identifier of a company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CompanyId(Uuid);

impl CompanyId {
    /// Creates a random company identifier.
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

impl Default for CompanyId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for CompanyId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Editable company attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyDetails {
    /// Registered company name.
    pub name: String,
    /// Public website, `http` or `https` only.
    pub website: Option<String>,
    /// Free-form industry label.
    pub industry: Option<String>,
}

impl CompanyDetails {
    /// Validates and normalizes the attributes.
    pub fn normalized(self) -> AppResult<Self> {
        let name = NonEmptyString::new(self.name.trim())?;
        if name.as_str().chars().count() > COMPANY_NAME_MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "company name must be at most {COMPANY_NAME_MAX_LENGTH} characters"
            )));
        }

        let website = blank_to_none(self.website)
            .map(normalize_website)
            .transpose()?;

        let industry = blank_to_none(self.industry);
        if industry
            .as_deref()
            .is_some_and(|industry| industry.chars().count() > COMPANY_INDUSTRY_MAX_LENGTH)
        {
            return Err(AppError::Validation(format!(
                "company industry must be at most {COMPANY_INDUSTRY_MAX_LENGTH} characters"
            )));
        }

        Ok(Self {
            name: name.into(),
            website,
            industry,
        })
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn normalize_website(website: String) -> AppResult<String> {
    let lowercase = website.to_ascii_lowercase();
    let host = lowercase
        .strip_prefix("https://")
        .or_else(|| lowercase.strip_prefix("http://"));

    if host.is_none_or(str::is_empty) || website.chars().any(char::is_whitespace) {
        return Err(AppError::Validation(format!(
            "company website '{website}' must be an http or https URL"
        )));
    }

    if website.chars().count() > COMPANY_WEBSITE_MAX_LENGTH {
        return Err(AppError::Validation(format!(
            "company website must be at most {COMPANY_WEBSITE_MAX_LENGTH} characters"
        )));
    }

    Ok(website)
}

/// Organization-scoped company record.
///
/// Nothing references companies, so removal is a hard delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    id: CompanyId,
    organization_id: OrganizationId,
    details: CompanyDetails,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Company {
    /// Creates a new company at version 1.
    pub fn create(
        organization_id: OrganizationId,
        details: CompanyDetails,
        now: DateTime<Utc>,
    ) -> AppResult<Self> {
        Ok(Self {
            id: CompanyId::new(),
            organization_id,
            details: details.normalized()?,
            version: 1,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rebuilds a persisted company.
    pub fn restore(
        id: CompanyId,
        organization_id: OrganizationId,
        details: CompanyDetails,
        version: i64,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> AppResult<Self> {
        if version < 1 {
            return Err(AppError::Validation(
                "company version must be positive".to_owned(),
            ));
        }

        Ok(Self {
            id,
            organization_id,
            details: details.normalized()?,
            version,
            created_at,
            updated_at,
        })
    }

    /// Returns the company identifier.
    #[must_use]
    pub fn id(&self) -> CompanyId {
        self.id
    }

    /// Returns the owning organization.
    #[must_use]
    pub fn organization_id(&self) -> OrganizationId {
        self.organization_id
    }

    /// Returns the editable attributes.
    #[must_use]
    pub fn details(&self) -> &CompanyDetails {
        &self.details
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

    /// Returns the last modification timestamp.
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Replaces the attributes and bumps the version once.
    pub fn apply_update(&mut self, details: CompanyDetails, now: DateTime<Utc>) -> AppResult<()> {
        self.details = details.normalized()?;
        self.version += 1;
        self.updated_at = now;
        Ok(())
    }
}
