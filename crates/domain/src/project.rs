use std::fmt::{Display, Formatter};
use std::str::FromStr;

use atrium_core::{AppError, AppResult, NonEmptyString, OrganizationId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ClientId, LifecycleStatus};

/// Maximum length of a project name.
pub const PROJECT_NAME_MAX_LENGTH: usize = 100;
/// Maximum length of a project description.
pub const PROJECT_DESCRIPTION_MAX_LENGTH: usize = 2000;

/// Stable identifier of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectId(Uuid);

impl ProjectId {
    /// Creates a random project identifier.
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

impl Default for ProjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for ProjectId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Project lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    /// Initial status of every new project.
    Planning,
    /// Work is in progress.
    Active,
    /// Work is paused.
    OnHold,
    /// Terminal: work finished.
    Completed,
    /// Terminal: work abandoned.
    Cancelled,
}

impl ProjectStatus {
    /// Returns every status.
    #[must_use]
    pub fn all() -> &'static [Self] {
        &[
            Self::Planning,
            Self::Active,
            Self::OnHold,
            Self::Completed,
            Self::Cancelled,
        ]
    }
}

impl LifecycleStatus for ProjectStatus {
    fn allowed_transitions(self) -> &'static [Self] {
        match self {
            Self::Planning => &[Self::Active, Self::Cancelled],
            Self::Active => &[Self::OnHold, Self::Completed, Self::Cancelled],
            Self::OnHold => &[Self::Active, Self::Cancelled],
            Self::Completed | Self::Cancelled => &[],
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::Active => "active",
            Self::OnHold => "on_hold",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl Display for ProjectStatus {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "planning" => Ok(Self::Planning),
            "active" => Ok(Self::Active),
            "on_hold" => Ok(Self::OnHold),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(AppError::Validation(format!(
                "unknown project status '{value}'"
            ))),
        }
    }
}

/// Editable project attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDetails {
    /// Display name.
    pub name: String,
    /// Optional long-form description.
    pub description: Option<String>,
    /// Owning client, if any.
    pub client_id: Option<ClientId>,
    /// Planned start date.
    pub start_date: Option<NaiveDate>,
    /// Planned end date.
    pub end_date: Option<NaiveDate>,
    /// Budget in minor currency units.
    pub budget_cents: Option<i64>,
}

impl ProjectDetails {
    /// Validates and normalizes the attributes.
    pub fn normalized(self) -> AppResult<Self> {
        let name = NonEmptyString::new(self.name.trim())?;
        if name.as_str().chars().count() > PROJECT_NAME_MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "project name must be at most {PROJECT_NAME_MAX_LENGTH} characters"
            )));
        }

        let description = self
            .description
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());
        if description
            .as_deref()
            .is_some_and(|value| value.chars().count() > PROJECT_DESCRIPTION_MAX_LENGTH)
        {
            return Err(AppError::Validation(format!(
                "project description must be at most {PROJECT_DESCRIPTION_MAX_LENGTH} characters"
            )));
        }

        if let (Some(start_date), Some(end_date)) = (self.start_date, self.end_date)
            && end_date < start_date
        {
            return Err(AppError::Validation(
                "project end date must not precede its start date".to_owned(),
            ));
        }

        if self.budget_cents.is_some_and(|budget| budget < 0) {
            return Err(AppError::Validation(
                "project budget must not be negative".to_owned(),
            ));
        }

        Ok(Self {
            name: name.into(),
            description,
            client_id: self.client_id,
            start_date: self.start_date,
            end_date: self.end_date,
            budget_cents: self.budget_cents,
        })
    }
}

/// Organization-scoped project with lifecycle status and version counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    id: ProjectId,
    organization_id: OrganizationId,
    details: ProjectDetails,
    status: ProjectStatus,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Project {
    /// Creates a new project in `Planning` at version 1.
    pub fn create(
        organization_id: OrganizationId,
        details: ProjectDetails,
        now: DateTime<Utc>,
    ) -> AppResult<Self> {
        Self::restore(
            ProjectId::new(),
            organization_id,
            details,
            ProjectStatus::Planning,
            1,
            now,
            now,
        )
    }

    /// Rebuilds a persisted project.
    pub fn restore(
        id: ProjectId,
        organization_id: OrganizationId,
        details: ProjectDetails,
        status: ProjectStatus,
        version: i64,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> AppResult<Self> {
        if version < 1 {
            return Err(AppError::Validation(
                "project version must be positive".to_owned(),
            ));
        }

        Ok(Self {
            id,
            organization_id,
            details: details.normalized()?,
            status,
            version,
            created_at,
            updated_at,
        })
    }

    /// Returns the project identifier.
    #[must_use]
    pub fn id(&self) -> ProjectId {
        self.id
    }

    /// Returns the owning organization.
    #[must_use]
    pub fn organization_id(&self) -> OrganizationId {
        self.organization_id
    }

    /// Returns the editable attributes.
    #[must_use]
    pub fn details(&self) -> &ProjectDetails {
        &self.details
    }

    /// Returns the referenced client, if any.
    #[must_use]
    pub fn client_id(&self) -> Option<ClientId> {
        self.details.client_id
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub fn status(&self) -> ProjectStatus {
        self.status
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

    /// Applies an already-authorized write and bumps the version once.
    ///
    /// Transition legality and the expected version are checked by the
    /// caller before the write reaches storage.
    pub fn apply_update(
        &mut self,
        details: ProjectDetails,
        status: ProjectStatus,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        self.details = details.normalized()?;
        self.status = status;
        self.version += 1;
        self.updated_at = now;
        Ok(())
    }

    /// Drops the client reference after the client was removed.
    ///
    /// Not a user edit: the version is left untouched.
    pub fn detach_client(&mut self) {
        self.details.client_id = None;
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use proptest::prelude::*;

    use atrium_core::OrganizationId;

    use super::{Project, ProjectDetails, ProjectStatus};
    use crate::{LifecycleStatus, validate_transition};

    fn details(name: &str) -> ProjectDetails {
        ProjectDetails {
            name: name.to_owned(),
            description: None,
            client_id: None,
            start_date: None,
            end_date: None,
            budget_cents: None,
        }
    }

    #[test]
    fn transition_table_matches_lifecycle() {
        use ProjectStatus::{Active, Cancelled, Completed, OnHold, Planning};

        assert!(validate_transition(Planning, Active));
        assert!(validate_transition(Planning, Cancelled));
        assert!(!validate_transition(Planning, OnHold));
        assert!(!validate_transition(Planning, Completed));
        assert!(validate_transition(Active, OnHold));
        assert!(validate_transition(Active, Completed));
        assert!(!validate_transition(Active, Planning));
        assert!(validate_transition(OnHold, Active));
        assert!(!validate_transition(OnHold, Completed));
        assert!(!validate_transition(Completed, Planning));
        assert!(validate_transition(Active, Active));
    }

    #[test]
    fn terminal_statuses_have_no_exits() {
        for status in ProjectStatus::all() {
            let terminal = matches!(status, ProjectStatus::Completed | ProjectStatus::Cancelled);
            assert_eq!(status.is_terminal(), terminal);
        }

        for next in ProjectStatus::all() {
            if *next != ProjectStatus::Cancelled {
                assert!(!validate_transition(ProjectStatus::Cancelled, *next));
            }
        }
    }

    #[test]
    fn status_storage_value_roundtrips() {
        for status in ProjectStatus::all() {
            assert_eq!(status.as_str().parse::<ProjectStatus>().ok(), Some(*status));
        }
    }

    #[test]
    fn new_project_starts_in_planning_at_version_one() {
        let project = Project::create(OrganizationId::new(), details("Website"), Utc::now());
        assert!(project.is_ok_and(|project| {
            project.status() == ProjectStatus::Planning && project.version() == 1
        }));
    }

    #[test]
    fn details_reject_inverted_dates() {
        let mut input = details("Website");
        input.start_date = NaiveDate::from_ymd_opt(2026, 5, 1);
        input.end_date = NaiveDate::from_ymd_opt(2026, 4, 1);
        assert!(input.normalized().is_err());
    }

    #[test]
    fn details_reject_blank_name_and_negative_budget() {
        assert!(details("   ").normalized().is_err());

        let mut input = details("Website");
        input.budget_cents = Some(-1);
        assert!(input.normalized().is_err());
    }

    #[test]
    fn apply_update_increments_version_exactly_once() {
        let project = Project::create(OrganizationId::new(), details("Website"), Utc::now());
        assert!(project.is_ok());
        let Ok(mut project) = project else {
            return;
        };

        assert!(
            project
                .apply_update(details("Website v2"), ProjectStatus::Active, Utc::now())
                .is_ok()
        );
        assert_eq!(project.version(), 2);
        assert_eq!(project.details().name, "Website v2");
    }

    fn status() -> impl Strategy<Value = ProjectStatus> {
        prop::sample::select(ProjectStatus::all().to_vec())
    }

    proptest! {
        #[test]
        fn self_transition_is_always_allowed(status in status()) {
            prop_assert!(validate_transition(status, status));
        }

        #[test]
        fn transitions_follow_table(current in status(), next in status()) {
            let expected = current == next || current.allowed_transitions().contains(&next);
            prop_assert_eq!(validate_transition(current, next), expected);
            if current.is_terminal() && current != next {
                prop_assert!(!validate_transition(current, next));
            }
        }
    }
}
