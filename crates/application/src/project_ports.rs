use async_trait::async_trait;
use atrium_core::{AppResult, OrganizationId};
use atrium_domain::{ClientId, Project, ProjectDetails, ProjectId, ProjectStatus};
use chrono::NaiveDate;

/// Default page size for project listings.
pub const DEFAULT_PROJECT_PAGE_SIZE: usize = 50;
/// Largest page size accepted for project listings.
pub const MAX_PROJECT_PAGE_SIZE: usize = 200;

/// Filters for project listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectListQuery {
    /// Case-insensitive match on name or description.
    pub search: Option<String>,
    /// Restricts results to one client.
    pub client_id: Option<ClientId>,
    /// Restricts results to one status.
    pub status: Option<ProjectStatus>,
    /// Projects starting on or after this date.
    pub starts_on_or_after: Option<NaiveDate>,
    /// Projects ending on or before this date.
    pub ends_on_or_before: Option<NaiveDate>,
    /// Maximum rows returned.
    pub limit: usize,
    /// Number of rows skipped for offset pagination.
    pub offset: usize,
}

impl Default for ProjectListQuery {
    fn default() -> Self {
        Self {
            search: None,
            client_id: None,
            status: None,
            starts_on_or_after: None,
            ends_on_or_before: None,
            limit: DEFAULT_PROJECT_PAGE_SIZE,
            offset: 0,
        }
    }
}

impl ProjectListQuery {
    /// Returns whether a project satisfies every filter except paging.
    #[must_use]
    pub fn matches(&self, project: &Project) -> bool {
        let details = project.details();

        let search_matches = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|search| !search.is_empty())
            .map(|search| {
                let needle = search.to_lowercase();
                details.name.to_lowercase().contains(&needle)
                    || details
                        .description
                        .as_deref()
                        .is_some_and(|description| description.to_lowercase().contains(&needle))
            })
            .unwrap_or(true);

        search_matches
            && self
                .client_id
                .is_none_or(|client_id| details.client_id == Some(client_id))
            && self.status.is_none_or(|status| project.status() == status)
            && self.starts_on_or_after.is_none_or(|bound| {
                details
                    .start_date
                    .is_some_and(|start_date| start_date >= bound)
            })
            && self.ends_on_or_before.is_none_or(|bound| {
                details.end_date.is_some_and(|end_date| end_date <= bound)
            })
    }
}

/// Input payload for creating projects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateProjectInput {
    /// Initial attributes.
    pub details: ProjectDetails,
}

/// Input payload for full project updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateProjectInput {
    /// Replacement attributes.
    pub details: ProjectDetails,
    /// Requested status; `None` keeps the current status.
    pub status: Option<ProjectStatus>,
    /// Version the caller last read.
    pub expected_version: i64,
}

/// Input payload for status-only updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateProjectStatusInput {
    /// Requested status.
    pub status: ProjectStatus,
    /// Version the caller last read.
    pub expected_version: i64,
}

/// Repository port for organization-scoped project storage.
///
/// Writes taking `expected_version` must compare and increment the version
/// in one atomic step and report `VersionConflict` when the stored version
/// differs, leaving the row untouched.
///
/// `create_project` and `update_project` re-check a non-null client
/// reference inside the same atomic write: a client that is missing or
/// soft-deleted at that moment yields `ReferenceNotFound` and nothing is
/// stored. A version mismatch is reported before a dangling reference.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Persists a new project.
    async fn create_project(&self, organization_id: OrganizationId, project: Project)
    -> AppResult<()>;

    /// Lists projects matching the query, newest first.
    async fn list_projects(
        &self,
        organization_id: OrganizationId,
        query: ProjectListQuery,
    ) -> AppResult<Vec<Project>>;

    /// Finds a project in the organization scope.
    async fn find_project(
        &self,
        organization_id: OrganizationId,
        project_id: ProjectId,
    ) -> AppResult<Option<Project>>;

    /// Replaces attributes and status when the version still matches.
    async fn update_project(
        &self,
        organization_id: OrganizationId,
        project_id: ProjectId,
        details: ProjectDetails,
        status: ProjectStatus,
        expected_version: i64,
    ) -> AppResult<Project>;

    /// Replaces the status when the version still matches.
    async fn update_project_status(
        &self,
        organization_id: OrganizationId,
        project_id: ProjectId,
        status: ProjectStatus,
        expected_version: i64,
    ) -> AppResult<Project>;

    /// Permanently removes a project.
    async fn delete_project(
        &self,
        organization_id: OrganizationId,
        project_id: ProjectId,
    ) -> AppResult<()>;

    /// Lists projects referencing one client.
    async fn list_projects_by_client(
        &self,
        organization_id: OrganizationId,
        client_id: ClientId,
    ) -> AppResult<Vec<Project>>;
}
