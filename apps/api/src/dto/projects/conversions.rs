use std::str::FromStr;

use atrium_application::{
    CreateProjectInput, DEFAULT_PROJECT_PAGE_SIZE, ProjectListQuery, UpdateProjectInput,
    UpdateProjectStatusInput,
};
use atrium_core::{AppError, AppResult};
use atrium_domain::{ClientId, LifecycleStatus, Project, ProjectDetails, ProjectStatus};

use super::super::common::{parse_optional_date, parse_optional_uuid, timestamp};
use super::{
    CreateProjectRequest, ProjectListParams, ProjectResponse, UpdateProjectRequest,
    UpdateProjectStatusRequest,
};

struct DetailFields<'a> {
    name: String,
    description: Option<String>,
    client_id: Option<&'a str>,
    start_date: Option<&'a str>,
    end_date: Option<&'a str>,
    budget_cents: Option<i64>,
}

impl DetailFields<'_> {
    fn into_details(self) -> AppResult<ProjectDetails> {
        Ok(ProjectDetails {
            name: self.name,
            description: self.description,
            client_id: parse_optional_uuid("client_id", self.client_id)?
                .map(ClientId::from_uuid),
            start_date: parse_optional_date("start_date", self.start_date)?,
            end_date: parse_optional_date("end_date", self.end_date)?,
            budget_cents: self.budget_cents,
        })
    }
}

impl TryFrom<CreateProjectRequest> for CreateProjectInput {
    type Error = AppError;

    fn try_from(value: CreateProjectRequest) -> Result<Self, Self::Error> {
        let details = DetailFields {
            name: value.name,
            description: value.description,
            client_id: value.client_id.as_deref(),
            start_date: value.start_date.as_deref(),
            end_date: value.end_date.as_deref(),
            budget_cents: value.budget_cents,
        }
        .into_details()?;

        Ok(Self { details })
    }
}

impl TryFrom<UpdateProjectRequest> for UpdateProjectInput {
    type Error = AppError;

    fn try_from(value: UpdateProjectRequest) -> Result<Self, Self::Error> {
        let details = DetailFields {
            name: value.name,
            description: value.description,
            client_id: value.client_id.as_deref(),
            start_date: value.start_date.as_deref(),
            end_date: value.end_date.as_deref(),
            budget_cents: value.budget_cents,
        }
        .into_details()?;

        Ok(Self {
            details,
            status: value
                .status
                .as_deref()
                .map(ProjectStatus::from_str)
                .transpose()?,
            expected_version: value.expected_version,
        })
    }
}

impl TryFrom<UpdateProjectStatusRequest> for UpdateProjectStatusInput {
    type Error = AppError;

    fn try_from(value: UpdateProjectStatusRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            status: ProjectStatus::from_str(value.status.as_str())?,
            expected_version: value.expected_version,
        })
    }
}

impl TryFrom<ProjectListParams> for ProjectListQuery {
    type Error = AppError;

    fn try_from(value: ProjectListParams) -> Result<Self, Self::Error> {
        Ok(Self {
            search: value.search.filter(|search| !search.trim().is_empty()),
            client_id: parse_optional_uuid("client_id", value.client_id.as_deref())?
                .map(ClientId::from_uuid),
            status: value
                .status
                .as_deref()
                .filter(|status| !status.is_empty())
                .map(ProjectStatus::from_str)
                .transpose()?,
            starts_on_or_after: parse_optional_date(
                "starts_on_or_after",
                value.starts_on_or_after.as_deref(),
            )?,
            ends_on_or_before: parse_optional_date(
                "ends_on_or_before",
                value.ends_on_or_before.as_deref(),
            )?,
            limit: value.limit.unwrap_or(DEFAULT_PROJECT_PAGE_SIZE),
            offset: value.offset.unwrap_or_default(),
        })
    }
}

impl From<Project> for ProjectResponse {
    fn from(value: Project) -> Self {
        let status = value.status();
        let details = value.details();

        Self {
            project_id: value.id().to_string(),
            name: details.name.clone(),
            description: details.description.clone(),
            client_id: value.client_id().map(|id| id.to_string()),
            status: status.as_str().to_owned(),
            allowed_transitions: status
                .allowed_transitions()
                .iter()
                .map(|next| next.as_str().to_owned())
                .collect(),
            is_terminal: status.is_terminal(),
            start_date: details.start_date.map(|date| date.to_string()),
            end_date: details.end_date.map(|date| date.to_string()),
            budget_cents: details.budget_cents,
            version: value.version(),
            created_at: timestamp(value.created_at()),
            updated_at: timestamp(value.updated_at()),
        }
    }
}
