use serde::{Deserialize, Serialize};
use ts_rs::TS;

mod conversions;

/// Incoming payload for project creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/create-project-request.ts"
)]
pub struct CreateProjectRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    /// `YYYY-MM-DD`.
    #[serde(default)]
    pub start_date: Option<String>,
    /// `YYYY-MM-DD`.
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub budget_cents: Option<i64>,
}

/// Incoming payload for a full project edit.
///
/// Every editable attribute is replaced; omitted optional values are cleared.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/update-project-request.ts"
)]
pub struct UpdateProjectRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub budget_cents: Option<i64>,
    /// New status; keeps the current one when omitted.
    #[serde(default)]
    pub status: Option<String>,
    pub expected_version: i64,
}

/// Incoming payload for a status-only change.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/update-project-status-request.ts"
)]
pub struct UpdateProjectStatusRequest {
    pub status: String,
    pub expected_version: i64,
}

/// Query string accepted by the project listing.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/project-list-params.ts"
)]
pub struct ProjectListParams {
    pub search: Option<String>,
    pub client_id: Option<String>,
    pub status: Option<String>,
    pub starts_on_or_after: Option<String>,
    pub ends_on_or_before: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// API representation of a project.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/project-response.ts"
)]
pub struct ProjectResponse {
    pub project_id: String,
    pub name: String,
    pub description: Option<String>,
    pub client_id: Option<String>,
    pub status: String,
    /// Statuses reachable from the current one.
    pub allowed_transitions: Vec<String>,
    pub is_terminal: bool,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub budget_cents: Option<i64>,
    pub version: i64,
    pub created_at: String,
    pub updated_at: String,
}
