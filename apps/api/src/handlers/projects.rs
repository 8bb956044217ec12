use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;

use atrium_application::{
    CreateProjectInput, ProjectListQuery, UpdateProjectInput, UpdateProjectStatusInput,
};
use atrium_domain::Principal;

use crate::dto::{
    CreateProjectRequest, ProjectListParams, ProjectResponse, UpdateProjectRequest,
    UpdateProjectStatusRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

use super::{client_id, project_id};

pub async fn list_projects_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(params): Query<ProjectListParams>,
) -> ApiResult<Json<Vec<ProjectResponse>>> {
    let query = ProjectListQuery::try_from(params)?;
    let projects = state
        .project_service
        .list_projects(&principal, query)
        .await?
        .into_iter()
        .map(ProjectResponse::from)
        .collect();

    Ok(Json(projects))
}

pub async fn create_project_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<ProjectResponse>)> {
    let project = state
        .project_service
        .create_project(&principal, CreateProjectInput::try_from(payload)?)
        .await?;

    Ok((StatusCode::CREATED, Json(ProjectResponse::from(project))))
}

pub async fn get_project_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<Json<ProjectResponse>> {
    let project = state
        .project_service
        .get_project(&principal, project_id(&id)?)
        .await?;

    Ok(Json(ProjectResponse::from(project)))
}

pub async fn update_project_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateProjectRequest>,
) -> ApiResult<Json<ProjectResponse>> {
    let project = state
        .project_service
        .update_project(
            &principal,
            project_id(&id)?,
            UpdateProjectInput::try_from(payload)?,
        )
        .await?;

    Ok(Json(ProjectResponse::from(project)))
}

pub async fn update_project_status_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateProjectStatusRequest>,
) -> ApiResult<Json<ProjectResponse>> {
    let project = state
        .project_service
        .update_project_status(
            &principal,
            project_id(&id)?,
            UpdateProjectStatusInput::try_from(payload)?,
        )
        .await?;

    Ok(Json(ProjectResponse::from(project)))
}

pub async fn delete_project_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .project_service
        .delete_project(&principal, project_id(&id)?)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_client_projects_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<ProjectResponse>>> {
    let projects = state
        .project_service
        .list_projects_by_client(&principal, client_id(&id)?)
        .await?
        .into_iter()
        .map(ProjectResponse::from)
        .collect();

    Ok(Json(projects))
}
