use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;

use atrium_application::{CreateCustomRoleInput, UpdateCustomRoleInput};
use atrium_domain::Principal;

use crate::dto::{CreateCustomRoleRequest, CustomRoleResponse, UpdateCustomRoleRequest};
use crate::error::ApiResult;
use crate::state::AppState;

use super::custom_role_id;

pub async fn list_roles_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<Vec<CustomRoleResponse>>> {
    let roles = state
        .security_admin_service
        .list_custom_roles(&principal)
        .await?
        .into_iter()
        .map(CustomRoleResponse::from)
        .collect();

    Ok(Json(roles))
}

pub async fn create_role_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<CreateCustomRoleRequest>,
) -> ApiResult<(StatusCode, Json<CustomRoleResponse>)> {
    let role = state
        .security_admin_service
        .create_custom_role(&principal, CreateCustomRoleInput::from(payload))
        .await?;

    Ok((StatusCode::CREATED, Json(CustomRoleResponse::from(role))))
}

pub async fn get_role_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<Json<CustomRoleResponse>> {
    let role = state
        .security_admin_service
        .get_custom_role(&principal, custom_role_id(&id)?)
        .await?;

    Ok(Json(CustomRoleResponse::from(role)))
}

pub async fn update_role_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateCustomRoleRequest>,
) -> ApiResult<Json<CustomRoleResponse>> {
    let role = state
        .security_admin_service
        .update_custom_role(
            &principal,
            custom_role_id(&id)?,
            UpdateCustomRoleInput::from(payload),
        )
        .await?;

    Ok(Json(CustomRoleResponse::from(role)))
}

pub async fn delete_role_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .security_admin_service
        .delete_custom_role(&principal, custom_role_id(&id)?)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Lists the permission registry.
pub async fn list_permissions_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<Vec<String>>> {
    let permissions = state
        .security_admin_service
        .list_permissions(&principal)
        .await?
        .into_iter()
        .map(String::from)
        .collect();

    Ok(Json(permissions))
}
