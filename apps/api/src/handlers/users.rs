use axum::Json;
use axum::extract::{Extension, Path, State};

use atrium_application::AssignRoleInput;
use atrium_domain::Principal;

use crate::dto::{AssignUserRoleRequest, UserResponse};
use crate::error::ApiResult;
use crate::state::AppState;

use super::user_id;

pub async fn list_users_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let users = state
        .user_service
        .list_users(&principal)
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    Ok(Json(users))
}

pub async fn get_user_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<Json<UserResponse>> {
    let user = state.user_service.get_user(&principal, user_id(&id)?).await?;

    Ok(Json(UserResponse::from(user)))
}

pub async fn assign_user_role_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(payload): Json<AssignUserRoleRequest>,
) -> ApiResult<Json<UserResponse>> {
    let user = state
        .user_service
        .assign_role(
            &principal,
            user_id(&id)?,
            AssignRoleInput::try_from(payload)?,
        )
        .await?;

    Ok(Json(UserResponse::from(user)))
}
