use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;

use atrium_application::{ClientListQuery, UpdateClientInput};
use atrium_domain::{ClientDetails, Principal};

use crate::dto::{
    ClientListParams, ClientResponse, CreateClientRequest, DeleteClientResponse,
    UpdateClientRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

use super::client_id;

pub async fn list_clients_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(params): Query<ClientListParams>,
) -> ApiResult<Json<Vec<ClientResponse>>> {
    let clients = state
        .client_service
        .list_clients(&principal, ClientListQuery::from(params))
        .await?
        .into_iter()
        .map(ClientResponse::from)
        .collect();

    Ok(Json(clients))
}

pub async fn create_client_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<CreateClientRequest>,
) -> ApiResult<(StatusCode, Json<ClientResponse>)> {
    let client = state
        .client_service
        .create_client(&principal, ClientDetails::from(payload))
        .await?;

    Ok((StatusCode::CREATED, Json(ClientResponse::from(client))))
}

pub async fn get_client_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<Json<ClientResponse>> {
    let client = state
        .client_service
        .get_client(&principal, client_id(&id)?)
        .await?;

    Ok(Json(ClientResponse::from(client)))
}

pub async fn update_client_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateClientRequest>,
) -> ApiResult<Json<ClientResponse>> {
    let client = state
        .client_service
        .update_client(&principal, client_id(&id)?, UpdateClientInput::from(payload))
        .await?;

    Ok(Json(ClientResponse::from(client)))
}

pub async fn delete_client_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteClientResponse>> {
    let detached_project_count = state
        .client_service
        .delete_client(&principal, client_id(&id)?)
        .await?;

    Ok(Json(DeleteClientResponse {
        detached_project_count,
    }))
}
