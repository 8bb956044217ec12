use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;

use atrium_application::{CompanyListQuery, UpdateCompanyInput};
use atrium_domain::{CompanyDetails, Principal};

use crate::dto::{CompanyListParams, CompanyResponse, CreateCompanyRequest, UpdateCompanyRequest};
use crate::error::ApiResult;
use crate::state::AppState;

use super::company_id;

pub async fn list_companies_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(params): Query<CompanyListParams>,
) -> ApiResult<Json<Vec<CompanyResponse>>> {
    let companies = state
        .company_service
        .list_companies(&principal, CompanyListQuery::from(params))
        .await?
        .into_iter()
        .map(CompanyResponse::from)
        .collect();

    Ok(Json(companies))
}

pub async fn create_company_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<CreateCompanyRequest>,
) -> ApiResult<(StatusCode, Json<CompanyResponse>)> {
    let company = state
        .company_service
        .create_company(&principal, CompanyDetails::from(payload))
        .await?;

    Ok((StatusCode::CREATED, Json(CompanyResponse::from(company))))
}

pub async fn get_company_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<Json<CompanyResponse>> {
    let company = state
        .company_service
        .get_company(&principal, company_id(&id)?)
        .await?;

    Ok(Json(CompanyResponse::from(company)))
}

pub async fn update_company_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateCompanyRequest>,
) -> ApiResult<Json<CompanyResponse>> {
    let company = state
        .company_service
        .update_company(&principal, company_id(&id)?, UpdateCompanyInput::from(payload))
        .await?;

    Ok(Json(CompanyResponse::from(company)))
}

pub async fn delete_company_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .company_service
        .delete_company(&principal, company_id(&id)?)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
