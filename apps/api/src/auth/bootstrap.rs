use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use atrium_core::{AppError, AppResult, OrganizationId, UserIdentity};
use tower_sessions::Session;
use tracing::{info, warn};

use crate::dto::{BootstrapRequest, parse_uuid};
use crate::error::ApiResult;
use crate::state::AppState;

use super::{SESSION_CREATED_AT_KEY, SESSION_USER_KEY};

/// Development login guarded by the shared bootstrap token.
pub async fn bootstrap_handler(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<BootstrapRequest>,
) -> ApiResult<StatusCode> {
    let identity = bootstrap_identity(&state, payload)?;
    let user = state.user_service.ensure_user(&identity).await?;

    session
        .cycle_id()
        .await
        .map_err(|error| AppError::Internal(format!("failed to cycle session id: {error}")))?;

    session
        .insert(SESSION_USER_KEY, &identity)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to persist session identity: {error}"))
        })?;

    session
        .insert(SESSION_CREATED_AT_KEY, chrono::Utc::now().timestamp())
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to persist session creation time: {error}"))
        })?;

    info!(
        organization_id = %identity.organization_id(),
        user_id = %user.id(),
        role = %user.role(),
        "bootstrap login"
    );

    Ok(StatusCode::NO_CONTENT)
}

pub(super) fn bootstrap_identity(
    state: &AppState,
    payload: BootstrapRequest,
) -> AppResult<UserIdentity> {
    if payload.token != state.bootstrap_token {
        warn!(subject = %payload.subject, "bootstrap login rejected");
        return Err(AppError::Unauthorized("invalid bootstrap token".to_owned()));
    }

    let subject = payload.subject.trim().to_owned();
    if subject.is_empty() {
        return Err(AppError::Validation("subject must not be empty".to_owned()));
    }

    let organization_id = match payload.organization_id.as_deref() {
        Some(value) => OrganizationId::from_uuid(parse_uuid("organization_id", value)?),
        None => state.default_organization_id.ok_or_else(|| {
            AppError::Validation(
                "organization_id is required when no default organization is configured"
                    .to_owned(),
            )
        })?,
    };

    let display_name = payload
        .display_name
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| subject.clone());

    Ok(UserIdentity::new(
        subject,
        display_name,
        payload.email,
        organization_id,
    ))
}
