use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use atrium_core::{AppError, UserIdentity};
use atrium_domain::Principal;
use tower_sessions::Session;

use crate::dto::SessionPrincipalResponse;
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn logout_handler(session: Session) -> ApiResult<StatusCode> {
    session
        .delete()
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete session: {error}")))?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn me_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<SessionPrincipalResponse>> {
    let permissions = state
        .authorization_service
        .resolve_permissions(Some(&principal))
        .await;

    Ok(Json(SessionPrincipalResponse::new(
        &identity,
        &principal,
        &permissions,
    )))
}

#[cfg(test)]
mod tests {
    use axum::extract::{Extension, State};
    use atrium_core::OrganizationId;

    use crate::handlers::test_support::{sign_in, test_state};

    use super::me_handler;

    #[tokio::test]
    async fn me_lists_effective_permissions_of_members() {
        let state = test_state();
        let organization_id = OrganizationId::new();
        sign_in(&state, organization_id, "founder").await;
        let (identity, principal) = sign_in(&state, organization_id, "mia").await;

        let response = me_handler(State(state), Extension(identity), Extension(principal)).await;

        assert!(response.is_ok_and(|response| {
            response.role == "member"
                && response.permissions
                    == [
                        "clients.view",
                        "companies.view",
                        "projects.view",
                        "users.view",
                    ]
                        .map(ToOwned::to_owned)
                        .to_vec()
        }));
    }

    #[tokio::test]
    async fn me_reports_wildcard_for_superadmins() {
        let state = test_state();
        let (identity, principal) = sign_in(&state, OrganizationId::new(), "founder").await;

        let response = me_handler(State(state), Extension(identity), Extension(principal)).await;

        assert!(response.is_ok_and(|response| {
            response.role == "superadmin" && response.permissions == vec!["*".to_owned()]
        }));
    }
}
