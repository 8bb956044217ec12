use atrium_core::{OrganizationId, UserIdentity};
use atrium_domain::Principal;

use crate::api_config::ApiConfig;
use crate::api_services::{RepositorySet, build_app_state};
use crate::state::AppState;

pub(crate) fn test_state() -> AppState {
    let config = ApiConfig {
        migrate_only: false,
        database_url: String::new(),
        database_max_connections: 1,
        frontend_url: "http://localhost:3000".to_owned(),
        bootstrap_token: "bootstrap-token".to_owned(),
        _session_secret: "s".repeat(32),
        api_host: "127.0.0.1".to_owned(),
        api_port: 0,
        cookie_secure: false,
        default_organization_id: Some(OrganizationId::new()),
    };

    build_app_state(RepositorySet::in_memory(), &config).unwrap_or_else(|error| panic!("{error}"))
}

/// Registers the subject in the directory and resolves its principal.
pub(crate) async fn sign_in(
    state: &AppState,
    organization_id: OrganizationId,
    subject: &str,
) -> (UserIdentity, Principal) {
    let identity = UserIdentity::new(subject, subject, None, organization_id);
    state
        .user_service
        .ensure_user(&identity)
        .await
        .unwrap_or_else(|error| panic!("{error}"));
    let principal = state
        .user_service
        .resolve_principal(&identity)
        .await
        .unwrap_or_else(|error| panic!("{error}"));

    (identity, principal)
}
