use std::sync::Arc;

use atrium_application::{
    AuthorizationService, ClientService, CompanyService, LifecycleGuard, ProjectService,
    SecurityAdminService, UserService,
};
use atrium_core::AppError;
use atrium_domain::PermissionRegistry;

use crate::api_config::ApiConfig;
use crate::state::AppState;

mod repositories;

pub use repositories::RepositorySet;

/// Wires the application services over one repository set.
pub fn build_app_state(
    repositories: RepositorySet,
    config: &ApiConfig,
) -> Result<AppState, AppError> {
    let registry = Arc::new(PermissionRegistry::standard()?);
    let authorization_service =
        AuthorizationService::new(registry, repositories.authorization_repository.clone());
    let guard = LifecycleGuard::new(authorization_service.clone());

    Ok(AppState {
        project_service: ProjectService::new(
            guard.clone(),
            repositories.project_repository,
            repositories.client_repository.clone(),
            repositories.audit_repository.clone(),
        ),
        client_service: ClientService::new(
            guard.clone(),
            repositories.client_repository,
            repositories.audit_repository.clone(),
        ),
        company_service: CompanyService::new(
            guard.clone(),
            repositories.company_repository,
            repositories.audit_repository.clone(),
        ),
        user_service: UserService::new(
            guard.clone(),
            repositories.user_repository,
            repositories.authorization_repository,
            repositories.audit_repository.clone(),
        ),
        security_admin_service: SecurityAdminService::new(
            guard,
            repositories.custom_role_repository,
            repositories.audit_repository,
        ),
        authorization_service,
        frontend_url: config.frontend_url.clone(),
        bootstrap_token: config.bootstrap_token.clone(),
        default_organization_id: config.default_organization_id,
    })
}
