use atrium_application::{
    AuthorizationService, ClientService, CompanyService, ProjectService, SecurityAdminService,
    UserService,
};
use atrium_core::OrganizationId;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub project_service: ProjectService,
    pub client_service: ClientService,
    pub company_service: CompanyService,
    pub user_service: UserService,
    pub security_admin_service: SecurityAdminService,
    pub authorization_service: AuthorizationService,
    pub frontend_url: String,
    pub bootstrap_token: String,
    pub default_organization_id: Option<OrganizationId>,
}
