//! Application services and ports.

#![forbid(unsafe_code)]

mod audit_ports;
mod authorization_service;
mod client_ports;
mod client_service;
mod company_ports;
mod company_service;
mod lifecycle_guard;
mod project_ports;
mod project_service;
mod security_admin_ports;
mod security_admin_service;
mod user_service;

pub use audit_ports::{AuditEvent, AuditRepository};
pub use authorization_service::{AuthorizationRepository, AuthorizationService};
pub use client_ports::{
    ClientListQuery, ClientRepository, DEFAULT_CLIENT_PAGE_SIZE, MAX_CLIENT_PAGE_SIZE,
    UpdateClientInput,
};
pub use client_service::ClientService;
pub use company_ports::{
    CompanyListQuery, CompanyRepository, DEFAULT_COMPANY_PAGE_SIZE, MAX_COMPANY_PAGE_SIZE,
    UpdateCompanyInput,
};
pub use company_service::CompanyService;
pub use lifecycle_guard::LifecycleGuard;
pub use project_ports::{
    CreateProjectInput, DEFAULT_PROJECT_PAGE_SIZE, MAX_PROJECT_PAGE_SIZE, ProjectListQuery,
    ProjectRepository, UpdateProjectInput, UpdateProjectStatusInput,
};
pub use project_service::ProjectService;
pub use security_admin_ports::{
    CreateCustomRoleInput, CustomRoleRepository, UpdateCustomRoleInput,
};
pub use security_admin_service::SecurityAdminService;
pub use user_service::{AssignRoleInput, UserRepository, UserService};
