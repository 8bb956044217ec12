mod auth;
mod clients;
mod companies;
mod common;
mod projects;
mod roles;
mod users;

pub use auth::{BootstrapRequest, SessionPrincipalResponse};
pub use clients::{
    ClientListParams, ClientResponse, CreateClientRequest, DeleteClientResponse,
    UpdateClientRequest,
};
pub use common::{HealthResponse, parse_uuid};
pub use companies::{
    CompanyListParams, CompanyResponse, CreateCompanyRequest, UpdateCompanyRequest,
};
pub use projects::{
    CreateProjectRequest, ProjectListParams, ProjectResponse, UpdateProjectRequest,
    UpdateProjectStatusRequest,
};
pub use roles::{CreateCustomRoleRequest, CustomRoleResponse, UpdateCustomRoleRequest};
pub use users::{AssignUserRoleRequest, UserResponse};
