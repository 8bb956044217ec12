pub mod clients;
pub mod companies;
pub mod health;
pub mod projects;
pub mod roles;
pub mod users;

use atrium_core::AppResult;
use atrium_domain::{ClientId, CompanyId, CustomRoleId, ProjectId, UserId};

use crate::dto::parse_uuid;

#[cfg(test)]
pub(crate) mod test_support;

#[cfg(test)]
mod tests;

fn project_id(value: &str) -> AppResult<ProjectId> {
    parse_uuid("project id", value).map(ProjectId::from_uuid)
}

fn client_id(value: &str) -> AppResult<ClientId> {
    parse_uuid("client id", value).map(ClientId::from_uuid)
}

fn company_id(value: &str) -> AppResult<CompanyId> {
    parse_uuid("company id", value).map(CompanyId::from_uuid)
}

fn user_id(value: &str) -> AppResult<UserId> {
    parse_uuid("user id", value).map(UserId::from_uuid)
}

fn custom_role_id(value: &str) -> AppResult<CustomRoleId> {
    parse_uuid("role id", value).map(CustomRoleId::from_uuid)
}
