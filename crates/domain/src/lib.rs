//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod client;
mod company;
mod lifecycle;
mod principal;
mod project;
mod registry;
mod role;
mod security;
mod user;

pub use client::{CLIENT_NAME_MAX_LENGTH, Client, ClientDetails, ClientId};
pub use company::{
    COMPANY_INDUSTRY_MAX_LENGTH, COMPANY_NAME_MAX_LENGTH, COMPANY_WEBSITE_MAX_LENGTH, Company,
    CompanyDetails, CompanyId,
};
pub use lifecycle::{LifecycleStatus, validate_transition};
pub use principal::Principal;
pub use project::{
    PROJECT_DESCRIPTION_MAX_LENGTH, PROJECT_NAME_MAX_LENGTH, Project, ProjectDetails, ProjectId,
    ProjectStatus,
};
pub use registry::PermissionRegistry;
pub use role::{
    CUSTOM_ROLE_DESCRIPTION_MAX_LENGTH, CUSTOM_ROLE_NAME_MAX_LENGTH, CustomRole, CustomRoleId,
    CustomRoleName, SystemRole, compare_roles,
};
pub use security::{
    AuditAction, Permission, PermissionSet, WILDCARD_PERMISSION, matches_permission, permissions,
};
pub use user::{EmailAddress, UserAccount, UserId};
