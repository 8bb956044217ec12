//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_audit_repository;
mod in_memory_company_repository;
mod in_memory_directory_repository;
mod in_memory_workspace_repository;
mod postgres_audit_repository;
mod postgres_client_repository;
mod postgres_company_repository;
mod postgres_custom_role_repository;
mod postgres_project_repository;
mod postgres_user_repository;
mod repository_errors;

pub use in_memory_audit_repository::InMemoryAuditRepository;
pub use in_memory_company_repository::InMemoryCompanyRepository;
pub use in_memory_directory_repository::InMemoryDirectoryRepository;
pub use in_memory_workspace_repository::InMemoryWorkspaceRepository;
pub use postgres_audit_repository::PostgresAuditRepository;
pub use postgres_client_repository::PostgresClientRepository;
pub use postgres_company_repository::PostgresCompanyRepository;
pub use postgres_custom_role_repository::PostgresCustomRoleRepository;
pub use postgres_project_repository::PostgresProjectRepository;
pub use postgres_user_repository::PostgresUserRepository;
