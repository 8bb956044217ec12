use std::sync::Arc;

use atrium_application::{
    AuditRepository, AuthorizationRepository, ClientRepository, CompanyRepository,
    CustomRoleRepository, ProjectRepository, UserRepository,
};
use atrium_infrastructure::{
    PostgresAuditRepository, PostgresClientRepository, PostgresCompanyRepository,
    PostgresCustomRoleRepository, PostgresProjectRepository, PostgresUserRepository,
};
use sqlx::PgPool;

/// Storage adapters behind every application port.
pub struct RepositorySet {
    pub(super) project_repository: Arc<dyn ProjectRepository>,
    pub(super) client_repository: Arc<dyn ClientRepository>,
    pub(super) company_repository: Arc<dyn CompanyRepository>,
    pub(super) user_repository: Arc<dyn UserRepository>,
    pub(super) authorization_repository: Arc<dyn AuthorizationRepository>,
    pub(super) custom_role_repository: Arc<dyn CustomRoleRepository>,
    pub(super) audit_repository: Arc<dyn AuditRepository>,
}

impl RepositorySet {
    pub fn postgres(pool: &PgPool) -> Self {
        let custom_role_repository = Arc::new(PostgresCustomRoleRepository::new(pool.clone()));

        Self {
            project_repository: Arc::new(PostgresProjectRepository::new(pool.clone())),
            client_repository: Arc::new(PostgresClientRepository::new(pool.clone())),
            company_repository: Arc::new(PostgresCompanyRepository::new(pool.clone())),
            user_repository: Arc::new(PostgresUserRepository::new(pool.clone())),
            authorization_repository: custom_role_repository.clone(),
            custom_role_repository,
            audit_repository: Arc::new(PostgresAuditRepository::new(pool.clone())),
        }
    }

    #[cfg(test)]
    pub fn in_memory() -> Self {
        use atrium_infrastructure::{
            InMemoryAuditRepository, InMemoryCompanyRepository, InMemoryDirectoryRepository,
            InMemoryWorkspaceRepository,
        };

        let workspace = Arc::new(InMemoryWorkspaceRepository::new());
        let directory = Arc::new(InMemoryDirectoryRepository::new());

        Self {
            project_repository: workspace.clone(),
            client_repository: workspace,
            company_repository: Arc::new(InMemoryCompanyRepository::new()),
            user_repository: directory.clone(),
            authorization_repository: directory.clone(),
            custom_role_repository: directory,
            audit_repository: Arc::new(InMemoryAuditRepository::new()),
        }
    }
}
