use std::collections::HashMap;

use async_trait::async_trait;
use atrium_application::{
    ClientListQuery, ClientRepository, ProjectListQuery, ProjectRepository,
};
use atrium_core::{AppError, AppResult, OrganizationId};
use atrium_domain::{
    Client, ClientDetails, ClientId, Project, ProjectDetails, ProjectId, ProjectStatus,
};
use chrono::Utc;
use tokio::sync::RwLock;

use crate::repository_errors::{missing_client_reference, stale_or_missing};

#[cfg(test)]
mod tests;

/// In-memory project and client storage.
///
/// Both entity kinds live in one adapter so a client soft delete can clear
/// project references under the same pair of write locks. Locks are always
/// taken clients first, then projects.
#[derive(Debug, Default)]
pub struct InMemoryWorkspaceRepository {
    projects: RwLock<HashMap<(OrganizationId, ProjectId), Project>>,
    clients: RwLock<HashMap<(OrganizationId, ClientId), Client>>,
}

impl InMemoryWorkspaceRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProjectRepository for InMemoryWorkspaceRepository {
    async fn create_project(
        &self,
        organization_id: OrganizationId,
        project: Project,
    ) -> AppResult<()> {
        let key = (organization_id, project.id());
        let clients = self.clients.read().await;
        let mut projects = self.projects.write().await;

        if projects.contains_key(&key) {
            return Err(AppError::Conflict(format!(
                "project '{}' already exists",
                project.id()
            )));
        }

        if let Some(client_id) = project.client_id() {
            ensure_live_client(&clients, organization_id, client_id)?;
        }

        projects.insert(key, project);
        Ok(())
    }

    async fn list_projects(
        &self,
        organization_id: OrganizationId,
        query: ProjectListQuery,
    ) -> AppResult<Vec<Project>> {
        let projects = self.projects.read().await;

        let mut values: Vec<Project> = projects
            .iter()
            .filter_map(|((stored_organization_id, _), project)| {
                (stored_organization_id == &organization_id && query.matches(project))
                    .then_some(project.clone())
            })
            .collect();
        values.sort_by(|left, right| {
            right
                .created_at()
                .cmp(&left.created_at())
                .then_with(|| left.details().name.cmp(&right.details().name))
        });

        Ok(values
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .collect())
    }

    async fn find_project(
        &self,
        organization_id: OrganizationId,
        project_id: ProjectId,
    ) -> AppResult<Option<Project>> {
        Ok(self
            .projects
            .read()
            .await
            .get(&(organization_id, project_id))
            .cloned())
    }

    async fn update_project(
        &self,
        organization_id: OrganizationId,
        project_id: ProjectId,
        details: ProjectDetails,
        status: ProjectStatus,
        expected_version: i64,
    ) -> AppResult<Project> {
        let clients = self.clients.read().await;
        let mut projects = self.projects.write().await;
        let project = projects
            .get_mut(&(organization_id, project_id))
            .filter(|project| project.version() == expected_version);

        let Some(project) = project else {
            let current = projects
                .get(&(organization_id, project_id))
                .map(Project::version);
            return Err(stale_or_missing(
                "project",
                project_id,
                current,
                expected_version,
            ));
        };

        if let Some(client_id) = details.client_id {
            ensure_live_client(&clients, organization_id, client_id)?;
        }

        project.apply_update(details, status, Utc::now())?;
        Ok(project.clone())
    }

    async fn update_project_status(
        &self,
        organization_id: OrganizationId,
        project_id: ProjectId,
        status: ProjectStatus,
        expected_version: i64,
    ) -> AppResult<Project> {
        let mut projects = self.projects.write().await;
        let project = projects
            .get_mut(&(organization_id, project_id))
            .filter(|project| project.version() == expected_version);

        let Some(project) = project else {
            let current = projects
                .get(&(organization_id, project_id))
                .map(Project::version);
            return Err(stale_or_missing(
                "project",
                project_id,
                current,
                expected_version,
            ));
        };

        let details = project.details().clone();
        project.apply_update(details, status, Utc::now())?;
        Ok(project.clone())
    }

    async fn delete_project(
        &self,
        organization_id: OrganizationId,
        project_id: ProjectId,
    ) -> AppResult<()> {
        self.projects
            .write()
            .await
            .remove(&(organization_id, project_id))
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("project '{project_id}' was not found")))
    }

    async fn list_projects_by_client(
        &self,
        organization_id: OrganizationId,
        client_id: ClientId,
    ) -> AppResult<Vec<Project>> {
        self.list_projects(
            organization_id,
            ProjectListQuery {
                client_id: Some(client_id),
                limit: usize::MAX,
                ..ProjectListQuery::default()
            },
        )
        .await
    }
}

#[async_trait]
impl ClientRepository for InMemoryWorkspaceRepository {
    async fn create_client(&self, organization_id: OrganizationId, client: Client) -> AppResult<()> {
        let key = (organization_id, client.id());
        let mut clients = self.clients.write().await;

        if clients.contains_key(&key) {
            return Err(AppError::Conflict(format!(
                "client '{}' already exists",
                client.id()
            )));
        }

        clients.insert(key, client);
        Ok(())
    }

    async fn list_clients(
        &self,
        organization_id: OrganizationId,
        query: ClientListQuery,
    ) -> AppResult<Vec<Client>> {
        let clients = self.clients.read().await;

        let mut values: Vec<Client> = clients
            .iter()
            .filter_map(|((stored_organization_id, _), client)| {
                (stored_organization_id == &organization_id
                    && !client.is_deleted()
                    && query.matches(client))
                .then_some(client.clone())
            })
            .collect();
        values.sort_by(|left, right| left.details().name.cmp(&right.details().name));

        Ok(values
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .collect())
    }

    async fn find_client(
        &self,
        organization_id: OrganizationId,
        client_id: ClientId,
    ) -> AppResult<Option<Client>> {
        Ok(self
            .clients
            .read()
            .await
            .get(&(organization_id, client_id))
            .filter(|client| !client.is_deleted())
            .cloned())
    }

    async fn update_client(
        &self,
        organization_id: OrganizationId,
        client_id: ClientId,
        details: ClientDetails,
        expected_version: i64,
    ) -> AppResult<Client> {
        let mut clients = self.clients.write().await;
        let client = clients
            .get_mut(&(organization_id, client_id))
            .filter(|client| !client.is_deleted() && client.version() == expected_version);

        let Some(client) = client else {
            let current = clients
                .get(&(organization_id, client_id))
                .filter(|client| !client.is_deleted())
                .map(Client::version);
            return Err(stale_or_missing(
                "client",
                client_id,
                current,
                expected_version,
            ));
        };

        client.apply_update(details, Utc::now())?;
        Ok(client.clone())
    }

    async fn soft_delete_client(
        &self,
        organization_id: OrganizationId,
        client_id: ClientId,
    ) -> AppResult<u64> {
        let mut clients = self.clients.write().await;
        let mut projects = self.projects.write().await;

        let client = clients
            .get_mut(&(organization_id, client_id))
            .filter(|client| !client.is_deleted())
            .ok_or_else(|| AppError::NotFound(format!("client '{client_id}' was not found")))?;
        client.mark_deleted(Utc::now());

        let mut detached = 0;
        for ((stored_organization_id, _), project) in projects.iter_mut() {
            if stored_organization_id == &organization_id && project.client_id() == Some(client_id)
            {
                project.detach_client();
                detached += 1;
            }
        }

        Ok(detached)
    }
}

fn ensure_live_client(
    clients: &HashMap<(OrganizationId, ClientId), Client>,
    organization_id: OrganizationId,
    client_id: ClientId,
) -> AppResult<()> {
    if clients
        .get(&(organization_id, client_id))
        .is_some_and(|client| !client.is_deleted())
    {
        return Ok(());
    }

    Err(missing_client_reference(client_id))
}
