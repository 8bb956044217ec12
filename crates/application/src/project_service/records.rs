use atrium_domain::{ClientId, Project, ProjectId, permissions};
use chrono::Utc;

use crate::project_ports::{CreateProjectInput, MAX_PROJECT_PAGE_SIZE, ProjectListQuery};

use super::*;

impl ProjectService {
    /// Creates a project in `Planning` and emits an audit event.
    pub async fn create_project(
        &self,
        actor: &Principal,
        input: CreateProjectInput,
    ) -> AppResult<Project> {
        self.guard
            .authorize(actor, permissions::PROJECTS_CREATE)
            .await?;

        let project = Project::create(actor.organization_id(), input.details, Utc::now())?;
        if let Some(client_id) = project.client_id() {
            self.ensure_client_reference(actor, client_id).await?;
        }

        self.repository
            .create_project(actor.organization_id(), project.clone())
            .await?;

        self.append_project_event(
            actor,
            AuditAction::ProjectCreated,
            &project,
            format!("created project '{}'", project.details().name),
        )
        .await?;

        Ok(project)
    }

    /// Lists projects visible to the actor.
    pub async fn list_projects(
        &self,
        actor: &Principal,
        query: ProjectListQuery,
    ) -> AppResult<Vec<Project>> {
        self.guard
            .authorize(actor, permissions::PROJECTS_VIEW)
            .await?;

        let query = ProjectListQuery {
            limit: query.limit.clamp(1, MAX_PROJECT_PAGE_SIZE),
            ..query
        };

        self.repository
            .list_projects(actor.organization_id(), query)
            .await
    }

    /// Returns one project.
    pub async fn get_project(&self, actor: &Principal, project_id: ProjectId) -> AppResult<Project> {
        self.guard
            .authorize(actor, permissions::PROJECTS_VIEW)
            .await?;

        let project = self
            .repository
            .find_project(actor.organization_id(), project_id)
            .await?;

        self.guard.require_found("project", project_id, project)
    }

    /// Permanently removes a project and emits an audit event.
    pub async fn delete_project(&self, actor: &Principal, project_id: ProjectId) -> AppResult<()> {
        self.guard
            .authorize(actor, permissions::PROJECTS_DELETE)
            .await?;

        let project = self
            .repository
            .find_project(actor.organization_id(), project_id)
            .await?;
        let project = self.guard.require_found("project", project_id, project)?;

        self.repository
            .delete_project(actor.organization_id(), project_id)
            .await?;

        self.append_project_event(
            actor,
            AuditAction::ProjectDeleted,
            &project,
            format!("deleted project '{}'", project.details().name),
        )
        .await
    }

    /// Lists the projects referencing one client.
    pub async fn list_projects_by_client(
        &self,
        actor: &Principal,
        client_id: ClientId,
    ) -> AppResult<Vec<Project>> {
        self.guard
            .authorize(actor, permissions::PROJECTS_VIEW)
            .await?;

        let client = self
            .client_repository
            .find_client(actor.organization_id(), client_id)
            .await?;
        self.guard.require_found("client", client_id, client)?;

        self.repository
            .list_projects_by_client(actor.organization_id(), client_id)
            .await
    }
}
