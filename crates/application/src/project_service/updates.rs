use atrium_domain::{LifecycleStatus, ProjectId, permissions};

use crate::project_ports::{UpdateProjectInput, UpdateProjectStatusInput};

use super::*;

impl ProjectService {
    /// Replaces project attributes, optionally changing its status.
    ///
    /// Gates run in order: existence, transition, version, client reference.
    pub async fn update_project(
        &self,
        actor: &Principal,
        project_id: ProjectId,
        input: UpdateProjectInput,
    ) -> AppResult<Project> {
        self.guard
            .authorize(actor, permissions::PROJECTS_EDIT)
            .await?;

        let details = input.details.normalized()?;
        let current = self.load_project(actor, project_id).await?;
        let next_status = input.status.unwrap_or(current.status());

        self.guard
            .ensure_transition("project", current.status(), next_status)?;
        self.guard
            .ensure_version("project", current.version(), input.expected_version)?;

        if let Some(client_id) = details.client_id
            && current.client_id() != Some(client_id)
        {
            self.ensure_client_reference(actor, client_id).await?;
        }

        let updated = self
            .repository
            .update_project(
                actor.organization_id(),
                project_id,
                details,
                next_status,
                input.expected_version,
            )
            .await?;

        if current.status() != updated.status() {
            self.append_status_change_event(actor, &current, &updated)
                .await?;
        }

        Ok(updated)
    }

    /// Changes only the project status.
    pub async fn update_project_status(
        &self,
        actor: &Principal,
        project_id: ProjectId,
        input: UpdateProjectStatusInput,
    ) -> AppResult<Project> {
        self.guard
            .authorize(actor, permissions::PROJECTS_EDIT)
            .await?;

        let current = self.load_project(actor, project_id).await?;

        self.guard
            .ensure_transition("project", current.status(), input.status)?;
        self.guard
            .ensure_version("project", current.version(), input.expected_version)?;

        let updated = self
            .repository
            .update_project_status(
                actor.organization_id(),
                project_id,
                input.status,
                input.expected_version,
            )
            .await?;

        if current.status() != updated.status() {
            self.append_status_change_event(actor, &current, &updated)
                .await?;
        }

        Ok(updated)
    }

    async fn load_project(&self, actor: &Principal, project_id: ProjectId) -> AppResult<Project> {
        let project = self
            .repository
            .find_project(actor.organization_id(), project_id)
            .await?;

        self.guard.require_found("project", project_id, project)
    }

    async fn append_status_change_event(
        &self,
        actor: &Principal,
        previous: &Project,
        updated: &Project,
    ) -> AppResult<()> {
        self.append_project_event(
            actor,
            AuditAction::ProjectStatusChanged,
            updated,
            format!(
                "changed project status from '{}' to '{}'",
                previous.status().as_str(),
                updated.status().as_str()
            ),
        )
        .await
    }
}
