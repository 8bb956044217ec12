use std::sync::Arc;

use atrium_core::{AppError, AppResult};
use atrium_domain::{AuditAction, ClientId, Principal, Project};

use crate::{AuditEvent, AuditRepository, ClientRepository, LifecycleGuard, ProjectRepository};

mod records;
mod updates;


/// Application service for project management.
#[derive(Clone)]
pub struct ProjectService {
    guard: LifecycleGuard,
    repository: Arc<dyn ProjectRepository>,
    client_repository: Arc<dyn ClientRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl ProjectService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        guard: LifecycleGuard,
        repository: Arc<dyn ProjectRepository>,
        client_repository: Arc<dyn ClientRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            guard,
            repository,
            client_repository,
            audit_repository,
        }
    }

    async fn ensure_client_reference(
        &self,
        actor: &Principal,
        client_id: ClientId,
    ) -> AppResult<()> {
        let client = self
            .client_repository
            .find_client(actor.organization_id(), client_id)
            .await?;

        if client.is_none() {
            return Err(AppError::ReferenceNotFound(format!(
                "client '{client_id}' was not found"
            )));
        }

        Ok(())
    }

    async fn append_project_event(
        &self,
        actor: &Principal,
        action: AuditAction,
        project: &Project,
        detail: String,
    ) -> AppResult<()> {
        self.audit_repository
            .append_event(AuditEvent {
                organization_id: actor.organization_id(),
                subject: actor.subject().to_owned(),
                action,
                resource_type: "project".to_owned(),
                resource_id: project.id().to_string(),
                detail: Some(detail),
            })
            .await
    }
}
