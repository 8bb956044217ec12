use std::sync::Arc;

use atrium_core::AppResult;
use atrium_domain::{AuditAction, Client, ClientDetails, ClientId, Principal, permissions};
use chrono::Utc;
use tracing::info;

use crate::client_ports::{
    ClientListQuery, ClientRepository, MAX_CLIENT_PAGE_SIZE, UpdateClientInput,
};
use crate::{AuditEvent, AuditRepository, LifecycleGuard};


/// Application service for client management.
#[derive(Clone)]
pub struct ClientService {
    guard: LifecycleGuard,
    repository: Arc<dyn ClientRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl ClientService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        guard: LifecycleGuard,
        repository: Arc<dyn ClientRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            guard,
            repository,
            audit_repository,
        }
    }

    /// Creates a client at version 1.
    pub async fn create_client(
        &self,
        actor: &Principal,
        details: ClientDetails,
    ) -> AppResult<Client> {
        self.guard
            .authorize(actor, permissions::CLIENTS_CREATE)
            .await?;

        let client = Client::create(actor.organization_id(), details, Utc::now())?;
        self.repository
            .create_client(actor.organization_id(), client.clone())
            .await?;

        Ok(client)
    }

    /// Lists live clients.
    pub async fn list_clients(
        &self,
        actor: &Principal,
        query: ClientListQuery,
    ) -> AppResult<Vec<Client>> {
        self.guard
            .authorize(actor, permissions::CLIENTS_VIEW)
            .await?;

        let query = ClientListQuery {
            limit: query.limit.clamp(1, MAX_CLIENT_PAGE_SIZE),
            ..query
        };

        self.repository
            .list_clients(actor.organization_id(), query)
            .await
    }

    /// Returns one live client.
    pub async fn get_client(&self, actor: &Principal, client_id: ClientId) -> AppResult<Client> {
        self.guard
            .authorize(actor, permissions::CLIENTS_VIEW)
            .await?;

        self.load_client(actor, client_id).await
    }

    /// Replaces client attributes when the caller's version is current.
    pub async fn update_client(
        &self,
        actor: &Principal,
        client_id: ClientId,
        input: UpdateClientInput,
    ) -> AppResult<Client> {
        self.guard
            .authorize(actor, permissions::CLIENTS_EDIT)
            .await?;

        let details = input.details.normalized()?;
        let current = self.load_client(actor, client_id).await?;
        self.guard
            .ensure_version("client", current.version(), input.expected_version)?;

        self.repository
            .update_client(
                actor.organization_id(),
                client_id,
                details,
                input.expected_version,
            )
            .await
    }

    /// Soft-deletes a client and detaches its projects.
    ///
    /// Returns the number of projects whose client reference was cleared.
    pub async fn delete_client(&self, actor: &Principal, client_id: ClientId) -> AppResult<u64> {
        self.guard
            .authorize(actor, permissions::CLIENTS_DELETE)
            .await?;

        let client = self.load_client(actor, client_id).await?;
        let detached = self
            .repository
            .soft_delete_client(actor.organization_id(), client_id)
            .await?;

        info!(
            organization_id = %actor.organization_id(),
            client_id = %client_id,
            detached_projects = detached,
            "client soft-deleted"
        );

        self.audit_repository
            .append_event(AuditEvent {
                organization_id: actor.organization_id(),
                subject: actor.subject().to_owned(),
                action: AuditAction::ClientDeleted,
                resource_type: "client".to_owned(),
                resource_id: client_id.to_string(),
                detail: Some(format!(
                    "deleted client '{}' and detached {detached} project(s)",
                    client.details().name
                )),
            })
            .await?;

        Ok(detached)
    }

    async fn load_client(&self, actor: &Principal, client_id: ClientId) -> AppResult<Client> {
        let client = self
            .repository
            .find_client(actor.organization_id(), client_id)
            .await?;

        self.guard.require_found("client", client_id, client)
    }
}
