use async_trait::async_trait;
use atrium_core::{AppResult, OrganizationId};
use atrium_domain::{Client, ClientDetails, ClientId};

/// Default page size for client listings.
pub const DEFAULT_CLIENT_PAGE_SIZE: usize = 50;
/// Largest page size accepted for client listings.
pub const MAX_CLIENT_PAGE_SIZE: usize = 200;

/// Query inputs for client listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientListQuery {
    /// Case-insensitive match on name or email.
    pub search: Option<String>,
    /// Maximum rows returned.
    pub limit: usize,
    /// Number of rows skipped for offset pagination.
    pub offset: usize,
}

impl Default for ClientListQuery {
    fn default() -> Self {
        Self {
            search: None,
            limit: DEFAULT_CLIENT_PAGE_SIZE,
            offset: 0,
        }
    }
}

impl ClientListQuery {
    /// Returns whether a client satisfies the search filter.
    #[must_use]
    pub fn matches(&self, client: &Client) -> bool {
        let Some(search) = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|search| !search.is_empty())
        else {
            return true;
        };

        let needle = search.to_lowercase();
        let details = client.details();
        details.name.to_lowercase().contains(&needle)
            || details
                .email
                .as_deref()
                .is_some_and(|email| email.contains(&needle))
    }
}

/// Input payload for client updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateClientInput {
    /// Replacement attributes.
    pub details: ClientDetails,
    /// Version the caller last read.
    pub expected_version: i64,
}

/// Repository port for organization-scoped client storage.
///
/// Soft-deleted clients are invisible to every read.
#[async_trait]
pub trait ClientRepository: Send + Sync {
    /// Persists a new client.
    async fn create_client(&self, organization_id: OrganizationId, client: Client)
    -> AppResult<()>;

    /// Lists live clients ordered by name.
    async fn list_clients(
        &self,
        organization_id: OrganizationId,
        query: ClientListQuery,
    ) -> AppResult<Vec<Client>>;

    /// Finds a live client in the organization scope.
    async fn find_client(
        &self,
        organization_id: OrganizationId,
        client_id: ClientId,
    ) -> AppResult<Option<Client>>;

    /// Replaces attributes when the version still matches.
    async fn update_client(
        &self,
        organization_id: OrganizationId,
        client_id: ClientId,
        details: ClientDetails,
        expected_version: i64,
    ) -> AppResult<Client>;

    /// Soft-deletes a client and clears project references to it.
    ///
    /// Returns the number of projects whose reference was cleared.
    async fn soft_delete_client(
        &self,
        organization_id: OrganizationId,
        client_id: ClientId,
    ) -> AppResult<u64>;
}
