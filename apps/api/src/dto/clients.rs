use atrium_application::{ClientListQuery, DEFAULT_CLIENT_PAGE_SIZE, UpdateClientInput};
use atrium_domain::{Client, ClientDetails};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::common::timestamp;

/// Incoming payload for client creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/create-client-request.ts"
)]
pub struct CreateClientRequest {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Incoming payload for client edits.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/update-client-request.ts"
)]
pub struct UpdateClientRequest {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    pub expected_version: i64,
}

/// Query string accepted by the client listing.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/client-list-params.ts"
)]
pub struct ClientListParams {
    pub search: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// API representation of a client.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/client-response.ts"
)]
pub struct ClientResponse {
    pub client_id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub version: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Result of a client soft delete.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/delete-client-response.ts"
)]
pub struct DeleteClientResponse {
    /// Projects whose client reference was cleared.
    pub detached_project_count: u64,
}

impl From<CreateClientRequest> for ClientDetails {
    fn from(value: CreateClientRequest) -> Self {
        Self {
            name: value.name,
            email: value.email,
            phone: value.phone,
        }
    }
}

impl From<UpdateClientRequest> for UpdateClientInput {
    fn from(value: UpdateClientRequest) -> Self {
        Self {
            details: ClientDetails {
                name: value.name,
                email: value.email,
                phone: value.phone,
            },
            expected_version: value.expected_version,
        }
    }
}

impl From<ClientListParams> for ClientListQuery {
    fn from(value: ClientListParams) -> Self {
        Self {
            search: value.search.filter(|search| !search.trim().is_empty()),
            limit: value.limit.unwrap_or(DEFAULT_CLIENT_PAGE_SIZE),
            offset: value.offset.unwrap_or_default(),
        }
    }
}

impl From<Client> for ClientResponse {
    fn from(value: Client) -> Self {
        let details = value.details();

        Self {
            client_id: value.id().to_string(),
            name: details.name.clone(),
            email: details.email.clone(),
            phone: details.phone.clone(),
            version: value.version(),
            created_at: timestamp(value.created_at()),
            updated_at: timestamp(value.updated_at()),
        }
    }
}
