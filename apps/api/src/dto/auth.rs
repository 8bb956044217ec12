use atrium_core::UserIdentity;
use atrium_domain::{PermissionSet, Principal};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Development login payload.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/bootstrap-request.ts"
)]
pub struct BootstrapRequest {
    pub subject: String,
    pub token: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Target organization; falls back to the configured default.
    #[serde(default)]
    pub organization_id: Option<String>,
}

/// API representation of the authenticated principal.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/session-principal-response.ts"
)]
pub struct SessionPrincipalResponse {
    pub subject: String,
    pub display_name: String,
    pub email: Option<String>,
    pub organization_id: String,
    pub role: String,
    pub custom_role_id: Option<String>,
    /// Effective permissions; `["*"]` for unrestricted principals.
    pub permissions: Vec<String>,
}

impl SessionPrincipalResponse {
    #[must_use]
    pub fn new(identity: &UserIdentity, principal: &Principal, permissions: &PermissionSet) -> Self {
        Self {
            subject: principal.subject().to_owned(),
            display_name: identity.display_name().to_owned(),
            email: identity.email().map(ToOwned::to_owned),
            organization_id: principal.organization_id().to_string(),
            role: principal.role().as_str().to_owned(),
            custom_role_id: principal.custom_role_id().map(|id| id.to_string()),
            permissions: permissions
                .iter()
                .map(|permission| permission.as_str().to_owned())
                .collect(),
        }
    }
}
