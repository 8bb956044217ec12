use atrium_application::{CreateCustomRoleInput, UpdateCustomRoleInput};
use atrium_domain::CustomRole;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Incoming payload for custom role creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/create-custom-role-request.ts"
)]
pub struct CreateCustomRoleRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub permissions: Vec<String>,
}

/// Incoming payload replacing a custom role definition.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/update-custom-role-request.ts"
)]
pub struct UpdateCustomRoleRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub permissions: Vec<String>,
    pub expected_version: i64,
}

/// API representation of a custom role.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/custom-role-response.ts"
)]
pub struct CustomRoleResponse {
    pub role_id: String,
    pub name: String,
    pub description: Option<String>,
    pub permissions: Vec<String>,
    pub version: i64,
}

impl From<CreateCustomRoleRequest> for CreateCustomRoleInput {
    fn from(value: CreateCustomRoleRequest) -> Self {
        Self {
            name: value.name,
            description: value.description,
            permissions: value.permissions,
        }
    }
}

impl From<UpdateCustomRoleRequest> for UpdateCustomRoleInput {
    fn from(value: UpdateCustomRoleRequest) -> Self {
        Self {
            name: value.name,
            description: value.description,
            permissions: value.permissions,
            expected_version: value.expected_version,
        }
    }
}

impl From<CustomRole> for CustomRoleResponse {
    fn from(value: CustomRole) -> Self {
        Self {
            role_id: value.id().to_string(),
            name: value.name().as_str().to_owned(),
            description: value.description().map(ToOwned::to_owned),
            permissions: value
                .permissions()
                .iter()
                .map(|permission| permission.as_str().to_owned())
                .collect(),
            version: value.version(),
        }
    }
}
