use std::str::FromStr;

use atrium_application::AssignRoleInput;
use atrium_core::AppError;
use atrium_domain::{CustomRoleId, SystemRole, UserAccount};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::common::{parse_optional_uuid, timestamp};

/// Incoming payload for a user's role assignment.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/assign-user-role-request.ts"
)]
pub struct AssignUserRoleRequest {
    /// One of `member`, `admin` or `superadmin`.
    pub role: String,
    /// Custom role replacing the system role defaults; `null` clears it.
    #[serde(default)]
    pub custom_role_id: Option<String>,
    pub expected_version: i64,
}

/// API representation of an organization member.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/user-response.ts"
)]
pub struct UserResponse {
    pub user_id: String,
    pub subject: String,
    pub display_name: String,
    pub email: Option<String>,
    pub role: String,
    pub custom_role_id: Option<String>,
    pub version: i64,
    pub created_at: String,
}

impl TryFrom<AssignUserRoleRequest> for AssignRoleInput {
    type Error = AppError;

    fn try_from(value: AssignUserRoleRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            role: SystemRole::from_str(value.role.trim())?,
            custom_role_id: parse_optional_uuid("custom_role_id", value.custom_role_id.as_deref())?
                .map(CustomRoleId::from_uuid),
            expected_version: value.expected_version,
        })
    }
}

impl From<UserAccount> for UserResponse {
    fn from(value: UserAccount) -> Self {
        Self {
            user_id: value.id().to_string(),
            subject: value.subject().to_owned(),
            display_name: value.display_name().to_owned(),
            email: value.email().map(|email| email.as_str().to_owned()),
            role: value.role().as_str().to_owned(),
            custom_role_id: value.custom_role_id().map(|id| id.to_string()),
            version: value.version(),
            created_at: timestamp(value.created_at()),
        }
    }
}
