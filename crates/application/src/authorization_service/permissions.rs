use atrium_domain::Principal;

use super::AuthorizationService;

impl AuthorizationService {
    /// Returns whether the principal holds a permission matching `required`.
    pub async fn has_permission(&self, principal: Option<&Principal>, required: &str) -> bool {
        self.resolve_permissions(principal).await.allows(required)
    }

    /// Returns whether at least one required permission is held.
    ///
    /// An empty requirement list never authorizes.
    pub async fn has_any_permission(
        &self,
        principal: Option<&Principal>,
        required: &[&str],
    ) -> bool {
        if principal.is_none() || required.is_empty() {
            return false;
        }

        let permissions = self.resolve_permissions(principal).await;
        required.iter().any(|value| permissions.allows(value))
    }

    /// Returns whether every required permission is held.
    ///
    /// An empty requirement list never authorizes, even for superadmins.
    pub async fn has_all_permissions(
        &self,
        principal: Option<&Principal>,
        required: &[&str],
    ) -> bool {
        if principal.is_none() || required.is_empty() {
            return false;
        }

        let permissions = self.resolve_permissions(principal).await;
        required.iter().all(|value| permissions.allows(value))
    }
}
