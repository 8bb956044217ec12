use atrium_domain::permissions;
use tracing::info;

use super::*;

impl UserService {
    /// Returns the directory entry for a freshly authenticated identity.
    ///
    /// Used by login flows only; no permission is required.
    pub async fn ensure_user(&self, identity: &UserIdentity) -> AppResult<UserAccount> {
        let user = self.repository.ensure_user(identity).await?;

        info!(
            organization_id = %user.organization_id(),
            subject = user.subject(),
            role = %user.role(),
            "user signed in"
        );

        Ok(user)
    }

    /// Lists organization members.
    pub async fn list_users(&self, actor: &Principal) -> AppResult<Vec<UserAccount>> {
        self.guard
            .authorize(actor, permissions::USERS_VIEW)
            .await?;

        self.repository.list_users(actor.organization_id()).await
    }

    /// Returns one organization member.
    pub async fn get_user(&self, actor: &Principal, user_id: UserId) -> AppResult<UserAccount> {
        self.guard
            .authorize(actor, permissions::USERS_VIEW)
            .await?;

        self.load_user(actor, user_id).await
    }

    pub(super) async fn load_user(
        &self,
        actor: &Principal,
        user_id: UserId,
    ) -> AppResult<UserAccount> {
        let user = self
            .repository
            .find_user(actor.organization_id(), user_id)
            .await?;

        self.guard.require_found("user", user_id, user)
    }
}
