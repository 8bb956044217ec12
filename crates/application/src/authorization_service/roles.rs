use atrium_domain::{Principal, SystemRole};

use super::AuthorizationService;

impl AuthorizationService {
    /// Returns whether the principal's system role ranks at least `min_role`.
    ///
    /// Custom roles are ignored here: rank is a property of the system role.
    #[must_use]
    pub fn has_min_role(&self, principal: Option<&Principal>, min_role: SystemRole) -> bool {
        principal.is_some_and(|principal| principal.role().at_least(min_role))
    }
}
