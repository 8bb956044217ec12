use std::fmt::Display;

use atrium_core::{AppError, AppResult};
use atrium_domain::{LifecycleStatus, Principal, validate_transition};
use tracing::warn;

use crate::AuthorizationService;

/// Write-path gatekeeper for status-bearing, versioned entities.
///
/// Each gate is independent: callers run authorization, existence,
/// transition and version checks in that order and stop at the first
/// failure, so a stale request with an illegal transition reports the
/// transition.
#[derive(Clone)]
pub struct LifecycleGuard {
    authorization_service: AuthorizationService,
}

impl LifecycleGuard {
    /// Creates a guard on top of the authorization service.
    #[must_use]
    pub fn new(authorization_service: AuthorizationService) -> Self {
        Self {
            authorization_service,
        }
    }

    /// Returns the underlying authorization service.
    #[must_use]
    pub fn authorization_service(&self) -> &AuthorizationService {
        &self.authorization_service
    }

    /// Ensures the principal may perform the operation.
    pub async fn authorize(&self, principal: &Principal, required: &str) -> AppResult<()> {
        self.authorization_service
            .require_permission(principal, required)
            .await
    }

    /// Returns whether `next` may follow `current`.
    #[must_use]
    pub fn validate_transition<S: LifecycleStatus>(&self, current: S, next: S) -> bool {
        validate_transition(current, next)
    }

    /// Maps an organization-scoped lookup miss to `NotFound`.
    ///
    /// Rows of other organizations never reach this point, so foreign ids
    /// are indistinguishable from unknown ones.
    pub fn require_found<T>(
        &self,
        resource: &str,
        id: impl Display,
        value: Option<T>,
    ) -> AppResult<T> {
        value.ok_or_else(|| AppError::NotFound(format!("{resource} '{id}' was not found")))
    }

    /// Rejects transitions outside the status table.
    pub fn ensure_transition<S: LifecycleStatus>(
        &self,
        resource: &str,
        current: S,
        next: S,
    ) -> AppResult<()> {
        if validate_transition(current, next) {
            return Ok(());
        }

        Err(AppError::InvalidTransition(format!(
            "{resource} cannot move from '{}' to '{}'",
            current.as_str(),
            next.as_str()
        )))
    }

    /// Rejects writes based on a stale read.
    pub fn ensure_version(&self, resource: &str, current: i64, expected: i64) -> AppResult<()> {
        if current == expected {
            return Ok(());
        }

        warn!(
            resource,
            current_version = current,
            expected_version = expected,
            "rejecting write based on stale version"
        );

        Err(AppError::VersionConflict(format!(
            "{resource} was modified concurrently (expected version {expected}, current version {current})"
        )))
    }
}
