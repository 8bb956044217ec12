use atrium_core::AppError;

const UNIQUE_VIOLATION: &str = "23505";

/// Maps a driver error onto the application error taxonomy.
///
/// Transport and pool failures become `ConnectionFailed` so callers can
/// retry; everything else is an internal fault.
pub(crate) fn database_error(context: &str, error: sqlx::Error) -> AppError {
    match error {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => {
            AppError::ConnectionFailed(format!("{context}: {error}"))
        }
        _ => AppError::Internal(format!("{context}: {error}")),
    }
}

/// Returns whether the error is a unique constraint violation.
pub(crate) fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(
        error,
        sqlx::Error::Database(database_error)
            if database_error.code().as_deref() == Some(UNIQUE_VIOLATION)
    )
}

/// Resolves why a conditional `WHERE version = $n` write touched no row.
pub(crate) fn stale_or_missing(
    resource: &str,
    id: impl std::fmt::Display,
    current_version: Option<i64>,
    expected_version: i64,
) -> AppError {
    match current_version {
        Some(current_version) => AppError::VersionConflict(format!(
            "{resource} '{id}' was modified concurrently (expected version {expected_version}, current version {current_version})"
        )),
        None => AppError::NotFound(format!("{resource} '{id}' was not found")),
    }
}

/// Reports a client reference that no longer resolves at write time.
pub(crate) fn missing_client_reference(client_id: impl std::fmt::Display) -> AppError {
    AppError::ReferenceNotFound(format!("client '{client_id}' was not found"))
}
