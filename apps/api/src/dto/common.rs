use atrium_core::{AppError, AppResult};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use ts_rs::TS;
use uuid::Uuid;

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Parses a transport UUID, naming the offending field on failure.
pub fn parse_uuid(field: &str, value: &str) -> AppResult<Uuid> {
    Uuid::parse_str(value.trim())
        .map_err(|error| AppError::Validation(format!("invalid {field} '{value}': {error}")))
}

pub(super) fn parse_optional_uuid(field: &str, value: Option<&str>) -> AppResult<Option<Uuid>> {
    value
        .filter(|value| !value.trim().is_empty())
        .map(|value| parse_uuid(field, value))
        .transpose()
}

/// Parses an optional `YYYY-MM-DD` date.
pub(super) fn parse_optional_date(field: &str, value: Option<&str>) -> AppResult<Option<NaiveDate>> {
    value
        .filter(|value| !value.trim().is_empty())
        .map(|value| {
            value.trim().parse::<NaiveDate>().map_err(|error| {
                AppError::Validation(format!("invalid {field} '{value}': {error}"))
            })
        })
        .transpose()
}

pub(super) fn timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339()
}

#[cfg(test)]
mod tests {
    use atrium_core::AppError;

    use super::{parse_optional_date, parse_optional_uuid};

    #[test]
    fn blank_optional_values_are_absent() {
        assert!(matches!(parse_optional_uuid("client_id", Some("  ")), Ok(None)));
        assert!(matches!(parse_optional_date("start_date", Some("")), Ok(None)));
    }

    #[test]
    fn malformed_values_are_validation_errors() {
        assert!(matches!(
            parse_optional_uuid("client_id", Some("acme")),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            parse_optional_date("start_date", Some("2026-02-30")),
            Err(AppError::Validation(_))
        ));
        assert!(parse_optional_date("start_date", Some("2026-02-28")).is_ok_and(|date| date.is_some()));
    }
}
