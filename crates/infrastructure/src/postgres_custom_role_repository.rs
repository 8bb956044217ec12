use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use atrium_application::{AuthorizationRepository, CustomRoleRepository};
use atrium_core::{AppError, AppResult, OrganizationId};
use atrium_domain::{CustomRole, CustomRoleId, CustomRoleName, Permission};

use crate::repository_errors::{database_error, is_unique_violation, stale_or_missing};

/// PostgreSQL-backed custom role repository.
///
/// Also serves custom role lookups for permission resolution.
#[derive(Clone)]
pub struct PostgresCustomRoleRepository {
    pool: PgPool,
}

impl PostgresCustomRoleRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct CustomRoleRow {
    id: Uuid,
    organization_id: Uuid,
    name: String,
    description: Option<String>,
    permissions: Vec<String>,
    version: i64,
}

impl TryFrom<CustomRoleRow> for CustomRole {
    type Error = AppError;

    fn try_from(row: CustomRoleRow) -> Result<Self, Self::Error> {
        let permissions = row
            .permissions
            .iter()
            .map(|permission| {
                Permission::new(permission.as_str()).map_err(|error| {
                    AppError::Internal(format!(
                        "failed to decode permission '{permission}' of custom role '{}': {error}",
                        row.id
                    ))
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        CustomRole::new(
            CustomRoleId::from_uuid(row.id),
            OrganizationId::from_uuid(row.organization_id),
            CustomRoleName::new(row.name)?,
            row.description,
            permissions,
            row.version,
        )
    }
}

fn permission_values(custom_role: &CustomRole) -> Vec<String> {
    custom_role
        .permissions()
        .iter()
        .map(|permission| permission.as_str().to_owned())
        .collect()
}

fn map_name_conflict(error: sqlx::Error, custom_role: &CustomRole) -> AppError {
    if is_unique_violation(&error) {
        return AppError::Conflict(format!(
            "custom role '{}' already exists",
            custom_role.name().as_str()
        ));
    }

    database_error("failed to save custom role", error)
}

#[async_trait]
impl AuthorizationRepository for PostgresCustomRoleRepository {
    async fn find_custom_role(
        &self,
        organization_id: OrganizationId,
        custom_role_id: CustomRoleId,
    ) -> AppResult<Option<CustomRole>> {
        let row = sqlx::query_as::<_, CustomRoleRow>(
            r#"
            SELECT id, organization_id, name, description, permissions, version
            FROM custom_roles
            WHERE organization_id = $1 AND id = $2
            "#,
        )
        .bind(organization_id.as_uuid())
        .bind(custom_role_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| database_error("failed to find custom role", error))?;

        row.map(CustomRole::try_from).transpose()
    }
}

#[async_trait]
impl CustomRoleRepository for PostgresCustomRoleRepository {
    async fn list_custom_roles(
        &self,
        organization_id: OrganizationId,
    ) -> AppResult<Vec<CustomRole>> {
        let rows = sqlx::query_as::<_, CustomRoleRow>(
            r#"
            SELECT id, organization_id, name, description, permissions, version
            FROM custom_roles
            WHERE organization_id = $1
            ORDER BY name
            "#,
        )
        .bind(organization_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| database_error("failed to list custom roles", error))?;

        rows.into_iter().map(CustomRole::try_from).collect()
    }

    async fn create_custom_role(
        &self,
        organization_id: OrganizationId,
        custom_role: CustomRole,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO custom_roles (
                id,
                organization_id,
                name,
                description,
                permissions,
                version
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(custom_role.id().as_uuid())
        .bind(organization_id.as_uuid())
        .bind(custom_role.name().as_str())
        .bind(custom_role.description())
        .bind(permission_values(&custom_role))
        .bind(custom_role.version())
        .execute(&self.pool)
        .await
        .map_err(|error| map_name_conflict(error, &custom_role))?;

        Ok(())
    }

    async fn update_custom_role(
        &self,
        organization_id: OrganizationId,
        custom_role: CustomRole,
        expected_version: i64,
    ) -> AppResult<CustomRole> {
        let row = sqlx::query_as::<_, CustomRoleRow>(
            r#"
            UPDATE custom_roles
            SET
                name = $4,
                description = $5,
                permissions = $6,
                version = version + 1,
                updated_at = now()
            WHERE organization_id = $1 AND id = $2 AND version = $3
            RETURNING id, organization_id, name, description, permissions, version
            "#,
        )
        .bind(organization_id.as_uuid())
        .bind(custom_role.id().as_uuid())
        .bind(expected_version)
        .bind(custom_role.name().as_str())
        .bind(custom_role.description())
        .bind(permission_values(&custom_role))
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| map_name_conflict(error, &custom_role))?;

        if let Some(row) = row {
            return CustomRole::try_from(row);
        }

        let current_version = self
            .find_custom_role(organization_id, custom_role.id())
            .await?
            .map(|current| current.version());

        Err(stale_or_missing(
            "custom role",
            custom_role.id(),
            current_version,
            expected_version,
        ))
    }

    async fn delete_custom_role(
        &self,
        organization_id: OrganizationId,
        custom_role_id: CustomRoleId,
    ) -> AppResult<()> {
        let mut transaction = self
            .pool
            .begin()
            .await
            .map_err(|error| database_error("failed to begin transaction", error))?;

        sqlx::query(
            r#"
            UPDATE users
            SET custom_role_id = NULL, version = version + 1
            WHERE organization_id = $1 AND custom_role_id = $2
            "#,
        )
        .bind(organization_id.as_uuid())
        .bind(custom_role_id.as_uuid())
        .execute(&mut *transaction)
        .await
        .map_err(|error| database_error("failed to clear custom role assignments", error))?;

        let deleted = sqlx::query(
            r#"
            DELETE FROM custom_roles
            WHERE organization_id = $1 AND id = $2
            "#,
        )
        .bind(organization_id.as_uuid())
        .bind(custom_role_id.as_uuid())
        .execute(&mut *transaction)
        .await
        .map_err(|error| database_error("failed to delete custom role", error))?;

        if deleted.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "custom role '{custom_role_id}' was not found"
            )));
        }

        transaction
            .commit()
            .await
            .map_err(|error| database_error("failed to commit transaction", error))?;

        Ok(())
    }
}
