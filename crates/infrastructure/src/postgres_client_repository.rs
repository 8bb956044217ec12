use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use atrium_application::{ClientListQuery, ClientRepository};
use atrium_core::{AppError, AppResult, OrganizationId};
use atrium_domain::{Client, ClientDetails, ClientId};

use crate::repository_errors::{database_error, stale_or_missing};

/// PostgreSQL-backed client repository.
#[derive(Clone)]
pub struct PostgresClientRepository {
    pool: PgPool,
}

impl PostgresClientRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ClientRow {
    id: Uuid,
    organization_id: Uuid,
    name: String,
    email: Option<String>,
    phone: Option<String>,
    version: i64,
    deleted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ClientRow> for Client {
    type Error = AppError;

    fn try_from(row: ClientRow) -> Result<Self, Self::Error> {
        Client::restore(
            ClientId::from_uuid(row.id),
            OrganizationId::from_uuid(row.organization_id),
            ClientDetails {
                name: row.name,
                email: row.email,
                phone: row.phone,
            },
            row.version,
            row.deleted_at,
            row.created_at,
            row.updated_at,
        )
    }
}

#[async_trait]
impl ClientRepository for PostgresClientRepository {
    async fn create_client(&self, organization_id: OrganizationId, client: Client) -> AppResult<()> {
        let details = client.details();
        sqlx::query(
            r#"
            INSERT INTO clients (
                id,
                organization_id,
                name,
                email,
                phone,
                version,
                created_at,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(client.id().as_uuid())
        .bind(organization_id.as_uuid())
        .bind(details.name.as_str())
        .bind(details.email.as_deref())
        .bind(details.phone.as_deref())
        .bind(client.version())
        .bind(client.created_at())
        .bind(client.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|error| database_error("failed to create client", error))?;

        Ok(())
    }

    async fn list_clients(
        &self,
        organization_id: OrganizationId,
        query: ClientListQuery,
    ) -> AppResult<Vec<Client>> {
        let search = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|search| !search.is_empty())
            .map(str::to_lowercase);
        let limit = i64::try_from(query.limit).unwrap_or(i64::MAX);
        let offset = i64::try_from(query.offset).unwrap_or(i64::MAX);

        let rows = sqlx::query_as::<_, ClientRow>(
            r#"
            SELECT
                id,
                organization_id,
                name,
                email,
                phone,
                version,
                deleted_at,
                created_at,
                updated_at
            FROM clients
            WHERE organization_id = $1
                AND deleted_at IS NULL
                AND (
                    $2::TEXT IS NULL
                    OR strpos(lower(name), $2) > 0
                    OR strpos(coalesce(email, ''), $2) > 0
                )
            ORDER BY name
            LIMIT $3
            OFFSET $4
            "#,
        )
        .bind(organization_id.as_uuid())
        .bind(search)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| database_error("failed to list clients", error))?;

        rows.into_iter().map(Client::try_from).collect()
    }

    async fn find_client(
        &self,
        organization_id: OrganizationId,
        client_id: ClientId,
    ) -> AppResult<Option<Client>> {
        let row = sqlx::query_as::<_, ClientRow>(
            r#"
            SELECT
                id,
                organization_id,
                name,
                email,
                phone,
                version,
                deleted_at,
                created_at,
                updated_at
            FROM clients
            WHERE organization_id = $1 AND id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(organization_id.as_uuid())
        .bind(client_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| database_error("failed to find client", error))?;

        row.map(Client::try_from).transpose()
    }

    async fn update_client(
        &self,
        organization_id: OrganizationId,
        client_id: ClientId,
        details: ClientDetails,
        expected_version: i64,
    ) -> AppResult<Client> {
        let details = details.normalized()?;
        let row = sqlx::query_as::<_, ClientRow>(
            r#"
            UPDATE clients
            SET
                name = $4,
                email = $5,
                phone = $6,
                version = version + 1,
                updated_at = now()
            WHERE organization_id = $1
                AND id = $2
                AND version = $3
                AND deleted_at IS NULL
            RETURNING
                id,
                organization_id,
                name,
                email,
                phone,
                version,
                deleted_at,
                created_at,
                updated_at
            "#,
        )
        .bind(organization_id.as_uuid())
        .bind(client_id.as_uuid())
        .bind(expected_version)
        .bind(details.name.as_str())
        .bind(details.email.as_deref())
        .bind(details.phone.as_deref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| database_error("failed to update client", error))?;

        if let Some(row) = row {
            return Client::try_from(row);
        }

        let current_version = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT version
            FROM clients
            WHERE organization_id = $1 AND id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(organization_id.as_uuid())
        .bind(client_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| database_error("failed to load client version", error))?;

        Err(stale_or_missing(
            "client",
            client_id,
            current_version,
            expected_version,
        ))
    }

    async fn soft_delete_client(
        &self,
        organization_id: OrganizationId,
        client_id: ClientId,
    ) -> AppResult<u64> {
        let mut transaction = self
            .pool
            .begin()
            .await
            .map_err(|error| database_error("failed to begin transaction", error))?;

        let deleted = sqlx::query(
            r#"
            UPDATE clients
            SET
                deleted_at = now(),
                version = version + 1,
                updated_at = now()
            WHERE organization_id = $1 AND id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(organization_id.as_uuid())
        .bind(client_id.as_uuid())
        .execute(&mut *transaction)
        .await
        .map_err(|error| database_error("failed to soft-delete client", error))?;

        if deleted.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "client '{client_id}' was not found"
            )));
        }

        let detached = sqlx::query(
            r#"
            UPDATE projects
            SET client_id = NULL
            WHERE organization_id = $1 AND client_id = $2
            "#,
        )
        .bind(organization_id.as_uuid())
        .bind(client_id.as_uuid())
        .execute(&mut *transaction)
        .await
        .map_err(|error| database_error("failed to detach client projects", error))?;

        transaction
            .commit()
            .await
            .map_err(|error| database_error("failed to commit transaction", error))?;

        Ok(detached.rows_affected())
    }
}
