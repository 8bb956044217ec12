use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use atrium_application::{ProjectListQuery, ProjectRepository};
use atrium_core::{AppError, AppResult, OrganizationId};
use atrium_domain::{
    ClientId, LifecycleStatus, Project, ProjectDetails, ProjectId, ProjectStatus,
};

use crate::repository_errors::{database_error, missing_client_reference, stale_or_missing};

#[cfg(test)]
mod tests;

/// PostgreSQL-backed project repository.
#[derive(Clone)]
pub struct PostgresProjectRepository {
    pool: PgPool,
}

impl PostgresProjectRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn current_version(
        &self,
        organization_id: OrganizationId,
        project_id: ProjectId,
    ) -> AppResult<Option<i64>> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT version
            FROM projects
            WHERE organization_id = $1 AND id = $2
            "#,
        )
        .bind(organization_id.as_uuid())
        .bind(project_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| database_error("failed to load project version", error))
    }
}

#[derive(Debug, FromRow)]
struct ProjectRow {
    id: Uuid,
    organization_id: Uuid,
    client_id: Option<Uuid>,
    name: String,
    description: Option<String>,
    status: String,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    budget_cents: Option<i64>,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProjectRow> for Project {
    type Error = AppError;

    fn try_from(row: ProjectRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<ProjectStatus>().map_err(|error| {
            AppError::Internal(format!(
                "failed to decode status of project '{}': {error}",
                row.id
            ))
        })?;

        Project::restore(
            ProjectId::from_uuid(row.id),
            OrganizationId::from_uuid(row.organization_id),
            ProjectDetails {
                name: row.name,
                description: row.description,
                client_id: row.client_id.map(ClientId::from_uuid),
                start_date: row.start_date,
                end_date: row.end_date,
                budget_cents: row.budget_cents,
            },
            status,
            row.version,
            row.created_at,
            row.updated_at,
        )
    }
}

fn rows_to_projects(rows: Vec<ProjectRow>) -> AppResult<Vec<Project>> {
    rows.into_iter().map(Project::try_from).collect()
}

#[async_trait]
impl ProjectRepository for PostgresProjectRepository {
    async fn create_project(
        &self,
        organization_id: OrganizationId,
        project: Project,
    ) -> AppResult<()> {
        let details = project.details();
        let inserted = sqlx::query(
            r#"
            INSERT INTO projects (
                id,
                organization_id,
                client_id,
                name,
                description,
                status,
                start_date,
                end_date,
                budget_cents,
                version,
                created_at,
                updated_at
            )
            SELECT $1, $2, $3::UUID, $4, $5, $6, $7, $8, $9, $10, $11, $12
            WHERE $3::UUID IS NULL OR EXISTS (
                SELECT 1
                FROM clients
                WHERE organization_id = $2 AND id = $3::UUID AND deleted_at IS NULL
                FOR SHARE
            )
            "#,
        )
        .bind(project.id().as_uuid())
        .bind(organization_id.as_uuid())
        .bind(details.client_id.map(|client_id| client_id.as_uuid()))
        .bind(details.name.as_str())
        .bind(details.description.as_deref())
        .bind(project.status().as_str())
        .bind(details.start_date)
        .bind(details.end_date)
        .bind(details.budget_cents)
        .bind(project.version())
        .bind(project.created_at())
        .bind(project.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|error| database_error("failed to create project", error))?;

        if inserted.rows_affected() == 0
            && let Some(client_id) = details.client_id
        {
            return Err(missing_client_reference(client_id));
        }

        Ok(())
    }

    async fn list_projects(
        &self,
        organization_id: OrganizationId,
        query: ProjectListQuery,
    ) -> AppResult<Vec<Project>> {
        let search = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|search| !search.is_empty())
            .map(str::to_lowercase);
        let limit = i64::try_from(query.limit).unwrap_or(i64::MAX);
        let offset = i64::try_from(query.offset).unwrap_or(i64::MAX);

        let rows = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT
                id,
                organization_id,
                client_id,
                name,
                description,
                status,
                start_date,
                end_date,
                budget_cents,
                version,
                created_at,
                updated_at
            FROM projects
            WHERE organization_id = $1
                AND (
                    $2::TEXT IS NULL
                    OR strpos(lower(name), $2) > 0
                    OR strpos(lower(coalesce(description, '')), $2) > 0
                )
                AND ($3::UUID IS NULL OR client_id = $3)
                AND ($4::TEXT IS NULL OR status = $4)
                AND ($5::DATE IS NULL OR start_date >= $5)
                AND ($6::DATE IS NULL OR end_date <= $6)
            ORDER BY created_at DESC, name
            LIMIT $7
            OFFSET $8
            "#,
        )
        .bind(organization_id.as_uuid())
        .bind(search)
        .bind(query.client_id.map(|client_id| client_id.as_uuid()))
        .bind(query.status.map(LifecycleStatus::as_str))
        .bind(query.starts_on_or_after)
        .bind(query.ends_on_or_before)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| database_error("failed to list projects", error))?;

        rows_to_projects(rows)
    }

    async fn find_project(
        &self,
        organization_id: OrganizationId,
        project_id: ProjectId,
    ) -> AppResult<Option<Project>> {
        let row = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT
                id,
                organization_id,
                client_id,
                name,
                description,
                status,
                start_date,
                end_date,
                budget_cents,
                version,
                created_at,
                updated_at
            FROM projects
            WHERE organization_id = $1 AND id = $2
            "#,
        )
        .bind(organization_id.as_uuid())
        .bind(project_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| database_error("failed to find project", error))?;

        row.map(Project::try_from).transpose()
    }

    async fn update_project(
        &self,
        organization_id: OrganizationId,
        project_id: ProjectId,
        details: ProjectDetails,
        status: ProjectStatus,
        expected_version: i64,
    ) -> AppResult<Project> {
        let details = details.normalized()?;
        let row = sqlx::query_as::<_, ProjectRow>(
            r#"
            UPDATE projects
            SET
                client_id = $4,
                name = $5,
                description = $6,
                status = $7,
                start_date = $8,
                end_date = $9,
                budget_cents = $10,
                version = version + 1,
                updated_at = now()
            WHERE organization_id = $1
                AND id = $2
                AND version = $3
                AND (
                    $4::UUID IS NULL OR EXISTS (
                        SELECT 1
                        FROM clients
                        WHERE organization_id = $1 AND id = $4::UUID AND deleted_at IS NULL
                        FOR SHARE
                    )
                )
            RETURNING
                id,
                organization_id,
                client_id,
                name,
                description,
                status,
                start_date,
                end_date,
                budget_cents,
                version,
                created_at,
                updated_at
            "#,
        )
        .bind(organization_id.as_uuid())
        .bind(project_id.as_uuid())
        .bind(expected_version)
        .bind(details.client_id.map(|client_id| client_id.as_uuid()))
        .bind(details.name.as_str())
        .bind(details.description.as_deref())
        .bind(status.as_str())
        .bind(details.start_date)
        .bind(details.end_date)
        .bind(details.budget_cents)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| database_error("failed to update project", error))?;

        if let Some(row) = row {
            return Project::try_from(row);
        }

        let current_version = self.current_version(organization_id, project_id).await?;
        if current_version == Some(expected_version)
            && let Some(client_id) = details.client_id
        {
            return Err(missing_client_reference(client_id));
        }

        Err(stale_or_missing(
            "project",
            project_id,
            current_version,
            expected_version,
        ))
    }

    async fn update_project_status(
        &self,
        organization_id: OrganizationId,
        project_id: ProjectId,
        status: ProjectStatus,
        expected_version: i64,
    ) -> AppResult<Project> {
        let row = sqlx::query_as::<_, ProjectRow>(
            r#"
            UPDATE projects
            SET
                status = $4,
                version = version + 1,
                updated_at = now()
            WHERE organization_id = $1 AND id = $2 AND version = $3
            RETURNING
                id,
                organization_id,
                client_id,
                name,
                description,
                status,
                start_date,
                end_date,
                budget_cents,
                version,
                created_at,
                updated_at
            "#,
        )
        .bind(organization_id.as_uuid())
        .bind(project_id.as_uuid())
        .bind(expected_version)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| database_error("failed to update project status", error))?;

        match row {
            Some(row) => Project::try_from(row),
            None => Err(stale_or_missing(
                "project",
                project_id,
                self.current_version(organization_id, project_id).await?,
                expected_version,
            )),
        }
    }

    async fn delete_project(
        &self,
        organization_id: OrganizationId,
        project_id: ProjectId,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM projects
            WHERE organization_id = $1 AND id = $2
            "#,
        )
        .bind(organization_id.as_uuid())
        .bind(project_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| database_error("failed to delete project", error))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "project '{project_id}' was not found"
            )));
        }

        Ok(())
    }

    async fn list_projects_by_client(
        &self,
        organization_id: OrganizationId,
        client_id: ClientId,
    ) -> AppResult<Vec<Project>> {
        let rows = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT
                id,
                organization_id,
                client_id,
                name,
                description,
                status,
                start_date,
                end_date,
                budget_cents,
                version,
                created_at,
                updated_at
            FROM projects
            WHERE organization_id = $1 AND client_id = $2
            ORDER BY created_at DESC, name
            "#,
        )
        .bind(organization_id.as_uuid())
        .bind(client_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| database_error("failed to list client projects", error))?;

        rows_to_projects(rows)
    }
}
