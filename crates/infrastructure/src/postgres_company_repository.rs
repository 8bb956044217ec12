use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use atrium_application::{CompanyListQuery, CompanyRepository};
use atrium_core::{AppError, AppResult, OrganizationId};
use atrium_domain::{Company, CompanyDetails, CompanyId};

use crate::repository_errors::{database_error, stale_or_missing};

/// PostgreSQL-backed company repository.
#[derive(Clone)]
pub struct PostgresCompanyRepository {
    pool: PgPool,
}

impl PostgresCompanyRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct CompanyRow {
    id: Uuid,
    organization_id: Uuid,
    name: String,
    website: Option<String>,
    industry: Option<String>,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CompanyRow> for Company {
    type Error = AppError;

    fn try_from(row: CompanyRow) -> Result<Self, Self::Error> {
        Company::restore(
            CompanyId::from_uuid(row.id),
            OrganizationId::from_uuid(row.organization_id),
            CompanyDetails {
                name: row.name,
                website: row.website,
                industry: row.industry,
            },
            row.version,
            row.created_at,
            row.updated_at,
        )
    }
}

#[async_trait]
impl CompanyRepository for PostgresCompanyRepository {
    async fn create_company(
        &self,
        organization_id: OrganizationId,
        company: Company,
    ) -> AppResult<()> {
        let details = company.details();
        sqlx::query(
            r#"
            INSERT INTO companies (
                id,
                organization_id,
                name,
                website,
                industry,
                version,
                created_at,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(company.id().as_uuid())
        .bind(organization_id.as_uuid())
        .bind(details.name.as_str())
        .bind(details.website.as_deref())
        .bind(details.industry.as_deref())
        .bind(company.version())
        .bind(company.created_at())
        .bind(company.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|error| database_error("failed to create company", error))?;

        Ok(())
    }

    async fn list_companies(
        &self,
        organization_id: OrganizationId,
        query: CompanyListQuery,
    ) -> AppResult<Vec<Company>> {
        let search = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|search| !search.is_empty())
            .map(str::to_lowercase);
        let limit = i64::try_from(query.limit).unwrap_or(i64::MAX);
        let offset = i64::try_from(query.offset).unwrap_or(i64::MAX);

        let rows = sqlx::query_as::<_, CompanyRow>(
            r#"
            SELECT
                id,
                organization_id,
                name,
                website,
                industry,
                version,
                created_at,
                updated_at
            FROM companies
            WHERE organization_id = $1
                AND (
                    $2::TEXT IS NULL
                    OR strpos(lower(name), $2) > 0
                    OR strpos(lower(coalesce(industry, '')), $2) > 0
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
        .map_err(|error| database_error("failed to list companies", error))?;

        rows.into_iter().map(Company::try_from).collect()
    }

    async fn find_company(
        &self,
        organization_id: OrganizationId,
        company_id: CompanyId,
    ) -> AppResult<Option<Company>> {
        let row = sqlx::query_as::<_, CompanyRow>(
            r#"
            SELECT
                id,
                organization_id,
                name,
                website,
                industry,
                version,
                created_at,
                updated_at
            FROM companies
            WHERE organization_id = $1 AND id = $2
            "#,
        )
        .bind(organization_id.as_uuid())
        .bind(company_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| database_error("failed to find company", error))?;

        row.map(Company::try_from).transpose()
    }

    async fn update_company(
        &self,
        organization_id: OrganizationId,
        company_id: CompanyId,
        details: CompanyDetails,
        expected_version: i64,
    ) -> AppResult<Company> {
        let details = details.normalized()?;
        let row = sqlx::query_as::<_, CompanyRow>(
            r#"
            UPDATE companies
            SET
                name = $4,
                website = $5,
                industry = $6,
                version = version + 1,
                updated_at = now()
            WHERE organization_id = $1 AND id = $2 AND version = $3
            RETURNING
                id,
                organization_id,
                name,
                website,
                industry,
                version,
                created_at,
                updated_at
            "#,
        )
        .bind(organization_id.as_uuid())
        .bind(company_id.as_uuid())
        .bind(expected_version)
        .bind(details.name.as_str())
        .bind(details.website.as_deref())
        .bind(details.industry.as_deref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| database_error("failed to update company", error))?;

        if let Some(row) = row {
            return Company::try_from(row);
        }

        let current_version = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT version
            FROM companies
            WHERE organization_id = $1 AND id = $2
            "#,
        )
        .bind(organization_id.as_uuid())
        .bind(company_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| database_error("failed to load company version", error))?;

        Err(stale_or_missing(
            "company",
            company_id,
            current_version,
            expected_version,
        ))
    }

    async fn delete_company(
        &self,
        organization_id: OrganizationId,
        company_id: CompanyId,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM companies
            WHERE organization_id = $1 AND id = $2
            "#,
        )
        .bind(organization_id.as_uuid())
        .bind(company_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| database_error("failed to delete company", error))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "company '{company_id}' was not found"
            )));
        }

        Ok(())
    }
}
