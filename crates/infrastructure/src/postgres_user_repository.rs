use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use atrium_application::UserRepository;
use atrium_core::{AppError, AppResult, OrganizationId, UserIdentity};
use atrium_domain::{CustomRoleId, EmailAddress, SystemRole, UserAccount, UserId};

use crate::repository_errors::{database_error, stale_or_missing};

/// PostgreSQL-backed user directory.
#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    organization_id: Uuid,
    subject: String,
    email: Option<String>,
    display_name: String,
    role: String,
    custom_role_id: Option<Uuid>,
    version: i64,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for UserAccount {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row.role.parse::<SystemRole>().map_err(|error| {
            AppError::Internal(format!("failed to decode role of user '{}': {error}", row.id))
        })?;
        let email = row.email.map(EmailAddress::new).transpose()?;

        UserAccount::restore(
            UserId::from_uuid(row.id),
            OrganizationId::from_uuid(row.organization_id),
            row.subject,
            email,
            row.display_name,
            role,
            row.custom_role_id.map(CustomRoleId::from_uuid),
            row.version,
            row.created_at,
        )
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_user_by_subject(
        &self,
        organization_id: OrganizationId,
        subject: &str,
    ) -> AppResult<Option<UserAccount>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, organization_id, subject, email, display_name, role,
                custom_role_id, version, created_at
            FROM users
            WHERE organization_id = $1 AND subject = $2
            "#,
        )
        .bind(organization_id.as_uuid())
        .bind(subject)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| database_error("failed to find user by subject", error))?;

        row.map(UserAccount::try_from).transpose()
    }

    async fn find_user(
        &self,
        organization_id: OrganizationId,
        user_id: UserId,
    ) -> AppResult<Option<UserAccount>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, organization_id, subject, email, display_name, role,
                custom_role_id, version, created_at
            FROM users
            WHERE organization_id = $1 AND id = $2
            "#,
        )
        .bind(organization_id.as_uuid())
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| database_error("failed to find user", error))?;

        row.map(UserAccount::try_from).transpose()
    }

    async fn list_users(&self, organization_id: OrganizationId) -> AppResult<Vec<UserAccount>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, organization_id, subject, email, display_name, role,
                custom_role_id, version, created_at
            FROM users
            WHERE organization_id = $1
            ORDER BY display_name, subject
            "#,
        )
        .bind(organization_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| database_error("failed to list users", error))?;

        rows.into_iter().map(UserAccount::try_from).collect()
    }

    async fn ensure_user(&self, identity: &UserIdentity) -> AppResult<UserAccount> {
        let organization_id = identity.organization_id();
        let email = identity
            .email()
            .map(EmailAddress::new)
            .transpose()?
            .map(String::from);
        let display_name = match identity.display_name().trim() {
            "" => identity.subject(),
            display_name => display_name,
        };

        let mut transaction = self
            .pool
            .begin()
            .await
            .map_err(|error| database_error("failed to begin transaction", error))?;

        // Serializes first-member detection per organization.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1::TEXT, 0))")
            .bind(organization_id.to_string())
            .execute(&mut *transaction)
            .await
            .map_err(|error| database_error("failed to lock organization directory", error))?;

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, organization_id, subject, email, display_name, role)
            VALUES (
                $1,
                $2,
                $3,
                $4,
                $5,
                CASE
                    WHEN EXISTS (SELECT 1 FROM users WHERE organization_id = $2)
                        THEN 'member'
                    ELSE 'superadmin'
                END
            )
            ON CONFLICT (organization_id, subject)
                DO UPDATE SET subject = EXCLUDED.subject
            RETURNING id, organization_id, subject, email, display_name, role,
                custom_role_id, version, created_at
            "#,
        )
        .bind(UserId::new().as_uuid())
        .bind(organization_id.as_uuid())
        .bind(identity.subject())
        .bind(email)
        .bind(display_name)
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| database_error("failed to ensure user", error))?;

        transaction
            .commit()
            .await
            .map_err(|error| database_error("failed to commit transaction", error))?;

        UserAccount::try_from(row)
    }

    async fn assign_role(
        &self,
        organization_id: OrganizationId,
        user_id: UserId,
        role: SystemRole,
        custom_role_id: Option<CustomRoleId>,
        expected_version: i64,
    ) -> AppResult<UserAccount> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET role = $4, custom_role_id = $5, version = version + 1
            WHERE organization_id = $1 AND id = $2 AND version = $3
            RETURNING id, organization_id, subject, email, display_name, role,
                custom_role_id, version, created_at
            "#,
        )
        .bind(organization_id.as_uuid())
        .bind(user_id.as_uuid())
        .bind(expected_version)
        .bind(role.as_str())
        .bind(custom_role_id.map(|custom_role_id| custom_role_id.as_uuid()))
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| database_error("failed to assign role", error))?;

        if let Some(row) = row {
            return UserAccount::try_from(row);
        }

        let current_version = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT version
            FROM users
            WHERE organization_id = $1 AND id = $2
            "#,
        )
        .bind(organization_id.as_uuid())
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| database_error("failed to load user version", error))?;

        Err(stale_or_missing(
            "user",
            user_id,
            current_version,
            expected_version,
        ))
    }
}
