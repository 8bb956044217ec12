use atrium_application::{ClientRepository, ProjectListQuery, ProjectRepository};
use atrium_core::{AppError, OrganizationId};
use atrium_domain::{Client, ClientDetails, Project, ProjectDetails, ProjectStatus};
use chrono::Utc;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

use super::PostgresProjectRepository;
use crate::PostgresClientRepository;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres project tests: {error}");
    }

    Some(pool)
}

fn details(name: &str) -> ProjectDetails {
    ProjectDetails {
        name: name.to_owned(),
        description: Some("Quarterly rollout".to_owned()),
        client_id: None,
        start_date: None,
        end_date: None,
        budget_cents: Some(125_000),
    }
}

#[tokio::test]
async fn conditional_writes_detect_stale_versions() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresProjectRepository::new(pool);
    let organization_id = OrganizationId::new();
    let project = Project::create(organization_id, details("Website"), Utc::now())
        .unwrap_or_else(|_| unreachable!());
    assert!(
        repository
            .create_project(organization_id, project.clone())
            .await
            .is_ok()
    );

    let updated = repository
        .update_project_status(organization_id, project.id(), ProjectStatus::Active, 1)
        .await;
    assert!(updated.is_ok_and(|project| project.version() == 2));

    let stale = repository
        .update_project(
            organization_id,
            project.id(),
            details("Stale"),
            ProjectStatus::Active,
            1,
        )
        .await;
    assert!(matches!(stale, Err(AppError::VersionConflict(_))));

    let foreign = repository
        .update_project_status(OrganizationId::new(), project.id(), ProjectStatus::Active, 2)
        .await;
    assert!(matches!(foreign, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn client_soft_delete_detaches_projects() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let projects = PostgresProjectRepository::new(pool.clone());
    let clients = PostgresClientRepository::new(pool);
    let organization_id = OrganizationId::new();

    let client = Client::create(
        organization_id,
        ClientDetails {
            name: "Acme".to_owned(),
            email: Some("ops@acme.example".to_owned()),
            phone: None,
        },
        Utc::now(),
    )
    .unwrap_or_else(|_| unreachable!());
    assert!(
        clients
            .create_client(organization_id, client.clone())
            .await
            .is_ok()
    );

    let mut linked = details("Website");
    linked.client_id = Some(client.id());
    let project =
        Project::create(organization_id, linked, Utc::now()).unwrap_or_else(|_| unreachable!());
    assert!(
        projects
            .create_project(organization_id, project.clone())
            .await
            .is_ok()
    );

    let detached = clients.soft_delete_client(organization_id, client.id()).await;
    assert!(matches!(detached, Ok(1)));

    let stored = projects.find_project(organization_id, project.id()).await;
    assert!(stored.is_ok_and(|stored| {
        stored.is_some_and(|stored| stored.client_id().is_none() && stored.version() == 1)
    }));

    let by_client = projects
        .list_projects(
            organization_id,
            ProjectListQuery {
                client_id: Some(client.id()),
                ..ProjectListQuery::default()
            },
        )
        .await;
    assert!(by_client.is_ok_and(|projects| projects.is_empty()));
}

#[tokio::test]
async fn writes_reject_soft_deleted_client_references() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let projects = PostgresProjectRepository::new(pool.clone());
    let clients = PostgresClientRepository::new(pool);
    let organization_id = OrganizationId::new();

    let client = Client::create(
        organization_id,
        ClientDetails {
            name: "Globex".to_owned(),
            email: None,
            phone: None,
        },
        Utc::now(),
    )
    .unwrap_or_else(|_| unreachable!());
    assert!(
        clients
            .create_client(organization_id, client.clone())
            .await
            .is_ok()
    );

    let project = Project::create(organization_id, details("Intranet"), Utc::now())
        .unwrap_or_else(|_| unreachable!());
    assert!(
        projects
            .create_project(organization_id, project.clone())
            .await
            .is_ok()
    );
    assert!(
        clients
            .soft_delete_client(organization_id, client.id())
            .await
            .is_ok()
    );

    let mut linked = details("Intranet");
    linked.client_id = Some(client.id());

    let created = projects
        .create_project(
            organization_id,
            Project::create(organization_id, linked.clone(), Utc::now())
                .unwrap_or_else(|_| unreachable!()),
        )
        .await;
    assert!(matches!(created, Err(AppError::ReferenceNotFound(_))));

    let updated = projects
        .update_project(
            organization_id,
            project.id(),
            linked,
            ProjectStatus::Planning,
            1,
        )
        .await;
    assert!(matches!(updated, Err(AppError::ReferenceNotFound(_))));

    let stored = projects.find_project(organization_id, project.id()).await;
    assert!(stored.is_ok_and(|stored| {
        stored.is_some_and(|stored| stored.client_id().is_none() && stored.version() == 1)
    }));
}
