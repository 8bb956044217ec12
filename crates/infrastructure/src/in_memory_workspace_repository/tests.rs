use std::sync::Arc;

use async_trait::async_trait;
use atrium_application::{
    AuthorizationService, ClientListQuery, ClientRepository, LifecycleGuard, ProjectListQuery,
    ProjectRepository, ProjectService, UpdateProjectInput,
};
use atrium_core::{AppError, AppResult, OrganizationId};
use atrium_domain::{
    Client, ClientDetails, ClientId, PermissionRegistry, Principal, Project, ProjectDetails,
    ProjectId, ProjectStatus, SystemRole,
};
use chrono::{NaiveDate, Utc};

use super::InMemoryWorkspaceRepository;
use crate::{InMemoryAuditRepository, InMemoryDirectoryRepository};

fn project_details(name: &str) -> ProjectDetails {
    ProjectDetails {
        name: name.to_owned(),
        description: None,
        client_id: None,
        start_date: None,
        end_date: None,
        budget_cents: None,
    }
}

fn client(organization_id: OrganizationId, name: &str) -> Client {
    Client::create(
        organization_id,
        ClientDetails {
            name: name.to_owned(),
            email: None,
            phone: None,
        },
        Utc::now(),
    )
    .unwrap_or_else(|_| unreachable!())
}

async fn stored_project(
    repository: &InMemoryWorkspaceRepository,
    organization_id: OrganizationId,
    details: ProjectDetails,
) -> Project {
    let project =
        Project::create(organization_id, details, Utc::now()).unwrap_or_else(|_| unreachable!());
    let created = repository
        .create_project(organization_id, project.clone())
        .await;
    assert!(created.is_ok());
    project
}

#[tokio::test]
async fn projects_do_not_leak_across_organizations() {
    let repository = InMemoryWorkspaceRepository::new();
    let left = OrganizationId::new();
    let right = OrganizationId::new();
    let project = stored_project(&repository, left, project_details("Website")).await;

    let found = repository.find_project(right, project.id()).await;
    assert!(matches!(found, Ok(None)));

    let listed = repository
        .list_projects(right, ProjectListQuery::default())
        .await;
    assert!(listed.is_ok_and(|projects| projects.is_empty()));
}

#[tokio::test]
async fn conditional_update_bumps_version_once() {
    let repository = InMemoryWorkspaceRepository::new();
    let organization_id = OrganizationId::new();
    let project = stored_project(&repository, organization_id, project_details("Website")).await;

    let updated = repository
        .update_project_status(organization_id, project.id(), ProjectStatus::Active, 1)
        .await;
    assert!(updated.is_ok_and(|project| {
        project.version() == 2 && project.status() == ProjectStatus::Active
    }));

    let stale = repository
        .update_project(
            organization_id,
            project.id(),
            project_details("Stale"),
            ProjectStatus::Active,
            1,
        )
        .await;
    assert!(matches!(stale, Err(AppError::VersionConflict(_))));

    let missing = repository
        .update_project_status(
            OrganizationId::new(),
            project.id(),
            ProjectStatus::Active,
            2,
        )
        .await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));

    let stored = repository.find_project(organization_id, project.id()).await;
    assert!(stored.is_ok_and(|stored| {
        stored.is_some_and(|stored| stored.version() == 2 && stored.details().name == "Website")
    }));
}

#[tokio::test]
async fn project_filters_apply_before_paging() {
    let repository = InMemoryWorkspaceRepository::new();
    let organization_id = OrganizationId::new();

    let mut dated = project_details("Dated rollout");
    dated.start_date = NaiveDate::from_ymd_opt(2026, 3, 1);
    dated.end_date = NaiveDate::from_ymd_opt(2026, 6, 30);
    stored_project(&repository, organization_id, dated).await;
    stored_project(&repository, organization_id, project_details("Undated rollout")).await;
    stored_project(&repository, organization_id, project_details("Audit")).await;

    let by_search = repository
        .list_projects(
            organization_id,
            ProjectListQuery {
                search: Some("ROLLOUT".to_owned()),
                ..ProjectListQuery::default()
            },
        )
        .await;
    assert!(by_search.is_ok_and(|projects| projects.len() == 2));

    let by_dates = repository
        .list_projects(
            organization_id,
            ProjectListQuery {
                starts_on_or_after: NaiveDate::from_ymd_opt(2026, 1, 1),
                ends_on_or_before: NaiveDate::from_ymd_opt(2026, 12, 31),
                ..ProjectListQuery::default()
            },
        )
        .await;
    assert!(by_dates.is_ok_and(|projects| {
        projects.len() == 1 && projects[0].details().name == "Dated rollout"
    }));

    let paged = repository
        .list_projects(
            organization_id,
            ProjectListQuery {
                limit: 2,
                offset: 2,
                ..ProjectListQuery::default()
            },
        )
        .await;
    assert!(paged.is_ok_and(|projects| projects.len() == 1));
}

#[tokio::test]
async fn soft_delete_detaches_projects_without_touching_versions() {
    let repository = InMemoryWorkspaceRepository::new();
    let organization_id = OrganizationId::new();
    let acme = client(organization_id, "Acme");
    assert!(repository.create_client(organization_id, acme.clone()).await.is_ok());

    let mut details = project_details("Website");
    details.client_id = Some(acme.id());
    let linked = stored_project(&repository, organization_id, details).await;
    let unrelated = stored_project(&repository, organization_id, project_details("Intranet")).await;

    let detached = repository.soft_delete_client(organization_id, acme.id()).await;
    assert!(matches!(detached, Ok(1)));

    assert!(matches!(
        repository.find_client(organization_id, acme.id()).await,
        Ok(None)
    ));
    assert!(
        repository
            .list_clients(organization_id, ClientListQuery::default())
            .await
            .is_ok_and(|clients| clients.is_empty())
    );

    let linked_after = repository.find_project(organization_id, linked.id()).await;
    assert!(linked_after.is_ok_and(|project| {
        project.is_some_and(|project| project.client_id().is_none() && project.version() == 1)
    }));
    let unrelated_after = repository.find_project(organization_id, unrelated.id()).await;
    assert!(unrelated_after.is_ok_and(|project| project.is_some()));

    let again = repository.soft_delete_client(organization_id, acme.id()).await;
    assert!(matches!(again, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn deleted_clients_cannot_be_updated() {
    let repository = InMemoryWorkspaceRepository::new();
    let organization_id = OrganizationId::new();
    let acme = client(organization_id, "Acme");
    assert!(repository.create_client(organization_id, acme.clone()).await.is_ok());
    assert!(repository.soft_delete_client(organization_id, acme.id()).await.is_ok());

    let result = repository
        .update_client(
            organization_id,
            acme.id(),
            ClientDetails {
                name: "Acme Corp".to_owned(),
                email: None,
                phone: None,
            },
            2,
        )
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn clients_are_listed_by_name() {
    let repository = InMemoryWorkspaceRepository::new();
    let organization_id = OrganizationId::new();
    for name in ["Initech", "Acme", "Globex"] {
        let created = repository
            .create_client(organization_id, client(organization_id, name))
            .await;
        assert!(created.is_ok());
    }

    let listed = repository
        .list_clients(organization_id, ClientListQuery::default())
        .await;
    let names: Vec<String> = listed
        .unwrap_or_default()
        .iter()
        .map(|client| client.details().name.clone())
        .collect();
    assert_eq!(names, ["Acme", "Globex", "Initech"]);
}

#[tokio::test]
async fn writes_reject_soft_deleted_client_references() {
    let repository = InMemoryWorkspaceRepository::new();
    let organization_id = OrganizationId::new();
    let acme = client(organization_id, "Acme");
    assert!(repository.create_client(organization_id, acme.clone()).await.is_ok());
    let project = stored_project(&repository, organization_id, project_details("Website")).await;
    assert!(repository.soft_delete_client(organization_id, acme.id()).await.is_ok());

    let mut linked = project_details("Website");
    linked.client_id = Some(acme.id());

    let created = repository
        .create_project(
            organization_id,
            Project::create(organization_id, linked.clone(), Utc::now())
                .unwrap_or_else(|_| unreachable!()),
        )
        .await;
    assert!(matches!(created, Err(AppError::ReferenceNotFound(_))));

    let stale = repository
        .update_project(
            organization_id,
            project.id(),
            linked.clone(),
            ProjectStatus::Planning,
            7,
        )
        .await;
    assert!(matches!(stale, Err(AppError::VersionConflict(_))));

    let updated = repository
        .update_project(organization_id, project.id(), linked, ProjectStatus::Planning, 1)
        .await;
    assert!(matches!(updated, Err(AppError::ReferenceNotFound(_))));

    let stored = repository.find_project(organization_id, project.id()).await;
    assert!(stored.is_ok_and(|stored| {
        stored.is_some_and(|stored| stored.client_id().is_none() && stored.version() == 1)
    }));
}

/// Project storage that soft-deletes a client right before each full update.
struct ClientRemovedBeforeUpdate {
    workspace: Arc<InMemoryWorkspaceRepository>,
    client_id: ClientId,
}

#[async_trait]
impl ProjectRepository for ClientRemovedBeforeUpdate {
    async fn create_project(
        &self,
        organization_id: OrganizationId,
        project: Project,
    ) -> AppResult<()> {
        self.workspace.create_project(organization_id, project).await
    }

    async fn list_projects(
        &self,
        organization_id: OrganizationId,
        query: ProjectListQuery,
    ) -> AppResult<Vec<Project>> {
        self.workspace.list_projects(organization_id, query).await
    }

    async fn find_project(
        &self,
        organization_id: OrganizationId,
        project_id: ProjectId,
    ) -> AppResult<Option<Project>> {
        self.workspace.find_project(organization_id, project_id).await
    }

    async fn update_project(
        &self,
        organization_id: OrganizationId,
        project_id: ProjectId,
        details: ProjectDetails,
        status: ProjectStatus,
        expected_version: i64,
    ) -> AppResult<Project> {
        let removed = self
            .workspace
            .soft_delete_client(organization_id, self.client_id)
            .await;
        assert!(matches!(removed, Ok(0)));

        self.workspace
            .update_project(organization_id, project_id, details, status, expected_version)
            .await
    }

    async fn update_project_status(
        &self,
        organization_id: OrganizationId,
        project_id: ProjectId,
        status: ProjectStatus,
        expected_version: i64,
    ) -> AppResult<Project> {
        self.workspace
            .update_project_status(organization_id, project_id, status, expected_version)
            .await
    }

    async fn delete_project(
        &self,
        organization_id: OrganizationId,
        project_id: ProjectId,
    ) -> AppResult<()> {
        self.workspace.delete_project(organization_id, project_id).await
    }

    async fn list_projects_by_client(
        &self,
        organization_id: OrganizationId,
        client_id: ClientId,
    ) -> AppResult<Vec<Project>> {
        self.workspace
            .list_projects_by_client(organization_id, client_id)
            .await
    }
}

#[tokio::test]
async fn client_removed_between_check_and_write_is_never_referenced() {
    let workspace = Arc::new(InMemoryWorkspaceRepository::new());
    let organization_id = OrganizationId::new();
    let acme = client(organization_id, "Acme");
    assert!(workspace.create_client(organization_id, acme.clone()).await.is_ok());
    let project = stored_project(&workspace, organization_id, project_details("Website")).await;

    let registry = PermissionRegistry::standard().unwrap_or_else(|error| panic!("{error}"));
    let service = ProjectService::new(
        LifecycleGuard::new(AuthorizationService::new(
            Arc::new(registry),
            Arc::new(InMemoryDirectoryRepository::new()),
        )),
        Arc::new(ClientRemovedBeforeUpdate {
            workspace: workspace.clone(),
            client_id: acme.id(),
        }),
        workspace.clone(),
        Arc::new(InMemoryAuditRepository::new()),
    );
    let actor = Principal::new("founder", organization_id, SystemRole::Superadmin, None);

    let mut details = project_details("Website");
    details.client_id = Some(acme.id());
    let result = service
        .update_project(
            &actor,
            project.id(),
            UpdateProjectInput {
                details,
                status: None,
                expected_version: 1,
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::ReferenceNotFound(_))));

    assert!(matches!(
        workspace.find_client(organization_id, acme.id()).await,
        Ok(None)
    ));
    let stored = workspace.find_project(organization_id, project.id()).await;
    assert!(stored.is_ok_and(|stored| {
        stored.is_some_and(|stored| stored.client_id().is_none() && stored.version() == 1)
    }));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_writers_on_one_version_produce_one_winner() {
    let repository = Arc::new(InMemoryWorkspaceRepository::new());
    let organization_id = OrganizationId::new();
    let project = stored_project(&repository, organization_id, project_details("Website")).await;
    let project_id = project.id();

    let writers: Vec<_> = (0..16)
        .map(|writer| {
            let repository = repository.clone();
            tokio::spawn(async move {
                repository
                    .update_project(
                        organization_id,
                        project_id,
                        project_details(&format!("Website rev {writer}")),
                        ProjectStatus::Active,
                        1,
                    )
                    .await
            })
        })
        .collect();

    let mut winners = 0;
    let mut conflicts = 0;
    for writer in writers {
        match writer
            .await
            .unwrap_or_else(|error| panic!("writer task failed: {error}"))
        {
            Ok(_) => winners += 1,
            Err(AppError::VersionConflict(_)) => conflicts += 1,
            Err(error) => panic!("unexpected writer error: {error}"),
        }
    }

    assert_eq!(winners, 1);
    assert_eq!(conflicts, 15);
    let stored = repository.find_project(organization_id, project_id).await;
    assert!(stored.is_ok_and(|stored| {
        stored.is_some_and(|stored| {
            stored.version() == 2 && stored.status() == ProjectStatus::Active
        })
    }));
}
