use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use atrium_core::OrganizationId;
use atrium_domain::Principal;

use crate::dto::{
    AssignUserRoleRequest, ClientListParams, CompanyListParams, CreateClientRequest,
    CreateCompanyRequest, CreateCustomRoleRequest, CreateProjectRequest, ProjectListParams,
    ProjectResponse, UpdateCompanyRequest, UpdateProjectStatusRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

use super::test_support::{sign_in, test_state};
use super::{clients, companies, projects, roles, users};

fn status_of<T>(result: ApiResult<T>) -> StatusCode {
    match result {
        Ok(_) => StatusCode::OK,
        Err(error) => error.into_response().status(),
    }
}

fn project_request(value: serde_json::Value) -> CreateProjectRequest {
    serde_json::from_value(value).unwrap_or_else(|error| panic!("{error}"))
}

fn status_request(status: &str, expected_version: i64) -> Json<UpdateProjectStatusRequest> {
    Json(UpdateProjectStatusRequest {
        status: status.to_owned(),
        expected_version,
    })
}

async fn create_project(
    state: &AppState,
    principal: &Principal,
    request: CreateProjectRequest,
) -> ProjectResponse {
    let (status, Json(project)) = projects::create_project_handler(
        State(state.clone()),
        Extension(principal.clone()),
        Json(request),
    )
    .await
    .unwrap_or_else(|error| panic!("{}", error.0));
    assert_eq!(status, StatusCode::CREATED);
    project
}

#[tokio::test]
async fn project_status_changes_follow_lifecycle_and_versions() {
    let state = test_state();
    let (_, founder) = sign_in(&state, OrganizationId::new(), "founder").await;

    let project = create_project(
        &state,
        &founder,
        project_request(json!({ "name": "Website relaunch", "budget_cents": 150_000 })),
    )
    .await;
    assert_eq!(project.status, "planning");
    assert_eq!(project.allowed_transitions, ["active", "cancelled"]);
    assert_eq!(project.version, 1);

    let activated = projects::update_project_status_handler(
        State(state.clone()),
        Extension(founder.clone()),
        Path(project.project_id.clone()),
        status_request("active", 1),
    )
    .await;
    assert!(activated.is_ok_and(|Json(project)| project.version == 2));

    let stale = projects::update_project_status_handler(
        State(state.clone()),
        Extension(founder.clone()),
        Path(project.project_id.clone()),
        status_request("on_hold", 1),
    )
    .await;
    assert_eq!(status_of(stale), StatusCode::CONFLICT);

    let completed = projects::update_project_status_handler(
        State(state.clone()),
        Extension(founder.clone()),
        Path(project.project_id.clone()),
        status_request("completed", 2),
    )
    .await;
    assert!(completed.is_ok_and(|Json(project)| project.is_terminal));

    let reopened = projects::update_project_status_handler(
        State(state.clone()),
        Extension(founder),
        Path(project.project_id),
        status_request("active", 3),
    )
    .await;
    assert_eq!(status_of(reopened), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn members_read_but_cannot_write_projects() {
    let state = test_state();
    let organization_id = OrganizationId::new();
    let (_, founder) = sign_in(&state, organization_id, "founder").await;
    let (_, member) = sign_in(&state, organization_id, "mia").await;
    create_project(&state, &founder, project_request(json!({ "name": "Intranet" }))).await;

    let listed = projects::list_projects_handler(
        State(state.clone()),
        Extension(member.clone()),
        Query(ProjectListParams::default()),
    )
    .await;
    assert!(listed.is_ok_and(|Json(projects)| projects.len() == 1));

    let created = projects::create_project_handler(
        State(state),
        Extension(member),
        Json(project_request(json!({ "name": "Shadow IT" }))),
    )
    .await;
    assert_eq!(status_of(created), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn malformed_identifiers_and_unknown_clients_are_rejected() {
    let state = test_state();
    let (_, founder) = sign_in(&state, OrganizationId::new(), "founder").await;

    let malformed = projects::get_project_handler(
        State(state.clone()),
        Extension(founder.clone()),
        Path("not-a-uuid".to_owned()),
    )
    .await;
    assert_eq!(status_of(malformed), StatusCode::BAD_REQUEST);

    let dangling = projects::create_project_handler(
        State(state),
        Extension(founder),
        Json(project_request(json!({
            "name": "Orphan",
            "client_id": "5f0c6a2e-8f43-4a55-9a43-0c2d8f6f1b7e",
        }))),
    )
    .await;
    assert_eq!(status_of(dangling), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn deleting_a_client_detaches_its_projects() {
    let state = test_state();
    let (_, founder) = sign_in(&state, OrganizationId::new(), "founder").await;

    let (_, Json(client)) = clients::create_client_handler(
        State(state.clone()),
        Extension(founder.clone()),
        Json(CreateClientRequest {
            name: "Acme".to_owned(),
            email: Some("billing@acme.test".to_owned()),
            phone: None,
        }),
    )
    .await
    .unwrap_or_else(|error| panic!("{}", error.0));

    let project = create_project(
        &state,
        &founder,
        project_request(json!({ "name": "Storefront", "client_id": client.client_id })),
    )
    .await;
    assert_eq!(project.client_id.as_deref(), Some(client.client_id.as_str()));

    let by_client = projects::list_client_projects_handler(
        State(state.clone()),
        Extension(founder.clone()),
        Path(client.client_id.clone()),
    )
    .await;
    assert!(by_client.is_ok_and(|Json(projects)| projects.len() == 1));

    let deleted = clients::delete_client_handler(
        State(state.clone()),
        Extension(founder.clone()),
        Path(client.client_id.clone()),
    )
    .await;
    assert!(deleted.is_ok_and(|Json(result)| result.detached_project_count == 1));

    let detached = projects::get_project_handler(
        State(state.clone()),
        Extension(founder.clone()),
        Path(project.project_id),
    )
    .await;
    assert!(detached.is_ok_and(|Json(project)| project.client_id.is_none()));

    let listed = clients::list_clients_handler(
        State(state.clone()),
        Extension(founder.clone()),
        Query(ClientListParams::default()),
    )
    .await;
    assert!(listed.is_ok_and(|Json(clients)| clients.is_empty()));

    let gone = projects::list_client_projects_handler(
        State(state),
        Extension(founder),
        Path(client.client_id),
    )
    .await;
    assert_eq!(status_of(gone), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn custom_role_assignment_replaces_member_defaults() {
    let state = test_state();
    let organization_id = OrganizationId::new();
    let (_, founder) = sign_in(&state, organization_id, "founder").await;
    let (identity, member) = sign_in(&state, organization_id, "mia").await;

    let (_, Json(role)) = roles::create_role_handler(
        State(state.clone()),
        Extension(founder.clone()),
        Json(CreateCustomRoleRequest {
            name: "Project editors".to_owned(),
            description: None,
            permissions: vec!["projects.view".to_owned(), "projects.create".to_owned()],
        }),
    )
    .await
    .unwrap_or_else(|error| panic!("{}", error.0));

    let Json(users) = users::list_users_handler(State(state.clone()), Extension(founder.clone()))
        .await
        .unwrap_or_else(|error| panic!("{}", error.0));
    let Some(target) = users.into_iter().find(|user| user.subject == "mia") else {
        panic!("member missing from directory");
    };

    let assigned = users::assign_user_role_handler(
        State(state.clone()),
        Extension(founder.clone()),
        Path(target.user_id.clone()),
        Json(AssignUserRoleRequest {
            role: "member".to_owned(),
            custom_role_id: Some(role.role_id.clone()),
            expected_version: target.version,
        }),
    )
    .await;
    assert!(assigned.is_ok_and(|Json(user)| {
        user.version == target.version + 1 && user.custom_role_id == Some(role.role_id.clone())
    }));

    // Stale principal from before the assignment still lacks the grant.
    let denied = projects::create_project_handler(
        State(state.clone()),
        Extension(member),
        Json(project_request(json!({ "name": "Denied" }))),
    )
    .await;
    assert_eq!(status_of(denied), StatusCode::FORBIDDEN);

    let refreshed = state
        .user_service
        .resolve_principal(&identity)
        .await
        .unwrap_or_else(|error| panic!("{error}"));
    let created = projects::create_project_handler(
        State(state.clone()),
        Extension(refreshed.clone()),
        Json(project_request(json!({ "name": "Allowed" }))),
    )
    .await;
    assert_eq!(status_of(created), StatusCode::OK);

    let clients_view = clients::list_clients_handler(
        State(state.clone()),
        Extension(refreshed),
        Query(ClientListParams::default()),
    )
    .await;
    assert_eq!(status_of(clients_view), StatusCode::FORBIDDEN);

    let removed = roles::delete_role_handler(
        State(state.clone()),
        Extension(founder.clone()),
        Path(role.role_id),
    )
    .await;
    assert!(removed.is_ok_and(|status| status == StatusCode::NO_CONTENT));

    let after_delete = users::get_user_handler(
        State(state),
        Extension(founder),
        Path(target.user_id),
    )
    .await;
    assert!(after_delete.is_ok_and(|Json(user)| user.custom_role_id.is_none()));
}

#[tokio::test]
async fn permission_registry_requires_roles_view() {
    let state = test_state();
    let organization_id = OrganizationId::new();
    let (_, founder) = sign_in(&state, organization_id, "founder").await;
    let (_, member) = sign_in(&state, organization_id, "mia").await;

    let listed =
        roles::list_permissions_handler(State(state.clone()), Extension(founder)).await;
    assert!(listed.is_ok_and(|Json(permissions)| {
        permissions.iter().any(|permission| permission == "roles.manage")
            && !permissions.iter().any(|permission| permission == "*")
    }));

    let denied = roles::list_permissions_handler(State(state), Extension(member)).await;
    assert_eq!(status_of(denied), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admins_cannot_promote_to_superadmin() {
    let state = test_state();
    let organization_id = OrganizationId::new();
    let (_, founder) = sign_in(&state, organization_id, "founder").await;
    let (admin_identity, _) = sign_in(&state, organization_id, "alice").await;
    sign_in(&state, organization_id, "bob").await;

    let Json(directory) =
        users::list_users_handler(State(state.clone()), Extension(founder.clone()))
            .await
            .unwrap_or_else(|error| panic!("{}", error.0));
    let find = |subject: &str| {
        directory
            .iter()
            .find(|user| user.subject == subject)
            .cloned()
            .unwrap_or_else(|| panic!("{subject} missing"))
    };
    let alice = find("alice");
    let bob = find("bob");

    let promoted = users::assign_user_role_handler(
        State(state.clone()),
        Extension(founder),
        Path(alice.user_id),
        Json(AssignUserRoleRequest {
            role: "admin".to_owned(),
            custom_role_id: None,
            expected_version: alice.version,
        }),
    )
    .await;
    assert_eq!(status_of(promoted), StatusCode::OK);

    let admin = state
        .user_service
        .resolve_principal(&admin_identity)
        .await
        .unwrap_or_else(|error| panic!("{error}"));
    let escalation = users::assign_user_role_handler(
        State(state),
        Extension(admin),
        Path(bob.user_id),
        Json(AssignUserRoleRequest {
            role: "superadmin".to_owned(),
            custom_role_id: None,
            expected_version: bob.version,
        }),
    )
    .await;
    assert_eq!(status_of(escalation), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn company_crud_is_versioned_and_permission_gated() {
    let state = test_state();
    let organization_id = OrganizationId::new();
    let (_, founder) = sign_in(&state, organization_id, "founder").await;
    let (_, member) = sign_in(&state, organization_id, "mia").await;

    let (status, Json(company)) = companies::create_company_handler(
        State(state.clone()),
        Extension(founder.clone()),
        Json(CreateCompanyRequest {
            name: "Initech".to_owned(),
            website: Some("https://initech.example".to_owned()),
            industry: Some("Software".to_owned()),
        }),
    )
    .await
    .unwrap_or_else(|error| panic!("{}", error.0));
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(company.version, 1);

    let listed = companies::list_companies_handler(
        State(state.clone()),
        Extension(member.clone()),
        Query(CompanyListParams::default()),
    )
    .await;
    assert!(listed.is_ok_and(|Json(companies)| companies.len() == 1));

    let denied = companies::create_company_handler(
        State(state.clone()),
        Extension(member.clone()),
        Json(CreateCompanyRequest {
            name: "Globex".to_owned(),
            website: None,
            industry: None,
        }),
    )
    .await;
    assert_eq!(status_of(denied), StatusCode::FORBIDDEN);

    let update = |website: &str, expected_version| {
        Json(UpdateCompanyRequest {
            name: "Initech Labs".to_owned(),
            website: Some(website.to_owned()),
            industry: None,
            expected_version,
        })
    };

    let invalid = companies::update_company_handler(
        State(state.clone()),
        Extension(founder.clone()),
        Path(company.company_id.clone()),
        update("initech.example", 1),
    )
    .await;
    assert_eq!(status_of(invalid), StatusCode::BAD_REQUEST);

    let updated = companies::update_company_handler(
        State(state.clone()),
        Extension(founder.clone()),
        Path(company.company_id.clone()),
        update("https://initech.example", 1),
    )
    .await;
    assert!(updated.is_ok_and(|Json(company)| company.version == 2));

    let stale = companies::update_company_handler(
        State(state.clone()),
        Extension(founder.clone()),
        Path(company.company_id.clone()),
        update("https://initech.example", 1),
    )
    .await;
    assert_eq!(status_of(stale), StatusCode::CONFLICT);

    let malformed = companies::get_company_handler(
        State(state.clone()),
        Extension(founder.clone()),
        Path("not-a-uuid".to_owned()),
    )
    .await;
    assert_eq!(status_of(malformed), StatusCode::BAD_REQUEST);

    let deleted = companies::delete_company_handler(
        State(state.clone()),
        Extension(founder.clone()),
        Path(company.company_id.clone()),
    )
    .await;
    assert!(deleted.is_ok_and(|status| status == StatusCode::NO_CONTENT));

    let gone = companies::get_company_handler(
        State(state),
        Extension(founder),
        Path(company.company_id),
    )
    .await;
    assert_eq!(status_of(gone), StatusCode::NOT_FOUND);
}
