use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use atrium_core::{AppError, AppResult, OrganizationId};
use atrium_domain::{
    CustomRole, CustomRoleId, CustomRoleName, Permission, PermissionRegistry, Principal,
    SystemRole,
};

use super::{AuthorizationRepository, AuthorizationService};

#[derive(Default)]
struct FakeAuthorizationRepository {
    roles: HashMap<(OrganizationId, CustomRoleId), CustomRole>,
    unavailable: bool,
}

#[async_trait]
impl AuthorizationRepository for FakeAuthorizationRepository {
    async fn find_custom_role(
        &self,
        organization_id: OrganizationId,
        custom_role_id: CustomRoleId,
    ) -> AppResult<Option<CustomRole>> {
        if self.unavailable {
            return Err(AppError::ConnectionFailed(
                "role store unreachable".to_owned(),
            ));
        }

        Ok(self.roles.get(&(organization_id, custom_role_id)).cloned())
    }
}

fn registry() -> Arc<PermissionRegistry> {
    Arc::new(PermissionRegistry::standard().unwrap_or_else(|error| panic!("{error}")))
}

fn custom_role(organization_id: OrganizationId, permissions: &[&str]) -> CustomRole {
    CustomRole::new(
        CustomRoleId::new(),
        organization_id,
        CustomRoleName::new("auditor").unwrap_or_else(|error| panic!("{error}")),
        None,
        permissions
            .iter()
            .map(|value| Permission::new(*value).unwrap_or_else(|error| panic!("{error}")))
            .collect(),
        1,
    )
    .unwrap_or_else(|error| panic!("{error}"))
}

fn service_with(repository: FakeAuthorizationRepository) -> AuthorizationService {
    AuthorizationService::new(registry(), Arc::new(repository))
}

#[tokio::test]
async fn absent_principal_resolves_to_nothing() {
    let service = service_with(FakeAuthorizationRepository::default());

    assert!(service.resolve_permissions(None).await.is_empty());
    assert!(!service.has_permission(None, "projects.view").await);
    assert!(!service.has_any_permission(None, &["projects.view"]).await);
    assert!(!service.has_all_permissions(None, &["projects.view"]).await);
    assert!(!service.has_min_role(None, SystemRole::Member));
}

#[tokio::test]
async fn superadmin_short_circuits_custom_role() {
    let organization_id = OrganizationId::new();
    let narrow = custom_role(organization_id, &["projects.view"]);
    let principal = Principal::new(
        "root",
        organization_id,
        SystemRole::Superadmin,
        Some(narrow.id()),
    );
    let service = service_with(FakeAuthorizationRepository {
        roles: HashMap::from([((organization_id, narrow.id()), narrow)]),
        unavailable: false,
    });

    let permissions = service.resolve_permissions(Some(&principal)).await;
    assert_eq!(permissions.len(), 1);
    assert!(permissions.contains(&Permission::wildcard()));
    assert!(service.has_permission(Some(&principal), "roles.manage").await);
    assert!(service.has_permission(Some(&principal), "anything.at_all").await);
}

#[tokio::test]
async fn custom_role_replaces_role_defaults() {
    let organization_id = OrganizationId::new();
    let role = custom_role(organization_id, &["roles.view"]);
    let principal = Principal::new("bob", organization_id, SystemRole::Admin, Some(role.id()));
    let service = service_with(FakeAuthorizationRepository {
        roles: HashMap::from([((organization_id, role.id()), role)]),
        unavailable: false,
    });

    assert!(service.has_permission(Some(&principal), "roles.view").await);
    assert!(!service.has_permission(Some(&principal), "projects.view").await);
}

#[tokio::test]
async fn dangling_custom_role_falls_back_to_role_defaults() {
    let organization_id = OrganizationId::new();
    let principal = Principal::new(
        "carol",
        organization_id,
        SystemRole::Member,
        Some(CustomRoleId::new()),
    );
    let service = service_with(FakeAuthorizationRepository::default());

    let permissions = service.resolve_permissions(Some(&principal)).await;
    assert_eq!(&permissions, registry().role_defaults(SystemRole::Member));
    assert!(!permissions.is_empty());
}

#[tokio::test]
async fn failing_lookup_falls_back_to_role_defaults() {
    let organization_id = OrganizationId::new();
    let principal = Principal::new(
        "dave",
        organization_id,
        SystemRole::Admin,
        Some(CustomRoleId::new()),
    );
    let service = service_with(FakeAuthorizationRepository {
        roles: HashMap::new(),
        unavailable: true,
    });

    let permissions = service.resolve_permissions(Some(&principal)).await;
    assert_eq!(&permissions, registry().role_defaults(SystemRole::Admin));
}

#[tokio::test]
async fn custom_role_from_other_organization_is_not_resolved() {
    let owner_organization = OrganizationId::new();
    let role = custom_role(owner_organization, &["roles.manage"]);
    let principal = Principal::new(
        "erin",
        OrganizationId::new(),
        SystemRole::Member,
        Some(role.id()),
    );
    let service = service_with(FakeAuthorizationRepository {
        roles: HashMap::from([((owner_organization, role.id()), role)]),
        unavailable: false,
    });

    assert!(!service.has_permission(Some(&principal), "roles.manage").await);
    assert!(service.has_permission(Some(&principal), "projects.view").await);
}

#[tokio::test]
async fn empty_requirement_lists_never_authorize() {
    let principal = Principal::new("root", OrganizationId::new(), SystemRole::Superadmin, None);
    let service = service_with(FakeAuthorizationRepository::default());

    assert!(!service.has_any_permission(Some(&principal), &[]).await);
    assert!(!service.has_all_permissions(Some(&principal), &[]).await);
}

#[tokio::test]
async fn any_and_all_permission_queries() {
    let principal = Principal::new("mia", OrganizationId::new(), SystemRole::Member, None);
    let service = service_with(FakeAuthorizationRepository::default());

    assert!(
        service
            .has_any_permission(Some(&principal), &["projects.delete", "projects.view"])
            .await
    );
    assert!(
        !service
            .has_all_permissions(Some(&principal), &["projects.delete", "projects.view"])
            .await
    );
    assert!(
        service
            .has_all_permissions(Some(&principal), &["clients.view", "projects.view"])
            .await
    );
}

#[tokio::test]
async fn min_role_ignores_custom_role() {
    let organization_id = OrganizationId::new();
    let broad = custom_role(organization_id, &["*"]);
    let principal = Principal::new("nick", organization_id, SystemRole::Member, Some(broad.id()));
    let service = service_with(FakeAuthorizationRepository {
        roles: HashMap::from([((organization_id, broad.id()), broad)]),
        unavailable: false,
    });

    assert!(service.has_permission(Some(&principal), "roles.manage").await);
    assert!(service.has_min_role(Some(&principal), SystemRole::Member));
    assert!(!service.has_min_role(Some(&principal), SystemRole::Admin));
    assert!(service.require_min_role(&principal, SystemRole::Admin).is_err());
}

#[tokio::test]
async fn require_permission_reports_forbidden() {
    let principal = Principal::new("mia", OrganizationId::new(), SystemRole::Member, None);
    let service = service_with(FakeAuthorizationRepository::default());

    assert!(
        service
            .require_permission(&principal, "projects.view")
            .await
            .is_ok()
    );
    assert!(matches!(
        service.require_permission(&principal, "projects.edit").await,
        Err(AppError::Forbidden(_))
    ));
}

#[test]
fn compare_roles_orders_by_rank() {
    assert_eq!(
        AuthorizationService::compare_roles(SystemRole::Member, SystemRole::Admin),
        Ordering::Less
    );
    assert_eq!(
        AuthorizationService::compare_roles(SystemRole::Admin, SystemRole::Admin),
        Ordering::Equal
    );
    assert_eq!(
        AuthorizationService::compare_roles(SystemRole::Superadmin, SystemRole::Admin),
        Ordering::Greater
    );
}
