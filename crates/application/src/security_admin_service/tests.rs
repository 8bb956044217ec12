use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use atrium_core::{AppError, AppResult, OrganizationId};
use atrium_domain::{AuditAction, CustomRole, CustomRoleId, PermissionRegistry, Principal, SystemRole};

use crate::security_admin_ports::{
    CreateCustomRoleInput, CustomRoleRepository, UpdateCustomRoleInput,
};
use crate::{
    AuditEvent, AuditRepository, AuthorizationRepository, AuthorizationService, LifecycleGuard,
};

use super::SecurityAdminService;

#[derive(Default)]
struct FakeCustomRoleRepository {
    roles: Mutex<HashMap<CustomRoleId, CustomRole>>,
}

#[async_trait]
impl AuthorizationRepository for FakeCustomRoleRepository {
    async fn find_custom_role(
        &self,
        organization_id: OrganizationId,
        custom_role_id: CustomRoleId,
    ) -> AppResult<Option<CustomRole>> {
        Ok(self
            .roles
            .lock()
            .await
            .get(&custom_role_id)
            .filter(|role| role.organization_id() == organization_id)
            .cloned())
    }
}

#[async_trait]
impl CustomRoleRepository for FakeCustomRoleRepository {
    async fn list_custom_roles(
        &self,
        organization_id: OrganizationId,
    ) -> AppResult<Vec<CustomRole>> {
        Ok(self
            .roles
            .lock()
            .await
            .values()
            .filter(|role| role.organization_id() == organization_id)
            .cloned()
            .collect())
    }

    async fn create_custom_role(
        &self,
        organization_id: OrganizationId,
        custom_role: CustomRole,
    ) -> AppResult<()> {
        let mut roles = self.roles.lock().await;
        if roles.values().any(|role| {
            role.organization_id() == organization_id && role.name() == custom_role.name()
        }) {
            return Err(AppError::Conflict(format!(
                "custom role '{}' already exists",
                custom_role.name().as_str()
            )));
        }

        roles.insert(custom_role.id(), custom_role);
        Ok(())
    }

    async fn update_custom_role(
        &self,
        organization_id: OrganizationId,
        custom_role: CustomRole,
        expected_version: i64,
    ) -> AppResult<CustomRole> {
        let mut roles = self.roles.lock().await;
        let current = roles
            .get(&custom_role.id())
            .filter(|role| role.organization_id() == organization_id)
            .ok_or_else(|| AppError::NotFound("custom role not found".to_owned()))?;

        if current.version() != expected_version {
            return Err(AppError::VersionConflict("stale custom role".to_owned()));
        }

        roles.insert(custom_role.id(), custom_role.clone());
        Ok(custom_role)
    }

    async fn delete_custom_role(
        &self,
        _organization_id: OrganizationId,
        custom_role_id: CustomRoleId,
    ) -> AppResult<()> {
        self.roles.lock().await.remove(&custom_role_id);
        Ok(())
    }
}

#[derive(Default)]
struct FakeAuditRepository {
    events: Mutex<Vec<AuditEvent>>,
}

#[async_trait]
impl AuditRepository for FakeAuditRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        self.events.lock().await.push(event);
        Ok(())
    }
}

fn service() -> (SecurityAdminService, Arc<FakeAuditRepository>) {
    let registry = PermissionRegistry::standard().unwrap_or_else(|error| panic!("{error}"));
    let repository = Arc::new(FakeCustomRoleRepository::default());
    let audit = Arc::new(FakeAuditRepository::default());
    let guard = LifecycleGuard::new(AuthorizationService::new(
        Arc::new(registry),
        repository.clone(),
    ));

    (
        SecurityAdminService::new(guard, repository, audit.clone()),
        audit,
    )
}

fn actor(organization_id: OrganizationId, role: SystemRole) -> Principal {
    Principal::new("actor", organization_id, role, None)
}

fn create_input(name: &str, permissions: &[&str]) -> CreateCustomRoleInput {
    CreateCustomRoleInput {
        name: name.to_owned(),
        description: Some("Reviewers of client work".to_owned()),
        permissions: permissions.iter().map(|value| (*value).to_owned()).collect(),
    }
}

#[tokio::test]
async fn superadmin_creates_and_lists_custom_roles() {
    let (service, audit) = service();
    let organization_id = OrganizationId::new();
    let superadmin = actor(organization_id, SystemRole::Superadmin);

    let created = service
        .create_custom_role(
            &superadmin,
            create_input("Reviewer", &["projects.view", "clients.view", "projects.view"]),
        )
        .await;
    assert!(created.as_ref().is_ok_and(|role| {
        role.version() == 1 && role.permissions().len() == 2
    }));

    let listed = service.list_custom_roles(&superadmin).await;
    assert!(listed.is_ok_and(|roles| roles.len() == 1));

    let other = service
        .list_custom_roles(&actor(OrganizationId::new(), SystemRole::Superadmin))
        .await;
    assert!(other.is_ok_and(|roles| roles.is_empty()));

    let events = audit.events.lock().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].action, AuditAction::SecurityRoleCreated);
}

#[tokio::test]
async fn admin_may_view_but_not_manage_roles() {
    let (service, _) = service();
    let admin = actor(OrganizationId::new(), SystemRole::Admin);

    assert!(service.list_custom_roles(&admin).await.is_ok());
    assert!(service.list_permissions(&admin).await.is_ok());
    assert!(matches!(
        service
            .create_custom_role(&admin, create_input("Reviewer", &["projects.view"]))
            .await,
        Err(AppError::Forbidden(_))
    ));

    let member = actor(OrganizationId::new(), SystemRole::Member);
    assert!(matches!(
        service.list_permissions(&member).await,
        Err(AppError::Forbidden(_))
    ));
}

#[tokio::test]
async fn create_rejects_unregistered_and_pattern_permissions() {
    let (service, _) = service();
    let superadmin = actor(OrganizationId::new(), SystemRole::Superadmin);

    for permissions in [
        &["projects.archive"][..],
        &["projects.*"][..],
        &[][..],
        &["*", "projects.view"][..],
    ] {
        let result = service
            .create_custom_role(&superadmin, create_input("Broken", permissions))
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}

#[tokio::test]
async fn duplicate_role_names_conflict() {
    let (service, _) = service();
    let superadmin = actor(OrganizationId::new(), SystemRole::Superadmin);

    let first = service
        .create_custom_role(&superadmin, create_input("Reviewer", &["projects.view"]))
        .await;
    assert!(first.is_ok());

    let second = service
        .create_custom_role(&superadmin, create_input("Reviewer", &["clients.view"]))
        .await;
    assert!(matches!(second, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn update_requires_current_version() {
    let (service, audit) = service();
    let superadmin = actor(OrganizationId::new(), SystemRole::Superadmin);
    let created = service
        .create_custom_role(&superadmin, create_input("Reviewer", &["projects.view"]))
        .await
        .unwrap_or_else(|error| panic!("{error}"));

    let update = |expected_version| UpdateCustomRoleInput {
        name: "Senior reviewer".to_owned(),
        description: None,
        permissions: vec!["projects.view".to_owned(), "projects.edit".to_owned()],
        expected_version,
    };

    let updated = service
        .update_custom_role(&superadmin, created.id(), update(1))
        .await;
    assert!(updated.is_ok_and(|role| {
        role.version() == 2 && role.name().as_str() == "Senior reviewer"
    }));

    let stale = service
        .update_custom_role(&superadmin, created.id(), update(1))
        .await;
    assert!(matches!(stale, Err(AppError::VersionConflict(_))));
    assert_eq!(
        audit.events.lock().await[1].action,
        AuditAction::SecurityRoleUpdated
    );
}

#[tokio::test]
async fn wildcard_roles_are_reserved_for_superadmins() {
    let (service, _) = service();
    let organization_id = OrganizationId::new();
    let superadmin = actor(organization_id, SystemRole::Superadmin);
    let manager_role = service
        .create_custom_role(&superadmin, create_input("Role managers", &["roles.view", "roles.manage"]))
        .await
        .unwrap_or_else(|error| panic!("{error}"));
    let manager = Principal::new(
        "manager",
        organization_id,
        SystemRole::Admin,
        Some(manager_role.id()),
    );

    assert!(matches!(
        service
            .create_custom_role(&manager, create_input("Everything", &["*"]))
            .await,
        Err(AppError::Forbidden(_))
    ));
    assert!(
        service
            .create_custom_role(&manager, create_input("Viewers", &["projects.view"]))
            .await
            .is_ok()
    );
    assert!(
        service
            .create_custom_role(&superadmin, create_input("Everything", &["*"]))
            .await
            .is_ok_and(|role| role.grants_everything())
    );
}

#[tokio::test]
async fn delete_removes_role_and_records_audit_event() {
    let (service, audit) = service();
    let superadmin = actor(OrganizationId::new(), SystemRole::Superadmin);
    let created = service
        .create_custom_role(&superadmin, create_input("Reviewer", &["projects.view"]))
        .await
        .unwrap_or_else(|error| panic!("{error}"));

    assert!(
        service
            .delete_custom_role(&superadmin, created.id())
            .await
            .is_ok()
    );
    assert!(matches!(
        service.get_custom_role(&superadmin, created.id()).await,
        Err(AppError::NotFound(_))
    ));
    assert_eq!(
        audit.events.lock().await[1].action,
        AuditAction::SecurityRoleDeleted
    );
}
