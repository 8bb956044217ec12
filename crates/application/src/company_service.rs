use std::sync::Arc;

use atrium_core::AppResult;
use atrium_domain::{AuditAction, Company, CompanyDetails, CompanyId, Principal, permissions};
use chrono::Utc;

use crate::company_ports::{
    CompanyListQuery, CompanyRepository, MAX_COMPANY_PAGE_SIZE, UpdateCompanyInput,
};
use crate::{AuditEvent, AuditRepository, LifecycleGuard};


/// Application service for company management.
#[derive(Clone)]
pub struct CompanyService {
    guard: LifecycleGuard,
    repository: Arc<dyn CompanyRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl CompanyService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        guard: LifecycleGuard,
        repository: Arc<dyn CompanyRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            guard,
            repository,
            audit_repository,
        }
    }

    /// Creates a company at version 1.
    pub async fn create_company(
        &self,
        actor: &Principal,
        details: CompanyDetails,
    ) -> AppResult<Company> {
        self.guard
            .authorize(actor, permissions::COMPANIES_CREATE)
            .await?;

        let company = Company::create(actor.organization_id(), details, Utc::now())?;
        self.repository
            .create_company(actor.organization_id(), company.clone())
            .await?;

        Ok(company)
    }

    /// Lists companies of the actor's organization.
    pub async fn list_companies(
        &self,
        actor: &Principal,
        query: CompanyListQuery,
    ) -> AppResult<Vec<Company>> {
        self.guard
            .authorize(actor, permissions::COMPANIES_VIEW)
            .await?;

        let query = CompanyListQuery {
            limit: query.limit.clamp(1, MAX_COMPANY_PAGE_SIZE),
            ..query
        };

        self.repository
            .list_companies(actor.organization_id(), query)
            .await
    }

    /// Returns one company.
    pub async fn get_company(&self, actor: &Principal, company_id: CompanyId) -> AppResult<Company> {
        self.guard
            .authorize(actor, permissions::COMPANIES_VIEW)
            .await?;

        self.load_company(actor, company_id).await
    }

    /// Replaces company attributes when the caller's version is current.
    pub async fn update_company(
        &self,
        actor: &Principal,
        company_id: CompanyId,
        input: UpdateCompanyInput,
    ) -> AppResult<Company> {
        self.guard
            .authorize(actor, permissions::COMPANIES_EDIT)
            .await?;

        let details = input.details.normalized()?;
        let current = self.load_company(actor, company_id).await?;
        self.guard
            .ensure_version("company", current.version(), input.expected_version)?;

        self.repository
            .update_company(
                actor.organization_id(),
                company_id,
                details,
                input.expected_version,
            )
            .await
    }

    /// Permanently removes a company and emits an audit event.
    pub async fn delete_company(&self, actor: &Principal, company_id: CompanyId) -> AppResult<()> {
        self.guard
            .authorize(actor, permissions::COMPANIES_DELETE)
            .await?;

        let company = self.load_company(actor, company_id).await?;
        self.repository
            .delete_company(actor.organization_id(), company_id)
            .await?;

        self.audit_repository
            .append_event(AuditEvent {
                organization_id: actor.organization_id(),
                subject: actor.subject().to_owned(),
                action: AuditAction::CompanyDeleted,
                resource_type: "company".to_owned(),
                resource_id: company_id.to_string(),
                detail: Some(format!("deleted company '{}'", company.details().name)),
            })
            .await
    }

    async fn load_company(&self, actor: &Principal, company_id: CompanyId) -> AppResult<Company> {
        let company = self
            .repository
            .find_company(actor.organization_id(), company_id)
            .await?;

        self.guard.require_found("company", company_id, company)
    }
}
