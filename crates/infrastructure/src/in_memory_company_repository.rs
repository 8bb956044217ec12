use std::collections::HashMap;

use async_trait::async_trait;
use atrium_application::{CompanyListQuery, CompanyRepository};
use atrium_core::{AppError, AppResult, OrganizationId};
use atrium_domain::{Company, CompanyDetails, CompanyId};
use chrono::Utc;
use tokio::sync::RwLock;

use crate::repository_errors::stale_or_missing;

/// In-memory company storage.
#[derive(Debug, Default)]
pub struct InMemoryCompanyRepository {
    companies: RwLock<HashMap<(OrganizationId, CompanyId), Company>>,
}

impl InMemoryCompanyRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CompanyRepository for InMemoryCompanyRepository {
    async fn create_company(
        &self,
        organization_id: OrganizationId,
        company: Company,
    ) -> AppResult<()> {
        let key = (organization_id, company.id());
        let mut companies = self.companies.write().await;

        if companies.contains_key(&key) {
            return Err(AppError::Conflict(format!(
                "company '{}' already exists",
                company.id()
            )));
        }

        companies.insert(key, company);
        Ok(())
    }

    async fn list_companies(
        &self,
        organization_id: OrganizationId,
        query: CompanyListQuery,
    ) -> AppResult<Vec<Company>> {
        let companies = self.companies.read().await;

        let mut values: Vec<Company> = companies
            .iter()
            .filter_map(|((stored_organization_id, _), company)| {
                (stored_organization_id == &organization_id && query.matches(company))
                    .then_some(company.clone())
            })
            .collect();
        values.sort_by(|left, right| left.details().name.cmp(&right.details().name));

        Ok(values
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .collect())
    }

    async fn find_company(
        &self,
        organization_id: OrganizationId,
        company_id: CompanyId,
    ) -> AppResult<Option<Company>> {
        Ok(self
            .companies
            .read()
            .await
            .get(&(organization_id, company_id))
            .cloned())
    }

    async fn update_company(
        &self,
        organization_id: OrganizationId,
        company_id: CompanyId,
        details: CompanyDetails,
        expected_version: i64,
    ) -> AppResult<Company> {
        let mut companies = self.companies.write().await;
        let company = companies
            .get_mut(&(organization_id, company_id))
            .filter(|company| company.version() == expected_version);

        let Some(company) = company else {
            let current = companies
                .get(&(organization_id, company_id))
                .map(Company::version);
            return Err(stale_or_missing(
                "company",
                company_id,
                current,
                expected_version,
            ));
        };

        company.apply_update(details, Utc::now())?;
        Ok(company.clone())
    }

    async fn delete_company(
        &self,
        organization_id: OrganizationId,
        company_id: CompanyId,
    ) -> AppResult<()> {
        self.companies
            .write()
            .await
            .remove(&(organization_id, company_id))
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("company '{company_id}' was not found")))
    }
}
