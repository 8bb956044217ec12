use async_trait::async_trait;
use atrium_core::{AppResult, OrganizationId};
use atrium_domain::{Company, CompanyDetails, CompanyId};

/// Default page size for company listings.
pub const DEFAULT_COMPANY_PAGE_SIZE: usize = 50;
/// Largest page size accepted for company listings.
pub const MAX_COMPANY_PAGE_SIZE: usize = 200;

/// Query inputs for company listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyListQuery {
    /// Case-insensitive match on name or industry.
    pub search: Option<String>,
    /// Maximum rows returned.
    pub limit: usize,
    /// Number of rows skipped for offset pagination.
    pub offset: usize,
}

impl Default for CompanyListQuery {
    fn default() -> Self {
        Self {
            search: None,
            limit: DEFAULT_COMPANY_PAGE_SIZE,
            offset: 0,
        }
    }
}

impl CompanyListQuery {
    /// Returns whether a company satisfies the search filter.
    #[must_use]
    pub fn matches(&self, company: &Company) -> bool {
        let Some(search) = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|search| !search.is_empty())
        else {
            return true;
        };

        let needle = search.to_lowercase();
        let details = company.details();
        details.name.to_lowercase().contains(&needle)
            || details
                .industry
                .as_deref()
                .is_some_and(|industry| industry.to_lowercase().contains(&needle))
    }
}

/// Input payload for company updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateCompanyInput {
    /// Replacement attributes.
    pub details: CompanyDetails,
    /// Version the caller last read.
    pub expected_version: i64,
}

/// Repository port for organization-scoped company storage.
#[async_trait]
pub trait CompanyRepository: Send + Sync {
    /// Persists a new company.
    async fn create_company(
        &self,
        organization_id: OrganizationId,
        company: Company,
    ) -> AppResult<()>;

    /// Lists companies ordered by name.
    async fn list_companies(
        &self,
        organization_id: OrganizationId,
        query: CompanyListQuery,
    ) -> AppResult<Vec<Company>>;

    /// Finds a company in the organization scope.
    async fn find_company(
        &self,
        organization_id: OrganizationId,
        company_id: CompanyId,
    ) -> AppResult<Option<Company>>;

    /// Replaces attributes when the version still matches.
    async fn update_company(
        &self,
        organization_id: OrganizationId,
        company_id: CompanyId,
        details: CompanyDetails,
        expected_version: i64,
    ) -> AppResult<Company>;

    /// Permanently removes a company.
    async fn delete_company(
        &self,
        organization_id: OrganizationId,
        company_id: CompanyId,
    ) -> AppResult<()>;
}
