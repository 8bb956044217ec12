use atrium_application::{CompanyListQuery, DEFAULT_COMPANY_PAGE_SIZE, UpdateCompanyInput};
use atrium_domain::{Company, CompanyDetails};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::common::timestamp;

/// Incoming payload for company creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/create-company-request.ts"
)]
pub struct CreateCompanyRequest {
    pub name: String,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
}

/// Incoming payload for company edits.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/update-company-request.ts"
)]
pub struct UpdateCompanyRequest {
    pub name: String,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    pub expected_version: i64,
}

/// Query string accepted by the company listing.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/company-list-params.ts"
)]
pub struct CompanyListParams {
    pub search: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// API representation of a company.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/company-response.ts"
)]
pub struct CompanyResponse {
    pub company_id: String,
    pub name: String,
    pub website: Option<String>,
    pub industry: Option<String>,
    pub version: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<CreateCompanyRequest> for CompanyDetails {
    fn from(value: CreateCompanyRequest) -> Self {
        Self {
            name: value.name,
            website: value.website,
            industry: value.industry,
        }
    }
}

impl From<UpdateCompanyRequest> for UpdateCompanyInput {
    fn from(value: UpdateCompanyRequest) -> Self {
        Self {
            details: CompanyDetails {
                name: value.name,
                website: value.website,
                industry: value.industry,
            },
            expected_version: value.expected_version,
        }
    }
}

impl From<CompanyListParams> for CompanyListQuery {
    fn from(value: CompanyListParams) -> Self {
        Self {
            search: value.search.filter(|search| !search.trim().is_empty()),
            limit: value.limit.unwrap_or(DEFAULT_COMPANY_PAGE_SIZE),
            offset: value.offset.unwrap_or_default(),
        }
    }
}

impl From<Company> for CompanyResponse {
    fn from(value: Company) -> Self {
        let details = value.details();

        Self {
            company_id: value.id().to_string(),
            name: details.name.clone(),
            website: details.website.clone(),
            industry: details.industry.clone(),
            version: value.version(),
            created_at: timestamp(value.created_at()),
            updated_at: timestamp(value.updated_at()),
        }
    }
}
