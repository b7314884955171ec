// Copyright © 2025 leadgate.dev
// Licensed under LeadGate License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::lead::Lead;
use crate::modules::property::Property;
use crate::modules::rest::api::ApiTags;
use crate::modules::rest::ApiResult;
use poem_openapi::param::Path;
use poem_openapi::payload::Json;
use poem_openapi::OpenApi;

/// Read-only view over ingested leads and imported properties.
pub struct CrmApi;

#[OpenApi(prefix_path = "/api/v1", tag = "ApiTags::Crm")]
impl CrmApi {
    /// List every lead owned by a company
    #[oai(
        path = "/companies/:company_id/leads",
        method = "get",
        operation_id = "list_leads"
    )]
    async fn list_leads(&self, company_id: Path<u64>) -> ApiResult<Json<Vec<Lead>>> {
        Ok(Json(Lead::list_by_company(company_id.0).await?))
    }

    /// Get lead details by lead ID
    #[oai(path = "/lead/:lead_id", method = "get", operation_id = "get_lead")]
    async fn get_lead(&self, lead_id: Path<u64>) -> ApiResult<Json<Lead>> {
        Ok(Json(Lead::get(lead_id.0).await?))
    }

    /// List every property owned by a company
    #[oai(
        path = "/companies/:company_id/properties",
        method = "get",
        operation_id = "list_properties"
    )]
    async fn list_properties(&self, company_id: Path<u64>) -> ApiResult<Json<Vec<Property>>> {
        Ok(Json(Property::list_by_company(company_id.0).await?))
    }

    /// Get property details by property ID
    #[oai(
        path = "/property/:property_id",
        method = "get",
        operation_id = "get_property"
    )]
    async fn get_property(&self, property_id: Path<u64>) -> ApiResult<Json<Property>> {
        Ok(Json(Property::get(property_id.0).await?))
    }
}
