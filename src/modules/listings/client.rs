// Copyright © 2025 leadgate.dev
// Licensed under LeadGate License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::error::code::ErrorCode;
use crate::modules::error::LeadGateResult;
use crate::modules::listings::types::ListingsResponse;
use crate::raise_error;
use std::time::Duration;
use tracing::debug;

const LISTINGS_API_BASE: &str = "https://webapi.resales-online.com/V6";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Paginated access to the external listings catalog. The sync engine is
/// generic over this so tests can swap in a canned catalog.
pub trait ListingsApi: Send + Sync {
    fn search_properties(
        &self,
        api_key: &str,
        agency_id: &str,
        page: u32,
        page_size: u32,
    ) -> impl std::future::Future<Output = LeadGateResult<ListingsResponse>> + Send;
}

pub struct ListingsClient {
    base_url: String,
    http_client: reqwest::Client,
}

impl ListingsClient {
    pub fn new() -> LeadGateResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?;
        Ok(Self {
            base_url: LISTINGS_API_BASE.into(),
            http_client,
        })
    }

    /// Cheap credentials probe: a one-item search either authenticates or
    /// it doesn't.
    pub async fn test_connection(&self, api_key: &str, agency_id: &str) -> LeadGateResult<()> {
        self.search_properties(api_key, agency_id, 1, 1).await?;
        Ok(())
    }

    async fn get(&self, url: &str) -> LeadGateResult<ListingsResponse> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::NetworkError))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(raise_error!(
                format!("Listings API returned status code {status}: {body}"),
                ErrorCode::ListingsApiFailed
            ));
        }

        let envelope: ListingsResponse = response
            .json()
            .await
            .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::ListingsApiFailed))?;

        if envelope.transaction.status != "success" {
            return Err(raise_error!(
                format!(
                    "Listings API reported transaction status '{}'",
                    envelope.transaction.status
                ),
                ErrorCode::ListingsApiFailed
            ));
        }
        Ok(envelope)
    }
}

impl ListingsApi for ListingsClient {
    async fn search_properties(
        &self,
        api_key: &str,
        agency_id: &str,
        page: u32,
        page_size: u32,
    ) -> LeadGateResult<ListingsResponse> {
        let mut url = format!(
            "{}/SearchProperties?p1={agency_id}&p2={api_key}&p_agency_filterid=1&P_PageSize={page_size}",
            self.base_url
        );
        // The API treats a missing P_PageNo as page 1
        if page > 1 {
            url.push_str(&format!("&P_PageNo={page}"));
        }
        debug!(page, page_size, "Fetching listings page");
        self.get(&url).await
    }
}
