// Copyright © 2025 leadgate.dev
// Licensed under LeadGate License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::config::integration::IntegrationConfig;
use crate::modules::error::code::ErrorCode;
use crate::modules::listings::ListingsClient;
use crate::modules::rest::api::ApiTags;
use crate::modules::rest::ApiResult;
use crate::modules::sync::status::{self, SyncPhase, SyncStatus};
use crate::modules::sync::SyncEngine;
use crate::raise_error;
use poem_openapi::param::Path;
use poem_openapi::payload::Json;
use poem_openapi::{Object, OpenApi};
use tracing::error;

pub struct IntegrationApi;

#[derive(Debug, Object)]
pub struct SyncTriggered {
    pub company_id: u64,
    pub message: String,
}

#[derive(Debug, Object)]
pub struct IntegrationConfigRequest {
    /// Plaintext listings API key; encrypted before it is stored
    pub api_key: String,
    pub agency_id: String,
}

#[derive(Debug, Object)]
pub struct ConnectionTested {
    pub company_id: u64,
    pub message: String,
}

#[derive(Debug, Object)]
pub struct SyncStatusResponse {
    /// "idle" when no sync ever ran, otherwise the phase of the current or
    /// most recent run
    pub state: String,
    pub status: Option<SyncStatus>,
}

#[OpenApi(prefix_path = "/api/v1", tag = "ApiTags::Integration")]
impl IntegrationApi {
    /// Creates or replaces a company's listings integration credentials.
    #[oai(
        path = "/integration/:company_id/config",
        method = "post",
        operation_id = "set_integration_config"
    )]
    async fn set_integration_config(
        &self,
        company_id: Path<u64>,
        /// Credentials payload
        payload: Json<IntegrationConfigRequest>,
    ) -> ApiResult<Json<IntegrationConfig>> {
        Ok(Json(
            IntegrationConfig::apply(company_id.0, &payload.0.api_key, &payload.0.agency_id)
                .await?,
        ))
    }

    /// Starts a full listings synchronization for a company.
    ///
    /// The job runs in the background; this call returns as soon as it is
    /// accepted. Progress is available from the status endpoint. A second
    /// trigger while a run is in flight is rejected.
    #[oai(
        path = "/integration/:company_id/sync",
        method = "post",
        operation_id = "trigger_sync"
    )]
    async fn trigger_sync(&self, company_id: Path<u64>) -> ApiResult<Json<SyncTriggered>> {
        let company_id = company_id.0;
        let config = IntegrationConfig::get_active(company_id).await?;
        if status::is_running(company_id) {
            return Err(raise_error!(
                format!("A sync is already running for company {company_id}"),
                ErrorCode::SyncAlreadyRunning
            )
            .into());
        }
        let api_key = config.decrypted_api_key()?;
        let client = ListingsClient::new()?;

        // Detached: the job outlives this request
        tokio::spawn(async move {
            let engine = SyncEngine::new(client);
            if let Err(e) = engine
                .sync_all(company_id, &api_key, &config.agency_id)
                .await
            {
                error!(company_id, "Listings sync failed: {e}");
            }
        });

        Ok(Json(SyncTriggered {
            company_id,
            message: "Synchronization started".into(),
        }))
    }

    /// Probes the listings API with a company's stored credentials.
    #[oai(
        path = "/integration/:company_id/test",
        method = "post",
        operation_id = "test_connection"
    )]
    async fn test_connection(&self, company_id: Path<u64>) -> ApiResult<Json<ConnectionTested>> {
        let config = IntegrationConfig::get_active(company_id.0).await?;
        let api_key = config.decrypted_api_key()?;
        let client = ListingsClient::new()?;
        client.test_connection(&api_key, &config.agency_id).await?;
        Ok(Json(ConnectionTested {
            company_id: company_id.0,
            message: "Connection successful".into(),
        }))
    }

    /// Returns the current or most recent sync status for a company.
    #[oai(
        path = "/integration/:company_id/sync/status",
        method = "get",
        operation_id = "get_sync_status"
    )]
    async fn get_sync_status(&self, company_id: Path<u64>) -> ApiResult<Json<SyncStatusResponse>> {
        let snapshot = status::snapshot(company_id.0);
        let state = match &snapshot {
            None => "idle",
            Some(s) => match s.phase {
                SyncPhase::Running => "running",
                SyncPhase::Completed => "completed",
                SyncPhase::Failed => "failed",
            },
        };
        Ok(Json(SyncStatusResponse {
            state: state.into(),
            status: snapshot,
        }))
    }
}
