// Copyright © 2025 leadgate.dev
// Licensed under LeadGate License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::config::mailbox::{MailboxConfig, MailboxConfigCreateRequest};
use crate::modules::error::code::ErrorCode;
use crate::modules::rest::api::ApiTags;
use crate::modules::rest::ApiResult;
use crate::raise_error;
use poem_openapi::param::Path;
use poem_openapi::payload::Json;
use poem_openapi::{Object, OpenApi};

pub struct MailboxApi;

#[derive(Debug, Object)]
pub struct MailboxEnabledRequest {
    pub enabled: bool,
}

#[OpenApi(prefix_path = "/api/v1", tag = "ApiTags::Mailbox")]
impl MailboxApi {
    /// Enrolls a tenant mailbox for polling.
    ///
    /// Credentials are encrypted before the config is stored; the returned
    /// config carries ciphertext, never the plaintext secrets. The worker
    /// for this mailbox starts on the supervisor's next reconciliation pass.
    #[oai(path = "/mailbox", method = "post", operation_id = "create_mailbox")]
    async fn create_mailbox(
        &self,
        /// Mailbox enrollment payload
        payload: Json<MailboxConfigCreateRequest>,
    ) -> ApiResult<Json<MailboxConfig>> {
        let config = MailboxConfig::create(payload.0)?;
        config.save().await?;
        Ok(Json(config))
    }

    /// Get the mailbox configuration of a company
    #[oai(
        path = "/mailbox/:company_id",
        method = "get",
        operation_id = "get_mailbox"
    )]
    async fn get_mailbox(&self, company_id: Path<u64>) -> ApiResult<Json<MailboxConfig>> {
        let company_id = company_id.0;
        let config = MailboxConfig::find_by_company(company_id)
            .await?
            .ok_or_else(|| {
                raise_error!(
                    format!("No mailbox configuration for company {company_id}"),
                    ErrorCode::ResourceNotFound
                )
            })?;
        Ok(Json(config))
    }

    /// Enables or disables polling for a company's mailbox.
    ///
    /// Takes effect on the supervisor's next reconciliation pass, never
    /// mid-cycle.
    #[oai(
        path = "/mailbox/:company_id/enabled",
        method = "post",
        operation_id = "set_mailbox_enabled"
    )]
    async fn set_mailbox_enabled(
        &self,
        company_id: Path<u64>,
        payload: Json<MailboxEnabledRequest>,
    ) -> ApiResult<()> {
        Ok(MailboxConfig::set_enabled(company_id.0, payload.0.enabled).await?)
    }

    /// Removes a company's mailbox configuration. A running worker stops on
    /// the next reconciliation pass.
    #[oai(
        path = "/mailbox/:company_id",
        method = "delete",
        operation_id = "remove_mailbox"
    )]
    async fn remove_mailbox(&self, company_id: Path<u64>) -> ApiResult<()> {
        Ok(MailboxConfig::delete(company_id.0).await?)
    }
}
