// Copyright © 2025 leadgate.dev
// Licensed under LeadGate License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::leadgate_version;
use crm::CrmApi;
use integration::IntegrationApi;
use mailbox::MailboxApi;
use poem_openapi::{OpenApiService, Tags};

pub mod crm;
pub mod integration;
pub mod mailbox;

#[derive(Tags)]
pub enum ApiTags {
    Integration,
    Mailbox,
    Crm,
}

type LeadGateOpenApi = (IntegrationApi, MailboxApi, CrmApi);

pub fn create_openapi_service() -> OpenApiService<LeadGateOpenApi, ()> {
    OpenApiService::new(
        (IntegrationApi, MailboxApi, CrmApi),
        "LeadGateApi",
        leadgate_version!(),
    )
}
