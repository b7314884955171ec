// Copyright © 2025 leadgate.dev
// Licensed under LeadGate License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::error::code::ErrorCode;
use crate::modules::error::handler::error_handler;
use crate::modules::error::ApiErrorResponse;
use crate::modules::error::LeadGateResult;
use crate::modules::rest::public::status::get_status;
use crate::modules::{settings::cli::SETTINGS, utils::shutdown::shutdown_signal};
use crate::raise_error;
use api::create_openapi_service;
use poem::get;
use poem::listener::TcpListener;
use poem::middleware::{CatchPanic, Cors};
use poem::{EndpointExt, Route, Server};
use std::time::Duration;

pub mod api;
pub mod public;

pub type ApiResult<T, E = ApiErrorResponse> = std::result::Result<T, E>;

const DESCRIPTION: &str = r#"
    LeadGate turns real-estate portal notification emails and external
    listings catalogs into CRM leads and properties.

    - Polls tenant mailboxes over IMAP or the Gmail API and parses portal
      notifications into leads, deduplicated by a processed-message ledger.
    - Pulls the full external listings catalog on demand and upserts
      properties idempotently by their portal reference.
"#;

pub async fn start_http_server() -> LeadGateResult<()> {
    let listener = TcpListener::bind((
        SETTINGS
            .leadgate_bind_ip
            .clone()
            .unwrap_or("0.0.0.0".into()),
        SETTINGS.leadgate_http_port as u16,
    ));

    let api_service = create_openapi_service()
        .description(DESCRIPTION)
        .summary("Mailbox-to-lead ingestion and listings synchronization");

    let swagger = api_service.swagger_ui();
    let spec_json = api_service.spec_endpoint();
    let spec_yaml = api_service.spec_endpoint_yaml();

    let route = Route::new()
        .nest("/api-docs/swagger", swagger)
        .nest("/api-docs/spec.json", spec_json)
        .nest("/api-docs/spec.yaml", spec_yaml)
        .nest("/api/status", get(get_status))
        .nest_no_strip("/api/v1", api_service)
        .with(Cors::new())
        .with(CatchPanic::new());

    let server = Server::new(listener)
        .name("LeadGate API Service")
        .idle_timeout(Duration::from_secs(60))
        .run_with_graceful_shutdown(
            route.catch_all_error(error_handler),
            shutdown_signal(),
            Some(Duration::from_secs(5)),
        );
    println!(
        "LeadGate API Service is now running on port {}.",
        SETTINGS.leadgate_http_port
    );
    server
        .await
        .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))
}
