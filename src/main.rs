// Copyright © 2025 leadgate.dev
// Licensed under LeadGate License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use mimalloc::MiMalloc;
use modules::{
    common::rustls::LeadGateTls,
    common::signal::SignalManager,
    context::Initialize,
    database::manager::DatabaseManager,
    error::{code::ErrorCode, LeadGateResult},
    logger,
    rest::start_http_server,
    settings::dir::DataDirManager,
    tasks::PeriodicTasks,
    worker::supervisor::MAIL_WORKER_SUPERVISOR,
};
use tracing::{error, info};

mod modules;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

static LOGO: &str = r#"
  _                   _  ____       _
 | |    ___  __ _  __| |/ ___| __ _| |_ ___
 | |   / _ \/ _` |/ _` | |  _ / _` | __/ _ \
 | |__|  __/ (_| | (_| | |_| | (_| | ||  __/
 |_____\___|\__,_|\__,_|\____|\__,_|\__\___|

"#;

#[tokio::main]
async fn main() -> LeadGateResult<()> {
    logger::initialize_logging();
    info!("{}", LOGO);
    info!("Starting leadgate-server");
    info!("Version:  {}", leadgate_version!());

    if let Err(error) = initialize().await {
        eprintln!("{:?}", error);
        return Err(error);
    }

    start_server().await?;
    MAIL_WORKER_SUPERVISOR.shutdown().await;
    Ok(())
}

/// Initialize the system by validating settings and starting necessary tasks.
async fn initialize() -> LeadGateResult<()> {
    SignalManager::initialize().await?;
    DataDirManager::initialize().await?;
    DatabaseManager::initialize().await?;
    LeadGateTls::initialize().await?;
    modules::context::status::mark_started();
    MAIL_WORKER_SUPERVISOR.start();
    PeriodicTasks::start_background_tasks();
    Ok(())
}

async fn start_server() -> LeadGateResult<()> {
    let http_server = tokio::spawn(async move {
        let result = start_http_server().await;
        if let Err(e) = &result {
            error!("Failed to start REST server: {}", e);
        }
        result
    });

    http_server
        .await
        .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))??;
    Ok(())
}
