// Copyright © 2025 leadgate.dev
// Licensed under LeadGate License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use clap::{builder::ValueParser, Parser};
use std::sync::LazyLock;

#[cfg(not(test))]
pub static SETTINGS: LazyLock<Settings> = LazyLock::new(Settings::parse);

#[cfg(test)]
pub static SETTINGS: LazyLock<Settings> = LazyLock::new(Settings::new_for_test);

#[derive(Debug, Parser)]
#[clap(
    name = "leadgate",
    about = "A multi-tenant ingestion engine that turns real-estate portal
    notification emails and external listings catalogs into leads and properties.",
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Settings {
    /// leadgate log level (default: "info")
    #[clap(
        long,
        default_value = "info",
        env,
        help = "Set the log level for leadgate"
    )]
    pub leadgate_log_level: String,

    /// leadgate HTTP port (default: 15810)
    #[clap(
        long,
        default_value = "15810",
        env,
        help = "Set the HTTP port for leadgate"
    )]
    pub leadgate_http_port: i32,

    /// The IP address that the server binds to, in IPv4 format.
    #[clap(
        long,
        env,
        default_value = "0.0.0.0",
        help = "The IP address that the server binds to, in IPv4 format (e.g., 192.168.1.1).",
        value_parser = ValueParser::new(|s: &str| {
            if s.parse::<std::net::Ipv4Addr>().is_err() {
                return Err("The bind IP address must be a valid IPv4 address.".to_string());
            }
            Ok(s.to_string())
        })
    )]
    pub leadgate_bind_ip: Option<String>,

    /// Enable ANSI logs (default: true)
    #[clap(long, default_value = "true", env, help = "Enable ANSI formatted logs")]
    pub leadgate_ansi_logs: bool,

    /// Enable log file output (default: false)
    /// If false, logs will be printed to stdout
    #[clap(
        long,
        default_value = "false",
        env,
        help = "Enable log file output (otherwise logs go to stdout)"
    )]
    pub leadgate_log_to_file: bool,

    #[clap(
        long,
        default_value = "5",
        env,
        help = "Set the maximum number of server log files"
    )]
    pub leadgate_max_server_log_files: usize,

    #[clap(
        long,
        default_value = "./leadgate_data",
        env,
        help = "Set the data directory for leadgate"
    )]
    pub leadgate_root_dir: String,

    #[clap(
        long,
        default_value = "change-this-default-password-now",
        env,
        help = "Set the encryption password for stored mailbox and API credentials. ⚠️ Change this default in production!"
    )]
    pub leadgate_encrypt_password: String,

    /// Deployment environment; "development" shortens the worker
    /// reconciliation interval for faster config turnaround.
    #[clap(
        long,
        default_value = "production",
        env,
        help = "Deployment environment: production | development"
    )]
    pub leadgate_env: String,

    #[clap(
        long,
        default_value = "false",
        env,
        help = "Keep metadata in memory instead of on disk (testing and ephemeral deployments)"
    )]
    pub leadgate_metadata_memory_mode_enabled: bool,

    #[clap(
        long,
        env,
        help = "Set the metadata database cache size in bytes (default 128MB)"
    )]
    pub leadgate_metadata_cache_size: Option<u64>,

    #[clap(
        long,
        default_value = "600",
        env,
        help = "Interval in seconds between mail worker reconciliation passes"
    )]
    pub leadgate_worker_reconcile_interval_secs: u64,

    #[clap(
        long,
        default_value = "50",
        env,
        help = "Page size used when pulling the external listings catalog",
        value_parser = clap::value_parser!(u32).range(1..=100)
    )]
    pub leadgate_sync_page_size: u32,

    #[clap(
        long,
        default_value = "10",
        env,
        help = "Maximum number of concurrent property upserts per sync job",
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub leadgate_sync_workers: u32,

    #[clap(
        long,
        default_value = "30",
        env,
        help = "Days to keep processed-message ledger records before pruning"
    )]
    pub leadgate_ledger_retention_days: u32,

    /// Google OAuth2 client id used to refresh Gmail mailbox tokens.
    #[clap(long, env, help = "Google OAuth2 client id for Gmail mailboxes")]
    pub leadgate_google_client_id: Option<String>,

    /// Google OAuth2 client secret used to refresh Gmail mailbox tokens.
    #[clap(long, env, help = "Google OAuth2 client secret for Gmail mailboxes")]
    pub leadgate_google_client_secret: Option<String>,
}

impl Settings {
    pub fn is_development(&self) -> bool {
        self.leadgate_env.eq_ignore_ascii_case("development")
    }

    #[cfg(test)]
    fn new_for_test() -> Self {
        Self {
            leadgate_log_level: "info".to_string(),
            leadgate_http_port: 15810,
            leadgate_bind_ip: None,
            leadgate_ansi_logs: false,
            leadgate_log_to_file: false,
            leadgate_max_server_log_files: 5,
            leadgate_root_dir: "./leadgate_test_data".to_string(),
            leadgate_encrypt_password: "test-encrypt-password".to_string(),
            leadgate_env: "development".to_string(),
            leadgate_metadata_memory_mode_enabled: true,
            leadgate_metadata_cache_size: None,
            leadgate_worker_reconcile_interval_secs: 60,
            leadgate_sync_page_size: 50,
            leadgate_sync_workers: 10,
            leadgate_ledger_retention_days: 30,
            leadgate_google_client_id: None,
            leadgate_google_client_secret: None,
        }
    }
}
