// Copyright © 2025 leadgate.dev
// Licensed under LeadGate License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::config::mailbox::MailboxConfig;
use crate::modules::error::LeadGateResult;
use crate::modules::scheduler::periodic::{PeriodicTask, TaskHandle};
use crate::modules::settings::cli::SETTINGS;
use crate::modules::transport::MailTransport;
use crate::modules::worker::CompanyMailWorker;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

const RECONCILE_INTERVAL_DEV_SECS: u64 = 60;
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

pub static MAIL_WORKER_SUPERVISOR: LazyLock<MailWorkerSupervisor> =
    LazyLock::new(MailWorkerSupervisor::new);

/// Keeps one running `CompanyMailWorker` per enabled mailbox config.
///
/// Reconciliation is timer-driven only: enabling or disabling a mailbox
/// takes effect on the next pass, never mid-cycle. A config edit on an
/// already-running tenant is picked up once that tenant's worker is
/// restarted (disable, wait a pass, re-enable).
pub struct MailWorkerSupervisor {
    workers: RwLock<HashMap<u64, TaskHandle>>,
}

impl MailWorkerSupervisor {
    fn new() -> Self {
        Self {
            workers: RwLock::new(HashMap::new()),
        }
    }

    /// Starts the reconciliation loop. The first pass runs immediately so
    /// workers exist before the first poll interval elapses.
    pub fn start(&'static self) {
        let interval = Duration::from_secs(if SETTINGS.is_development() {
            RECONCILE_INTERVAL_DEV_SECS
        } else {
            SETTINGS.leadgate_worker_reconcile_interval_secs
        });
        let periodic_task = PeriodicTask::new("mail-worker-reconcile");
        periodic_task.start(
            move |_| async move { self.reconcile().await },
            None,
            interval,
            false,
            true,
        );
    }

    pub async fn reconcile(&self) -> LeadGateResult<()> {
        let configs = MailboxConfig::list_enabled().await?;
        let enabled: HashSet<u64> = configs.iter().map(|c| c.company_id).collect();

        // Tear down workers whose mailbox was disabled or removed
        let stale: Vec<u64> = {
            let workers = self.workers.read().await;
            workers
                .keys()
                .filter(|company_id| !enabled.contains(company_id))
                .copied()
                .collect()
        };
        for company_id in stale {
            let handle = self.workers.write().await.remove(&company_id);
            if let Some(handle) = handle {
                handle.cancel().await;
                info!(company_id, "Stopped mail worker for disabled mailbox");
            }
        }

        // Bring up workers for configs that have none yet. A broken config
        // fails only its own tenant.
        for config in configs {
            if self.workers.read().await.contains_key(&config.company_id) {
                continue;
            }
            match Self::spawn_worker(&config) {
                Ok(handle) => {
                    info!(
                        company_id = config.company_id,
                        email = %config.imap_username,
                        poll_interval_secs = config.poll_interval_secs,
                        "Started mail worker"
                    );
                    self.workers.write().await.insert(config.company_id, handle);
                }
                Err(e) => {
                    warn!(
                        company_id = config.company_id,
                        "Failed to start mail worker: {e}"
                    );
                }
            }
        }
        Ok(())
    }

    fn spawn_worker(config: &MailboxConfig) -> LeadGateResult<TaskHandle> {
        let transport = MailTransport::from_config(config)?;
        let worker = Arc::new(Mutex::new(CompanyMailWorker::new(
            config.company_id,
            transport,
        )));
        let periodic_task = PeriodicTask::new(&format!("mail-worker-{}", config.company_id));
        Ok(periodic_task.start(
            move |_| {
                let worker = worker.clone();
                async move { worker.lock().await.poll_cycle().await }
            },
            Some(config.company_id),
            Duration::from_secs(config.poll_interval_secs.max(1)),
            true,
            true,
        ))
    }

    pub async fn worker_count(&self) -> usize {
        self.workers.read().await.len()
    }

    /// Cancels every worker and waits a bounded grace period. In-flight
    /// poll cycles get to finish; the loop itself stops before the next
    /// tick.
    pub async fn shutdown(&self) {
        let handles: Vec<TaskHandle> = {
            let mut workers = self.workers.write().await;
            workers.drain().map(|(_, handle)| handle).collect()
        };
        let total = handles.len();
        if total == 0 {
            return;
        }
        info!("Stopping {total} mail worker(s)");
        let all = futures::future::join_all(handles.into_iter().map(|h| h.cancel()));
        if tokio::time::timeout(SHUTDOWN_GRACE, all).await.is_err() {
            warn!("Timed out waiting for mail workers to stop");
        }
    }
}
