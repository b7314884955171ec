// Copyright © 2025 leadgate.dev
// Licensed under LeadGate License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::context::LeadGateTask;
use crate::modules::ledger::ProcessedMessage;
use crate::modules::scheduler::periodic::PeriodicTask;
use crate::modules::settings::cli::SETTINGS;
use crate::utc_now;
use std::time::Duration;
use tracing::info;

const PRUNE_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

pub struct PeriodicTasks;

impl PeriodicTasks {
    pub fn start_background_tasks() {
        LedgerPruneTask::start();
    }
}

/// Deletes processed-message ledger rows older than the configured
/// retention window. The ledger only has to outlive the window in which a
/// message could still show up as unread, so old rows are pure dead weight.
pub struct LedgerPruneTask;

impl LeadGateTask for LedgerPruneTask {
    fn start() {
        let periodic_task = PeriodicTask::new("ledger-prune");

        let task = move |_: Option<u64>| {
            Box::pin(async move {
                let retention_days = SETTINGS.leadgate_ledger_retention_days as i64;
                let cutoff = utc_now!() - retention_days * DAY_MS;
                let removed = ProcessedMessage::prune_older_than(cutoff).await?;
                if removed > 0 {
                    info!(removed, "Pruned expired processed-message ledger entries");
                }
                Ok(())
            })
        };

        periodic_task.start(task, None, PRUNE_INTERVAL, false, false);
    }
}
