// Copyright © 2025 leadgate.dev
// Licensed under LeadGate License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::utc_now;
use dashmap::DashMap;
use poem_openapi::{Enum, Object};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Live and most-recent sync state per company. Entries are never removed;
/// the last run stays visible until the process restarts.
static SYNC_STATUSES: LazyLock<DashMap<u64, SyncStatus>> = LazyLock::new(DashMap::new);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize, Enum)]
#[oai(rename_all = "lowercase")]
pub enum SyncPhase {
    Running,
    Completed,
    Failed,
}

#[derive(Clone, Debug, Deserialize, Serialize, Object)]
pub struct SyncStatus {
    pub phase: SyncPhase,
    pub total_properties: u32,
    pub processed: u32,
    pub created: u32,
    pub updated: u32,
    pub errors: u32,
    /// UNIX epoch milliseconds
    pub started_at: i64,
    pub completed_at: Option<i64>,
    pub error_message: Option<String>,
    pub current_page: u32,
    pub total_pages: u32,
}

impl SyncStatus {
    fn running_now() -> Self {
        Self {
            phase: SyncPhase::Running,
            total_properties: 0,
            processed: 0,
            created: 0,
            updated: 0,
            errors: 0,
            started_at: utc_now!(),
            completed_at: None,
            error_message: None,
            current_page: 0,
            total_pages: 0,
        }
    }
}

/// Atomically claims the sync slot for a company. Returns false when a run
/// is already in flight, leaving the existing entry untouched.
pub fn try_begin(company_id: u64) -> bool {
    let mut claimed = false;
    let mut entry = SYNC_STATUSES
        .entry(company_id)
        .or_insert_with(|| {
            claimed = true;
            SyncStatus::running_now()
        });
    if claimed {
        return true;
    }
    if entry.phase == SyncPhase::Running {
        return false;
    }
    *entry.value_mut() = SyncStatus::running_now();
    true
}

pub fn update<F: FnOnce(&mut SyncStatus)>(company_id: u64, updater: F) {
    if let Some(mut entry) = SYNC_STATUSES.get_mut(&company_id) {
        updater(entry.value_mut());
    }
}

/// Copy of the current status so observers never hold a map lock.
pub fn snapshot(company_id: u64) -> Option<SyncStatus> {
    SYNC_STATUSES.get(&company_id).map(|e| e.value().clone())
}

pub fn is_running(company_id: u64) -> bool {
    snapshot(company_id).is_some_and(|s| s.phase == SyncPhase::Running)
}
