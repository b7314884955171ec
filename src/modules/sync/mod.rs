// Copyright © 2025 leadgate.dev
// Licensed under LeadGate License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::config::integration::IntegrationConfig;
use crate::modules::error::code::ErrorCode;
use crate::modules::error::LeadGateResult;
use crate::modules::listings::types::ListingItem;
use crate::modules::listings::{mapper, ListingsApi};
use crate::modules::property::Property;
use crate::modules::settings::cli::SETTINGS;
use crate::modules::sync::status::SyncPhase;
use crate::raise_error;
use crate::utc_now;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use tracing::{info, warn};

pub mod status;
#[cfg(test)]
mod tests;

#[derive(Clone, Debug, Serialize)]
pub struct SyncReport {
    pub synced: u32,
    pub created: u32,
    pub updated: u32,
    pub errors: u32,
    /// UNIX epoch milliseconds
    pub last_sync: i64,
}

#[derive(Default)]
struct Counters {
    processed: u32,
    created: u32,
    updated: u32,
    errors: u32,
}

/// Full-catalog synchronization against an external listings API.
///
/// Page fetches are sequential; mapping and upserting the items of a page
/// fan out onto a bounded pool. One failing page or item is counted and
/// skipped, never aborting the run — only a failing first page is fatal,
/// since without it there is no total to paginate over.
pub struct SyncEngine<C: ListingsApi> {
    client: C,
}

impl<C: ListingsApi + 'static> SyncEngine<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub async fn sync_all(
        &self,
        company_id: u64,
        api_key: &str,
        agency_id: &str,
    ) -> LeadGateResult<SyncReport> {
        if !status::try_begin(company_id) {
            return Err(raise_error!(
                format!("A sync is already running for company {company_id}"),
                ErrorCode::SyncAlreadyRunning
            ));
        }

        match self.run(company_id, api_key, agency_id).await {
            Ok(report) => {
                status::update(company_id, |s| {
                    s.phase = SyncPhase::Completed;
                    s.completed_at = Some(report.last_sync);
                });
                IntegrationConfig::mark_synced(company_id).await?;
                info!(
                    company_id,
                    created = report.created,
                    updated = report.updated,
                    errors = report.errors,
                    "Listings sync completed"
                );
                Ok(report)
            }
            Err(e) => {
                status::update(company_id, |s| {
                    s.phase = SyncPhase::Failed;
                    s.error_message = Some(e.to_string());
                    s.completed_at = Some(utc_now!());
                });
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        company_id: u64,
        api_key: &str,
        agency_id: &str,
    ) -> LeadGateResult<SyncReport> {
        let page_size = SETTINGS.leadgate_sync_page_size;
        let page1 = self
            .client
            .search_properties(api_key, agency_id, 1, page_size)
            .await?;

        let total_properties = page1
            .query_info
            .as_ref()
            .map(|q| q.property_count)
            .unwrap_or(page1.properties.len() as u32);
        let total_pages = total_properties.div_ceil(page_size).max(1);
        info!(
            company_id,
            total_properties, total_pages, "Starting listings sync"
        );
        status::update(company_id, |s| {
            s.total_properties = total_properties;
            s.total_pages = total_pages;
            s.current_page = 1;
        });

        let semaphore = Arc::new(Semaphore::new(SETTINGS.leadgate_sync_workers as usize));
        let counters = Arc::new(Mutex::new(Counters::default()));
        let mut join_set = JoinSet::new();

        self.dispatch_page(company_id, page1.properties, &semaphore, &counters, &mut join_set)
            .await;

        for page in 2..=total_pages {
            status::update(company_id, |s| s.current_page = page);
            match self
                .client
                .search_properties(api_key, agency_id, page, page_size)
                .await
            {
                Ok(envelope) => {
                    self.dispatch_page(
                        company_id,
                        envelope.properties,
                        &semaphore,
                        &counters,
                        &mut join_set,
                    )
                    .await;
                }
                Err(e) => {
                    warn!(company_id, page, "Failed to fetch listings page: {e}");
                    let mut c = counters.lock().await;
                    c.errors += 1;
                    status::update(company_id, |s| s.errors = c.errors);
                }
            }
        }

        while join_set.join_next().await.is_some() {}

        let c = counters.lock().await;
        Ok(SyncReport {
            synced: c.processed,
            created: c.created,
            updated: c.updated,
            errors: c.errors,
            last_sync: utc_now!(),
        })
    }

    async fn dispatch_page(
        &self,
        company_id: u64,
        items: Vec<ListingItem>,
        semaphore: &Arc<Semaphore>,
        counters: &Arc<Mutex<Counters>>,
        join_set: &mut JoinSet<()>,
    ) {
        let counters = counters.clone();
        bounded_for_each(join_set, semaphore, items, move |item| {
            let counters = counters.clone();
            async move {
                let result = upsert_item(&item, company_id).await;
                let mut c = counters.lock().await;
                match result {
                    Ok(true) => {
                        c.created += 1;
                        c.processed += 1;
                    }
                    Ok(false) => {
                        c.updated += 1;
                        c.processed += 1;
                    }
                    Err(e) => {
                        warn!(
                            company_id,
                            reference = %item.reference,
                            "Failed to upsert listing: {e}"
                        );
                        c.errors += 1;
                    }
                }
                status::update(company_id, |s| {
                    s.processed = c.processed;
                    s.created = c.created;
                    s.updated = c.updated;
                    s.errors = c.errors;
                });
            }
        })
        .await;
    }
}

async fn upsert_item(item: &ListingItem, company_id: u64) -> LeadGateResult<bool> {
    let mapped = mapper::map_listing(item, company_id)?;
    Property::upsert_by_reference(mapped).await
}

/// Spawns `op(item)` for every item, never letting more than the
/// semaphore's permits run at once. Acquiring before spawning also bounds
/// the number of tasks sitting in the set.
async fn bounded_for_each<T, F, Fut>(
    join_set: &mut JoinSet<()>,
    semaphore: &Arc<Semaphore>,
    items: Vec<T>,
    op: F,
) where
    T: Send + 'static,
    F: Fn(T) -> Fut + Clone + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    for item in items {
        let Ok(permit) = semaphore.clone().acquire_owned().await else {
            // Semaphore closed only on shutdown
            return;
        };
        let op = op.clone();
        join_set.spawn(async move {
            let _permit = permit;
            op(item).await;
        });
    }
}
