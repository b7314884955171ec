// Copyright © 2025 leadgate.dev
// Licensed under LeadGate License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::config::integration::IntegrationConfig;
use crate::modules::error::code::ErrorCode;
use crate::modules::error::LeadGateResult;
use crate::modules::listings::types::{
    ListingItem, ListingTypeInfo, ListingsResponse, QueryInfo, Transaction,
};
use crate::modules::listings::ListingsApi;
use crate::modules::property::Property;
use crate::modules::sync::status::{self, SyncPhase};
use crate::modules::sync::{bounded_for_each, SyncEngine};
use crate::raise_error;
use serde_json::json;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Canned catalog serving `total` listings with references
/// `{prefix}0000..{prefix}NNNN`, optionally failing whole pages or
/// blanking one item's reference.
struct MockCatalog {
    total: u32,
    prefix: String,
    fail_pages: HashSet<u32>,
    blank_reference_at: Option<u32>,
}

impl MockCatalog {
    fn new(total: u32, prefix: &str) -> Self {
        Self {
            total,
            prefix: prefix.into(),
            fail_pages: HashSet::new(),
            blank_reference_at: None,
        }
    }

    fn failing_page(mut self, page: u32) -> Self {
        self.fail_pages.insert(page);
        self
    }

    fn item(&self, index: u32) -> ListingItem {
        let reference = if self.blank_reference_at == Some(index) {
            String::new()
        } else {
            format!("{}{index:04}", self.prefix)
        };
        ListingItem {
            reference,
            location: "Estepona".into(),
            property_type: ListingTypeInfo {
                type_name: "Detached Villa".into(),
                ..Default::default()
            },
            price: json!("450000"),
            currency: "EUR".into(),
            bedrooms: json!(4),
            bathrooms: json!(3),
            built: json!("210"),
            ..Default::default()
        }
    }
}

impl ListingsApi for MockCatalog {
    async fn search_properties(
        &self,
        _api_key: &str,
        _agency_id: &str,
        page: u32,
        page_size: u32,
    ) -> LeadGateResult<ListingsResponse> {
        if self.fail_pages.contains(&page) {
            return Err(raise_error!(
                format!("simulated failure fetching page {page}"),
                ErrorCode::ListingsApiFailed
            ));
        }
        let start = (page - 1) * page_size;
        let end = (start + page_size).min(self.total);
        Ok(ListingsResponse {
            transaction: Transaction {
                status: "success".into(),
                version: "V6".into(),
            },
            query_info: Some(QueryInfo {
                property_count: self.total,
                current_page: page,
            }),
            properties: (start..end).map(|i| self.item(i)).collect(),
        })
    }
}

async fn seed_integration(company_id: u64) {
    IntegrationConfig::create(company_id, "test-api-key", "test-agency")
        .unwrap()
        .save()
        .await
        .unwrap();
}

#[tokio::test]
async fn full_catalog_sync_creates_every_listing() {
    seed_integration(6601).await;
    let engine = SyncEngine::new(MockCatalog::new(120, "RSA"));

    let report = engine.sync_all(6601, "k", "a").await.unwrap();
    assert_eq!(report.synced, 120);
    assert_eq!(report.created, 120);
    assert_eq!(report.updated, 0);
    assert_eq!(report.errors, 0);

    let snapshot = status::snapshot(6601).unwrap();
    assert_eq!(snapshot.phase, SyncPhase::Completed);
    assert_eq!(snapshot.total_properties, 120);
    assert_eq!(snapshot.total_pages, 3);
    assert_eq!(snapshot.processed, 120);
    assert!(snapshot.completed_at.is_some());

    assert_eq!(Property::list_by_company(6601).await.unwrap().len(), 120);
    let config = IntegrationConfig::find(6601).await.unwrap().unwrap();
    assert!(config.last_sync.is_some());
}

#[tokio::test]
async fn resync_updates_instead_of_duplicating() {
    seed_integration(6602).await;
    let engine = SyncEngine::new(MockCatalog::new(30, "RSB"));

    let first = engine.sync_all(6602, "k", "a").await.unwrap();
    assert_eq!(first.created, 30);
    let before = Property::find_by_reference("RSB0007").await.unwrap().unwrap();

    let second = engine.sync_all(6602, "k", "a").await.unwrap();
    assert_eq!(second.created, 0);
    assert_eq!(second.updated, 30);

    // Same row, not a replacement
    let after = Property::find_by_reference("RSB0007").await.unwrap().unwrap();
    assert_eq!(after.id, before.id);
    assert_eq!(after.created_at, before.created_at);
    assert_eq!(Property::list_by_company(6602).await.unwrap().len(), 30);
}

#[tokio::test]
async fn failed_middle_page_is_skipped_not_fatal() {
    seed_integration(6603).await;
    let engine = SyncEngine::new(MockCatalog::new(120, "RSC").failing_page(2));

    let report = engine.sync_all(6603, "k", "a").await.unwrap();
    // Pages 1 and 3 survive: 50 + 20 listings
    assert_eq!(report.synced, 70);
    assert_eq!(report.created, 70);
    assert_eq!(report.errors, 1);
    assert_eq!(
        status::snapshot(6603).unwrap().phase,
        SyncPhase::Completed
    );
}

#[tokio::test]
async fn first_page_failure_fails_the_run() {
    seed_integration(6604).await;
    let engine = SyncEngine::new(MockCatalog::new(120, "RSD").failing_page(1));

    let err = engine.sync_all(6604, "k", "a").await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::ListingsApiFailed);

    let snapshot = status::snapshot(6604).unwrap();
    assert_eq!(snapshot.phase, SyncPhase::Failed);
    assert!(snapshot.error_message.is_some());
    assert!(Property::list_by_company(6604).await.unwrap().is_empty());
}

#[tokio::test]
async fn unmappable_listing_is_counted_as_error() {
    seed_integration(6605).await;
    let mut catalog = MockCatalog::new(5, "RSE");
    catalog.blank_reference_at = Some(2);
    let engine = SyncEngine::new(catalog);

    let report = engine.sync_all(6605, "k", "a").await.unwrap();
    assert_eq!(report.synced, 4);
    assert_eq!(report.errors, 1);
    assert_eq!(Property::list_by_company(6605).await.unwrap().len(), 4);
}

#[tokio::test]
async fn only_one_sync_runs_per_company() {
    assert!(status::try_begin(6606));
    assert!(!status::try_begin(6606));
    status::update(6606, |s| s.phase = SyncPhase::Completed);
    assert!(status::try_begin(6606));
    status::update(6606, |s| s.phase = SyncPhase::Failed);
}

#[tokio::test]
async fn upsert_pool_never_exceeds_its_bound() {
    let semaphore = Arc::new(Semaphore::new(3));
    let active = Arc::new(AtomicUsize::new(0));
    let high_water = Arc::new(AtomicUsize::new(0));
    let completed = Arc::new(AtomicUsize::new(0));
    let mut join_set = JoinSet::new();

    let op = {
        let (active, high_water, completed) =
            (active.clone(), high_water.clone(), completed.clone());
        move |_item: u32| {
            let (active, high_water, completed) =
                (active.clone(), high_water.clone(), completed.clone());
            async move {
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                high_water.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(2)).await;
                active.fetch_sub(1, Ordering::SeqCst);
                completed.fetch_add(1, Ordering::SeqCst);
            }
        }
    };
    bounded_for_each(&mut join_set, &semaphore, (0..40).collect(), op).await;
    while join_set.join_next().await.is_some() {}

    assert_eq!(completed.load(Ordering::SeqCst), 40);
    assert!(high_water.load(Ordering::SeqCst) <= 3);
}
