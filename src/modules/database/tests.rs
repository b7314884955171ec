// Copyright © 2025 leadgate.dev
// Licensed under LeadGate License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::config::integration::IntegrationConfig;
use crate::modules::config::mailbox::{AuthMethod, MailboxConfig, MailboxConfigCreateRequest};
use crate::modules::lead::{Lead, NewLead};
use crate::modules::ledger::ProcessedMessage;
use crate::modules::property::{Property, PropertyOrigin, PropertyType};
use crate::utc_now;

#[tokio::test]
async fn lead_round_trip_by_email() {
    let lead = NewLead {
        name: "Maria Garcia".into(),
        email: "maria.garcia.dbtest@example.com".into(),
        phone: "+34600111222".into(),
        property_id: None,
        company_id: 9001,
        source: "Fotocasa".into(),
        notes: "Mensaje inicial: hola".into(),
    }
    .into_lead();
    lead.save().await.unwrap();

    let found = Lead::find_by_email("maria.garcia.dbtest@example.com")
        .await
        .unwrap()
        .expect("lead should be stored");
    assert_eq!(found.id, lead.id);
    assert_eq!(found.company_id, 9001);
    assert_eq!(found.channel, "email");

    assert!(Lead::find_by_email("nobody.dbtest@example.com")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn property_upsert_is_keyed_by_reference() {
    let property = Property {
        reference: "R-DBTEST-1".into(),
        company_id: 9002,
        origin: PropertyOrigin::PortalImport,
        status: "AVAILABLE".into(),
        title: "Apartment in Marbella".into(),
        property_type: PropertyType::Apartment,
        price: 250_000.0,
        currency: "EUR".into(),
        ..Default::default()
    };
    let created = Property::upsert_by_reference(property.clone()).await.unwrap();
    assert!(created);

    let stored = Property::find_by_reference("R-DBTEST-1")
        .await
        .unwrap()
        .unwrap();

    let mut second = property.clone();
    second.price = 260_000.0;
    let created = Property::upsert_by_reference(second).await.unwrap();
    assert!(!created);

    let updated = Property::find_by_reference("R-DBTEST-1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.id, stored.id);
    assert_eq!(updated.created_at, stored.created_at);
    assert_eq!(updated.price, 260_000.0);
}

#[tokio::test]
async fn ledger_records_and_prunes() {
    assert!(!ProcessedMessage::exists(9003, "<msg-1@portal>").await.unwrap());
    ProcessedMessage::record(9003, "<msg-1@portal>").await.unwrap();
    assert!(ProcessedMessage::exists(9003, "<msg-1@portal>").await.unwrap());
    // Same message id under another tenant is a different ledger row
    assert!(!ProcessedMessage::exists(9004, "<msg-1@portal>").await.unwrap());

    // Double record is harmless
    ProcessedMessage::record(9003, "<msg-1@portal>").await.unwrap();

    let pruned = ProcessedMessage::prune_older_than(utc_now!() + 1000)
        .await
        .unwrap();
    assert!(pruned >= 1);
    assert!(!ProcessedMessage::exists(9003, "<msg-1@portal>").await.unwrap());
}

#[tokio::test]
async fn mailbox_config_encrypts_credentials() {
    let config = MailboxConfig::create(MailboxConfigCreateRequest {
        company_id: 9005,
        auth_method: AuthMethod::Password,
        imap_host: "imap.example.com".into(),
        imap_username: "inbox@example.com".into(),
        imap_password: Some("hunter2".into()),
        ..Default::default()
    })
    .unwrap();
    assert_ne!(config.imap_password.as_deref(), Some("hunter2"));
    config.save().await.unwrap();

    let stored = MailboxConfig::find_by_company(9005).await.unwrap().unwrap();
    assert_eq!(stored.decrypted_password().unwrap(), "hunter2");
    assert_eq!(stored.inbox_folder, "INBOX");
    assert_eq!(stored.poll_interval_secs, 300);

    // A second config for the same tenant is rejected
    let duplicate = MailboxConfig::create(MailboxConfigCreateRequest {
        company_id: 9005,
        auth_method: AuthMethod::Password,
        imap_host: "imap.example.com".into(),
        imap_username: "inbox@example.com".into(),
        imap_password: Some("hunter2".into()),
        ..Default::default()
    })
    .unwrap();
    assert!(duplicate.save().await.is_err());
}

#[tokio::test]
async fn mailbox_config_enable_disable_and_delete() {
    let config = MailboxConfig::create(MailboxConfigCreateRequest {
        company_id: 9006,
        auth_method: AuthMethod::Password,
        imap_host: "imap.example.com".into(),
        imap_username: "lifecycle@example.com".into(),
        imap_password: Some("hunter2".into()),
        ..Default::default()
    })
    .unwrap();
    config.save().await.unwrap();
    assert!(MailboxConfig::list_enabled()
        .await
        .unwrap()
        .iter()
        .any(|c| c.company_id == 9006));

    MailboxConfig::set_enabled(9006, false).await.unwrap();
    assert!(MailboxConfig::list_enabled()
        .await
        .unwrap()
        .iter()
        .all(|c| c.company_id != 9006));
    assert!(MailboxConfig::find_by_company(9006).await.unwrap().is_some());

    MailboxConfig::delete(9006).await.unwrap();
    assert!(MailboxConfig::find_by_company(9006).await.unwrap().is_none());
    // Deleting an absent config is an error, not a no-op
    assert!(MailboxConfig::delete(9006).await.is_err());
}

#[tokio::test]
async fn integration_config_replacement_keeps_history() {
    let first = IntegrationConfig::apply(9007, "key-one", "AG1").await.unwrap();
    assert_ne!(first.api_key, "key-one");
    IntegrationConfig::mark_synced(9007).await.unwrap();
    let stored = IntegrationConfig::find(9007).await.unwrap().unwrap();
    assert!(stored.last_sync.is_some());

    let replaced = IntegrationConfig::apply(9007, "key-two", "AG2").await.unwrap();
    assert_eq!(replaced.decrypted_api_key().unwrap(), "key-two");
    assert_eq!(replaced.agency_id, "AG2");
    assert_eq!(replaced.created_at, stored.created_at);
    assert_eq!(replaced.last_sync, stored.last_sync);

    let reloaded = IntegrationConfig::find(9007).await.unwrap().unwrap();
    assert_eq!(reloaded, replaced);
}
