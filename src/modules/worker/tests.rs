// Copyright © 2025 leadgate.dev
// Licensed under LeadGate License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::ingest::LeadIngestService;
use crate::modules::lead::Lead;
use crate::modules::ledger::ProcessedMessage;
use crate::modules::property::{Property, PropertyOrigin};
use crate::modules::transport::ParsedEmail;
use crate::modules::worker::CompanyMailWorker;
use crate::utc_now;

async fn seed_property(reference: &str, company_id: u64) {
    Property {
        id: crate::id!(),
        reference: reference.into(),
        company_id,
        origin: PropertyOrigin::Manual,
        status: "AVAILABLE".into(),
        title: format!("Listing {reference}"),
        created_at: utc_now!(),
        updated_at: utc_now!(),
        ..Default::default()
    }
    .save()
    .await
    .unwrap();
}

fn portal_email(message_id: &str, reference: &str, email: &str) -> ParsedEmail {
    ParsedEmail {
        message_id: message_id.into(),
        from: "noreply@fotocasa.es".into(),
        subject: "Nuevo contacto de Fotocasa".into(),
        body: format!(
            r#"<html><body>
<p>Nuevo contacto por tu inmueble con referencia {reference}</p>
<p>Nombre: Marta Gil</p>
<p>Teléfono: 611 22 33 44</p>
<p>Email: {email}</p>
<p>Mensaje: Quiero más información</p>
</body></html>"#
        ),
        date: utc_now!(),
    }
}

#[tokio::test]
async fn already_seen_messages_are_skipped() {
    seed_property("R880101", 8801).await;
    let ingest = LeadIngestService::new(8801);

    let batch = vec![
        portal_email("<m1@fotocasa>", "R880101", "marta.a@example.com"),
        portal_email("<m1@fotocasa>", "R880101", "marta.a@example.com"),
    ];
    let processed = CompanyMailWorker::process_messages(&ingest, 8801, batch)
        .await
        .unwrap();
    assert_eq!(processed, 1);

    // Replaying the batch later is a no-op
    let replay = vec![portal_email("<m1@fotocasa>", "R880101", "marta.a@example.com")];
    let processed = CompanyMailWorker::process_messages(&ingest, 8801, replay)
        .await
        .unwrap();
    assert_eq!(processed, 0);
}

#[tokio::test]
async fn failed_ingest_is_recorded_and_never_retried() {
    let ingest = LeadIngestService::new(8802);

    // Reference R888999 does not exist, so ingestion fails
    let batch = vec![portal_email("<poison@fotocasa>", "R888999", "marta.b@example.com")];
    let processed = CompanyMailWorker::process_messages(&ingest, 8802, batch)
        .await
        .unwrap();
    assert_eq!(processed, 1);
    assert!(ProcessedMessage::exists(8802, "<poison@fotocasa>").await.unwrap());
    assert!(Lead::find_by_email("marta.b@example.com").await.unwrap().is_none());

    let replay = vec![portal_email("<poison@fotocasa>", "R888999", "marta.b@example.com")];
    let processed = CompanyMailWorker::process_messages(&ingest, 8802, replay)
        .await
        .unwrap();
    assert_eq!(processed, 0);
}

#[tokio::test]
async fn ledger_entries_are_scoped_per_company() {
    seed_property("R880301", 8803).await;
    seed_property("R880401", 8804).await;

    let processed = CompanyMailWorker::process_messages(
        &LeadIngestService::new(8803),
        8803,
        vec![portal_email("<shared@fotocasa>", "R880301", "marta.c@example.com")],
    )
    .await
    .unwrap();
    assert_eq!(processed, 1);

    // Same Message-ID arriving in another tenant's inbox is still fresh
    let processed = CompanyMailWorker::process_messages(
        &LeadIngestService::new(8804),
        8804,
        vec![portal_email("<shared@fotocasa>", "R880401", "marta.d@example.com")],
    )
    .await
    .unwrap();
    assert_eq!(processed, 1);
}
