// Copyright © 2025 leadgate.dev
// Licensed under LeadGate License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::error::code::ErrorCode;
use crate::modules::ingest::LeadIngestService;
use crate::modules::lead::{Lead, LeadStatus};
use crate::modules::property::{Property, PropertyOrigin};
use crate::modules::transport::ParsedEmail;
use crate::utc_now;

async fn seed_property(reference: &str, company_id: u64) -> Property {
    let property = Property {
        id: crate::id!(),
        reference: reference.into(),
        company_id,
        origin: PropertyOrigin::Manual,
        status: "AVAILABLE".into(),
        title: format!("Listing {reference}"),
        created_at: utc_now!(),
        updated_at: utc_now!(),
        ..Default::default()
    };
    property.save().await.unwrap();
    property
}

fn fotocasa_email(reference: &str, email: &str, message: &str) -> ParsedEmail {
    ParsedEmail {
        message_id: format!("<{reference}-{email}@fotocasa>"),
        from: "noreply@fotocasa.es".into(),
        subject: "Nuevo contacto de Fotocasa".into(),
        body: format!(
            r#"<html><body>
<p>Nuevo contacto por tu inmueble con referencia {reference}</p>
<p>Nombre: Ana Torres</p>
<p>Teléfono: 655 44 33 22</p>
<p>Email: {email}</p>
<p>Mensaje: {message}</p>
</body></html>"#
        ),
        date: utc_now!(),
    }
}

#[tokio::test]
async fn creates_new_lead_from_portal_email() {
    let property = seed_property("R771001", 7701).await;
    let service = LeadIngestService::new(7701);

    service
        .process_email(&fotocasa_email("R771001", "ana.a@example.com", "Quiero visitarlo"))
        .await
        .unwrap();

    let lead = Lead::find_by_email("ana.a@example.com").await.unwrap().unwrap();
    assert_eq!(lead.status, LeadStatus::New);
    assert_eq!(lead.company_id, 7701);
    assert_eq!(lead.property_id, Some(property.id));
    assert_eq!(lead.channel, "email");
    assert_eq!(lead.source, "Fotocasa");
    assert_eq!(lead.phone, "655443322");
    assert!(lead.notes.starts_with("Mensaje inicial:"));
    assert!(lead.last_interaction.is_some());
}

#[tokio::test]
async fn repeated_contact_merges_into_existing_lead() {
    seed_property("R770201", 7702).await;
    let service = LeadIngestService::new(7702);

    service
        .process_email(&fotocasa_email("R770201", "ana.b@example.com", "Primer mensaje"))
        .await
        .unwrap();
    service
        .process_email(&fotocasa_email("R770201", "ana.b@example.com", "Segundo mensaje"))
        .await
        .unwrap();

    let lead = Lead::find_by_email("ana.b@example.com").await.unwrap().unwrap();
    // Still one lead; first contact bumps New -> Contacted
    assert_eq!(lead.status, LeadStatus::Contacted);
    assert!(lead.notes.contains("Mensaje inicial: Primer mensaje"));
    assert!(lead.notes.contains("Nuevo contacto. Mensaje: Segundo mensaje"));
    assert!(!lead.notes.contains("anterior"));
}

#[tokio::test]
async fn property_change_appends_history_note() {
    let first = seed_property("R770301", 7703).await;
    let second = seed_property("R770302", 7703).await;
    let service = LeadIngestService::new(7703);

    service
        .process_email(&fotocasa_email("R770301", "ana.c@example.com", "Sobre el primero"))
        .await
        .unwrap();
    service
        .process_email(&fotocasa_email("R770302", "ana.c@example.com", "Sobre el segundo"))
        .await
        .unwrap();

    let lead = Lead::find_by_email("ana.c@example.com").await.unwrap().unwrap();
    assert_eq!(lead.property_id, Some(second.id));
    assert!(lead
        .notes
        .contains(&format!("Nuevo contacto sobre propiedad R770302 (anterior: {})", first.id)));
}

#[tokio::test]
async fn closed_lead_is_reopened_as_contacted() {
    seed_property("R770401", 7704).await;
    let service = LeadIngestService::new(7704);

    service
        .process_email(&fotocasa_email("R770401", "ana.d@example.com", "Hola"))
        .await
        .unwrap();

    let mut lead = Lead::find_by_email("ana.d@example.com").await.unwrap().unwrap();
    lead.status = LeadStatus::Closed;
    Lead::persist_update(lead).await.unwrap();

    service
        .process_email(&fotocasa_email("R770401", "ana.d@example.com", "Sigo interesada"))
        .await
        .unwrap();

    let lead = Lead::find_by_email("ana.d@example.com").await.unwrap().unwrap();
    assert_eq!(lead.status, LeadStatus::Contacted);
}

#[tokio::test]
async fn unknown_property_reference_is_terminal() {
    let service = LeadIngestService::new(7705);
    let err = service
        .process_email(&fotocasa_email("R999777", "ana.e@example.com", "Hola"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::PropertyReferenceUnknown);
    // No lead appears as a side effect of the failed ingest
    assert!(Lead::find_by_email("ana.e@example.com").await.unwrap().is_none());
}

#[tokio::test]
async fn unsupported_sender_is_rejected() {
    let service = LeadIngestService::new(7706);
    let email = ParsedEmail {
        message_id: "<invoice-1@billing>".into(),
        from: "billing@hosting.com".into(),
        subject: "Su factura".into(),
        body: "<p>adjunta</p>".into(),
        date: utc_now!(),
    };
    let err = service.process_email(&email).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::UnsupportedPortal);
}
