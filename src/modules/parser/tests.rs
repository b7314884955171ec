// Copyright © 2025 leadgate.dev
// Licensed under LeadGate License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::error::code::ErrorCode;
use crate::modules::parser::{LeadSource, ParserFactory};

const FOTOCASA_BODY: &str = r#"<html><body>
<p>Has recibido un nuevo contacto de Fotocasa por el inmueble con referencia R4786633.</p>
<p>Nombre: Laura Martinez</p>
<p>Teléfono: 600 11 22 33</p>
<p>Email: laura.martinez@example.com</p>
<p>Mensaje: Hola, me interesa el piso</p>
<p>Día y hora: 12/05 10:30</p>
</body></html>"#;

const IDEALISTA_BODY: &str = r#"<html><body><table>
<tr><td>Ref. R4967962</td></tr>
<tr><td>Carlos Ruiz</td></tr>
<tr><td>677 88 99 00</td></tr>
<tr><td>carlos.ruiz@example.com</td></tr>
<tr><td>Hola, estoy interesado en la propiedad</td></tr>
</table></body></html>"#;

#[test]
fn factory_routes_by_sender_and_subject() {
    let factory = ParserFactory::new();

    let parser = factory
        .get_parser("Nuevo contacto", "noreply@fotocasa.es")
        .unwrap();
    assert!(parser.can_parse("Nuevo contacto", "noreply@fotocasa.es"));

    assert!(factory
        .get_parser("Nuevo mensaje de Carlos sobre tu anuncio", "noreply@idealista.com")
        .is_ok());

    let err = factory
        .get_parser("Factura mensual", "billing@somewhere.com")
        .map(|_| ())
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::UnsupportedPortal);
}

#[test]
fn fotocasa_wins_over_idealista_when_both_match() {
    // "nuevo mensaje" alone would match Idealista, but registration order
    // gives Fotocasa the first shot.
    let factory = ParserFactory::new();
    let parser = factory
        .get_parser("Nuevo mensaje: contacto de fotocasa", "noreply@portal.com")
        .unwrap();
    let lead = parser.parse("x referencia R1", "<p>Email: a@b.es</p>").unwrap();
    assert_eq!(lead.source, LeadSource::Fotocasa);
}

#[test]
fn fotocasa_structured_extraction() {
    let factory = ParserFactory::new();
    let parser = factory.get_parser("Nuevo contacto", "noreply@fotocasa.es").unwrap();
    let lead = parser.parse("Nuevo contacto de Fotocasa", FOTOCASA_BODY).unwrap();

    assert_eq!(lead.source, LeadSource::Fotocasa);
    assert_eq!(lead.property_reference, "R4786633");
    assert_eq!(lead.name, "Laura Martinez");
    // Full-text phone pass strips internal spaces
    assert_eq!(lead.phone, "600112233");
    assert_eq!(lead.email, "laura.martinez@example.com");
    assert!(lead.message.starts_with("Hola, me interesa"));
}

#[test]
fn fotocasa_reference_falls_back_to_subject() {
    let factory = ParserFactory::new();
    let parser = factory.get_parser("x", "noreply@fotocasa.es").unwrap();
    let lead = parser
        .parse(
            "Nuevo contacto por tu inmueble con referencia R999888",
            "<p>Email: contacto@example.com</p>",
        )
        .unwrap();
    assert_eq!(lead.property_reference, "R999888");
    assert_eq!(lead.email, "contacto@example.com");
}

#[test]
fn fotocasa_missing_reference_is_an_error() {
    let factory = ParserFactory::new();
    let parser = factory.get_parser("x", "noreply@fotocasa.es").unwrap();
    let err = parser
        .parse("Nuevo contacto", "<p>Email: a@b.es</p>")
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::LeadParseFailed);
}

#[test]
fn fotocasa_missing_email_is_an_error() {
    let factory = ParserFactory::new();
    let parser = factory.get_parser("x", "noreply@fotocasa.es").unwrap();
    let err = parser
        .parse("Nuevo contacto", "<p>con referencia R123 pero sin contacto</p>")
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::LeadParseFailed);
}

#[test]
fn idealista_pulls_name_from_subject() {
    let factory = ParserFactory::new();
    let parser = factory
        .get_parser("Nuevo mensaje de Carlos sobre tu anuncio", "noreply@idealista.com")
        .unwrap();
    let lead = parser
        .parse("Nuevo mensaje de Carlos sobre tu anuncio", IDEALISTA_BODY)
        .unwrap();

    assert_eq!(lead.source, LeadSource::Idealista);
    assert_eq!(lead.property_reference, "R4967962");
    assert_eq!(lead.name, "Carlos");
    assert_eq!(lead.phone, "677889900");
    // Email is located after the phone, so the one in the contact block wins
    assert_eq!(lead.email, "carlos.ruiz@example.com");
    assert!(lead.message.starts_with("Hola"));
}

#[test]
fn idealista_email_search_skips_header_addresses() {
    // Address before the phone belongs to the header and must not be chosen
    let body = r#"<html><body>
<p>De: noreply@idealista.com</p>
<p>Ref: R555</p>
<p>611 22 33 44</p>
<p>interesado@example.com</p>
</body></html>"#;
    let factory = ParserFactory::new();
    let parser = factory.get_parser("nuevo mensaje", "noreply@idealista.com").unwrap();
    let lead = parser.parse("nuevo mensaje", body).unwrap();
    assert_eq!(lead.email, "interesado@example.com");
    assert_eq!(lead.phone, "611223344");
}
