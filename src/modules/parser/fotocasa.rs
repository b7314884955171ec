// Copyright © 2025 leadgate.dev
// Licensed under LeadGate License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::error::code::ErrorCode;
use crate::modules::error::LeadGateResult;
use crate::modules::parser::{
    extract_text_nodes, find_phone_then_email, LeadSource, ParsedLead, PortalParser,
};
use crate::raise_error;
use crate::utc_now;
use regex::Regex;
use std::sync::LazyLock;

static REF_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)referencia\s+(R\d+)").unwrap());
static NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)Nombre:\s*([^\n<]+)").unwrap());
static PHONE_LABEL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Tel[eé]fono:\s*([0-9\s]+)").unwrap());
static EMAIL_LABEL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Email:\s*([a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,})").unwrap()
});
static MESSAGE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Mensaje:\s*([^\n<]+(?:\n[^\n<]+)*)").unwrap());

/// Labels and artifacts that terminate a field value inside one text block.
const VALUE_MARKERS: &[&str] = &[
    "Nombre:",
    "Teléfono:",
    "Email:",
    "Día y hora:",
    "Mensaje:",
    "[image:",
    "Referencia:",
];

pub struct FotocasaParser;

impl PortalParser for FotocasaParser {
    fn can_parse(&self, subject: &str, from: &str) -> bool {
        let from = from.to_lowercase();
        let subject = subject.to_lowercase();
        from.contains("fotocasa")
            || subject.contains("fotocasa")
            || subject.contains("nuevo contacto de fotocasa")
    }

    fn parse(&self, subject: &str, body: &str) -> LeadGateResult<ParsedLead> {
        let property_reference = REF_REGEX
            .captures(body)
            .or_else(|| REF_REGEX.captures(subject))
            .map(|caps| caps[1].to_string())
            .unwrap_or_default();

        let text_nodes = extract_text_nodes(body);
        if text_nodes.is_empty() {
            // Nothing textual in the HTML, raw-regex fallback
            return finish(
                property_reference,
                Extracted::default(),
                extract_with_regex(body),
            );
        }

        let mut extracted = Extracted::default();
        for text in &text_nodes {
            extracted.absorb(text);
        }

        // Full-text pass: a Spanish phone anywhere in the flattened text is
        // more reliable than label extraction, and the email that follows it
        // belongs to the contact, not to a header.
        let full_text = text_nodes.join(" ");
        let (phone, email) = find_phone_then_email(&full_text);
        if let Some(phone) = phone {
            extracted.phone = Some(phone);
            if let Some(email) = email {
                extracted.email = Some(email);
            }
        }

        finish(property_reference, extracted, extract_with_regex(body))
    }
}

/// Field values recovered from the HTML text nodes. Label-only nodes leave
/// a pending marker so the value can be picked up from the following node.
#[derive(Default)]
struct Extracted {
    name: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    message: Option<String>,
    name_pending: bool,
    phone_pending: bool,
}

impl Extracted {
    fn absorb(&mut self, text: &str) {
        // Independent label checks: one block can carry several fields.
        if let Some(idx) = text.find("Nombre:") {
            let cleaned = clean_value(&text[idx + "Nombre:".len()..]);
            if !cleaned.is_empty() && !cleaned.to_lowercase().starts_with("llamar") {
                self.name = Some(cleaned);
                self.name_pending = false;
            } else {
                self.name_pending = true;
            }
        }
        if let Some(idx) = text.find("Teléfono:") {
            let cleaned = clean_value(&text[idx + "Teléfono:".len()..]);
            if !cleaned.is_empty() {
                self.phone = Some(cleaned);
                self.phone_pending = false;
            } else {
                self.phone_pending = true;
            }
        }
        if let Some(idx) = text.find("Email:") {
            let cleaned = clean_value(&text[idx + "Email:".len()..]);
            if !cleaned.is_empty() {
                self.email = Some(cleaned);
            }
        }
        if let Some(idx) = text.find("Mensaje:") {
            let cleaned = clean_value(&text[idx + "Mensaje:".len()..]);
            if !cleaned.is_empty() {
                self.message = Some(cleaned);
            }
        }

        // Label was alone in the previous node, value arrives in this one
        if self.name_pending && self.name.is_none() && !text.contains(':') {
            if !text.to_lowercase().starts_with("llamar") {
                self.name = Some(clean_value(text));
                self.name_pending = false;
            }
        } else if self.phone_pending && self.phone.is_none() && !text.contains(':') {
            self.phone = Some(clean_value(text));
            self.phone_pending = false;
        }
    }
}

/// Truncates a candidate value at the next label or artifact marker.
fn clean_value(raw: &str) -> String {
    let mut value = raw.trim();
    for marker in VALUE_MARKERS {
        if let Some(idx) = value.find(marker) {
            value = &value[..idx];
        }
    }
    value.trim().to_string()
}

#[derive(Default)]
struct RegexData {
    name: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    message: Option<String>,
}

fn extract_with_regex(body: &str) -> RegexData {
    RegexData {
        name: NAME_REGEX
            .captures(body)
            .map(|caps| caps[1].trim().to_string()),
        phone: PHONE_LABEL_REGEX
            .captures(body)
            .map(|caps| caps[1].trim().to_string()),
        email: EMAIL_LABEL_REGEX
            .captures(body)
            .map(|caps| caps[1].trim().to_string()),
        message: MESSAGE_REGEX
            .captures(body)
            .map(|caps| caps[1].trim().to_string()),
    }
}

/// Structured extraction wins; regex fills the gaps. Reference and email
/// are mandatory.
fn finish(
    property_reference: String,
    extracted: Extracted,
    regex_data: RegexData,
) -> LeadGateResult<ParsedLead> {
    if property_reference.is_empty() {
        return Err(raise_error!(
            "could not extract property reference from Fotocasa email".into(),
            ErrorCode::LeadParseFailed
        ));
    }
    let email = extracted
        .email
        .or(regex_data.email)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| {
            raise_error!(
                "could not extract email from Fotocasa email".into(),
                ErrorCode::LeadParseFailed
            )
        })?;
    Ok(ParsedLead {
        name: extracted.name.or(regex_data.name).unwrap_or_default(),
        email,
        phone: extracted.phone.or(regex_data.phone).unwrap_or_default(),
        message: extracted.message.or(regex_data.message).unwrap_or_default(),
        property_reference,
        source: LeadSource::Fotocasa,
        contact_date: utc_now!(),
    })
}
