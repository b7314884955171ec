// Copyright © 2025 leadgate.dev
// Licensed under LeadGate License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::error::code::ErrorCode;
use crate::modules::error::LeadGateResult;
use crate::modules::parser::{
    extract_text_nodes, find_phone_then_email, LeadSource, ParsedLead, PortalParser, EMAIL_REGEX,
    PHONE_REGEX,
};
use crate::raise_error;
use crate::utc_now;
use regex::Regex;
use std::sync::LazyLock;

static REF_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)ref[.:]?\s*(R\d+)").unwrap());
static NAME_IN_SUBJECT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)mensaje de\s+(.+?)\s+sobre").unwrap());
static MESSAGE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(Hola[^.]+(?:\.[^.]+){0,5}|me gustar[ií]a[^.]+(?:\.[^.]+){0,5}|estoy interesad[oa][^.]+(?:\.[^.]+){0,5})",
    )
    .unwrap()
});
static RAW_MESSAGE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(Hola[^<]+|me gustar[ií]a[^<]+|estoy interesad[oa][^<]+)").unwrap()
});

pub struct IdealistaParser;

impl PortalParser for IdealistaParser {
    fn can_parse(&self, subject: &str, from: &str) -> bool {
        let from = from.to_lowercase();
        let subject = subject.to_lowercase();
        from.contains("idealista")
            || subject.contains("idealista")
            || subject.contains("nuevo mensaje")
    }

    fn parse(&self, subject: &str, body: &str) -> LeadGateResult<ParsedLead> {
        let property_reference = REF_REGEX
            .captures(body)
            .or_else(|| REF_REGEX.captures(subject))
            .map(|caps| caps[1].to_string())
            .unwrap_or_default();

        // Subject line carries the sender name: "Nuevo mensaje de X sobre ..."
        let mut name = NAME_IN_SUBJECT_REGEX
            .captures(subject)
            .map(|caps| caps[1].trim().to_string())
            .unwrap_or_default();

        let text_nodes = extract_text_nodes(body);
        let mut phone = String::new();
        let mut email = String::new();
        let mut message = String::new();

        if !text_nodes.is_empty() {
            let full_text = text_nodes.join(" ");

            // Anchor the email search after the phone so sender/footer
            // addresses in the header are not picked up.
            let (found_phone, found_email) = find_phone_then_email(&full_text);
            if let Some(found) = found_phone {
                phone = found;
            }
            if let Some(found) = found_email {
                email = found;
            } else if let Some(m) = EMAIL_REGEX.find(&full_text) {
                email = m.as_str().to_string();
            }

            if let Some(caps) = MESSAGE_REGEX.captures(&full_text) {
                message = caps[0].trim().to_string();
            }
        }

        // Raw-regex pass over the original body fills remaining gaps and is
        // the whole strategy when the HTML had no text nodes.
        if phone.is_empty() {
            if let Some(m) = PHONE_REGEX.find(body) {
                phone = m.as_str().replace(' ', "");
            }
        }
        if email.is_empty() {
            if let Some(m) = EMAIL_REGEX.find(body) {
                email = m.as_str().to_string();
            }
        }
        if message.is_empty() {
            if let Some(caps) = RAW_MESSAGE_REGEX.captures(body) {
                message = caps[0].trim().to_string();
            }
        }
        name = name.trim().to_string();

        if property_reference.is_empty() {
            return Err(raise_error!(
                "could not extract property reference from Idealista email".into(),
                ErrorCode::LeadParseFailed
            ));
        }
        if email.is_empty() {
            return Err(raise_error!(
                "could not extract email from Idealista email".into(),
                ErrorCode::LeadParseFailed
            ));
        }

        Ok(ParsedLead {
            name,
            email,
            phone,
            message,
            property_reference,
            source: LeadSource::Idealista,
            contact_date: utc_now!(),
        })
    }
}
