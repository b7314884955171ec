// Copyright © 2025 leadgate.dev
// Licensed under LeadGate License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::error::code::ErrorCode;
use crate::modules::error::LeadGateResult;
use crate::raise_error;
use poem_openapi::Enum;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

pub mod fotocasa;
pub mod idealista;
#[cfg(test)]
mod tests;

/// Portal that produced a notification email.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize, Enum)]
pub enum LeadSource {
    Fotocasa,
    Idealista,
}

impl std::fmt::Display for LeadSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LeadSource::Fotocasa => write!(f, "Fotocasa"),
            LeadSource::Idealista => write!(f, "Idealista"),
        }
    }
}

/// Contact data extracted from a single portal notification email.
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedLead {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    /// External listing reference, e.g. "R4786633"
    pub property_reference: String,
    pub source: LeadSource,
    /// When the contact was parsed (epoch milliseconds)
    pub contact_date: i64,
}

/// One strategy per portal. `can_parse` is a cheap sender/subject sniff;
/// `parse` does the heavy extraction and fails with a descriptive error
/// when mandatory fields (reference, email) cannot be recovered.
pub trait PortalParser: Send + Sync {
    fn can_parse(&self, subject: &str, from: &str) -> bool;
    fn parse(&self, subject: &str, body: &str) -> LeadGateResult<ParsedLead>;
}

/// Ordered parser registry; the first parser claiming an email wins.
pub struct ParserFactory {
    parsers: Vec<Box<dyn PortalParser>>,
}

impl Default for ParserFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ParserFactory {
    pub fn new() -> Self {
        Self {
            parsers: vec![
                Box::new(fotocasa::FotocasaParser),
                Box::new(idealista::IdealistaParser),
            ],
        }
    }

    pub fn get_parser(&self, subject: &str, from: &str) -> LeadGateResult<&dyn PortalParser> {
        self.parsers
            .iter()
            .find(|parser| parser.can_parse(subject, from))
            .map(|parser| parser.as_ref())
            .ok_or_else(|| {
                raise_error!(
                    format!(
                        "No suitable parser found for email from '{from}' with subject '{subject}'"
                    ),
                    ErrorCode::UnsupportedPortal
                )
            })
    }
}

pub(crate) static PHONE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{3}\s*\d{2}\s*\d{2}\s*\d{2}|\d{9})").unwrap());

pub(crate) static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,})").unwrap());

/// All non-empty trimmed text nodes of an HTML body, in document order.
/// An empty result means the body carried no extractable text and the
/// caller should fall back to raw-regex parsing.
pub(crate) fn extract_text_nodes(body: &str) -> Vec<String> {
    let document = scraper::Html::parse_document(body);
    document
        .root_element()
        .text()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .collect()
}

/// Spanish phone first, then the first email that appears after it in the
/// flattened text. Anchoring the email search past the phone skips sender
/// and footer addresses that precede the contact block.
pub(crate) fn find_phone_then_email(full_text: &str) -> (Option<String>, Option<String>) {
    match PHONE_REGEX.find(full_text) {
        Some(phone_match) => {
            let phone = phone_match.as_str().replace(' ', "");
            let email = EMAIL_REGEX
                .find(&full_text[phone_match.end()..])
                .map(|m| m.as_str().to_string());
            (Some(phone), email)
        }
        None => (None, None),
    }
}
