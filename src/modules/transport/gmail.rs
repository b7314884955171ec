// Copyright © 2025 leadgate.dev
// Licensed under LeadGate License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::config::mailbox::MailboxConfig;
use crate::modules::error::code::ErrorCode;
use crate::modules::error::LeadGateResult;
use crate::modules::transport::oauth::refresh_google_token;
use crate::modules::transport::ParsedEmail;
use crate::raise_error;
use crate::utc_now;
use base64::{engine::general_purpose, Engine as _};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

const GMAIL_API_BASE: &str = "https://gmail.googleapis.com/gmail/v1/users/me";
const UNREAD_QUERY: &str = "is:unread in:inbox";
const MAX_RESULTS: u32 = 50;
/// Refresh ahead of expiry so an in-flight request never carries a token
/// that dies mid-call.
const TOKEN_EXPIRY_MARGIN_MS: i64 = 60_000;

/// Gmail REST poller for OAuth2 mailboxes.
pub struct GmailTransport {
    company_id: u64,
    access_token: Option<String>,
    refresh_token: String,
    token_expiry: Option<i64>,
    http_client: reqwest::Client,
}

impl GmailTransport {
    pub fn from_config(config: &MailboxConfig) -> LeadGateResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?;
        Ok(Self {
            company_id: config.company_id,
            access_token: config.decrypted_access_token()?,
            refresh_token: config.decrypted_refresh_token()?,
            token_expiry: config.token_expiry,
            http_client,
        })
    }

    pub async fn fetch_unread(&mut self) -> LeadGateResult<Vec<ParsedEmail>> {
        let token = self.fresh_access_token().await?;

        let list: MessageList = self
            .get_json(
                &token,
                &format!(
                    "{GMAIL_API_BASE}/messages?q={}&maxResults={MAX_RESULTS}",
                    urlencoded(UNREAD_QUERY)
                ),
            )
            .await?;

        let refs = list.messages.unwrap_or_default();
        debug!(
            company_id = self.company_id,
            "Gmail reported {} unread message(s)",
            refs.len()
        );

        let mut emails = Vec::with_capacity(refs.len());
        for message_ref in refs {
            let message: GmailMessage = match self
                .get_json(
                    &token,
                    &format!("{GMAIL_API_BASE}/messages/{}?format=full", message_ref.id),
                )
                .await
            {
                Ok(message) => message,
                Err(e) => {
                    // One undecodable message must not sink the whole cycle
                    warn!(
                        company_id = self.company_id,
                        message_id = %message_ref.id,
                        "Failed to fetch Gmail message: {e}"
                    );
                    continue;
                }
            };
            emails.push(into_parsed_email(message));
        }
        Ok(emails)
    }

    /// Returns a usable bearer token, silently refreshing (and persisting
    /// the re-encrypted result) when the stored one is missing or about to
    /// expire.
    async fn fresh_access_token(&mut self) -> LeadGateResult<String> {
        let expired = match (&self.access_token, self.token_expiry) {
            (None, _) => true,
            (Some(_), Some(expiry)) => expiry - TOKEN_EXPIRY_MARGIN_MS <= utc_now!(),
            (Some(_), None) => false,
        };
        if !expired {
            // access_token is Some here
            return Ok(self.access_token.clone().unwrap_or_default());
        }

        let refreshed = refresh_google_token(&self.refresh_token).await?;
        MailboxConfig::update_tokens(
            self.company_id,
            &refreshed.access_token,
            refreshed.refresh_token.as_deref(),
            refreshed.expires_at,
        )
        .await?;
        if let Some(rotated) = &refreshed.refresh_token {
            self.refresh_token = rotated.clone();
        }
        self.token_expiry = refreshed.expires_at;
        self.access_token = Some(refreshed.access_token.clone());
        Ok(refreshed.access_token)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        token: &str,
        url: &str,
    ) -> LeadGateResult<T> {
        let response = self
            .http_client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::NetworkError))?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(raise_error!(
                format!("Gmail API returned {status}: {body}"),
                ErrorCode::GmailApiCallFailed
            ));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::GmailApiCallFailed))
    }
}

fn urlencoded(query: &str) -> String {
    url::form_urlencoded::byte_serialize(query.as_bytes()).collect()
}

#[derive(Debug, Deserialize)]
struct MessageList {
    messages: Option<Vec<MessageRef>>,
}

#[derive(Debug, Deserialize)]
struct MessageRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct GmailMessage {
    id: String,
    payload: Option<MessagePart>,
}

#[derive(Debug, Deserialize)]
struct MessagePart {
    #[serde(rename = "mimeType", default)]
    mime_type: String,
    #[serde(default)]
    headers: Vec<Header>,
    body: Option<PartBody>,
    #[serde(default)]
    parts: Vec<MessagePart>,
}

#[derive(Debug, Deserialize)]
struct Header {
    name: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct PartBody {
    data: Option<String>,
}

fn into_parsed_email(message: GmailMessage) -> ParsedEmail {
    let mut from = String::new();
    let mut subject = String::new();
    let mut date = utc_now!();
    let mut body = String::new();

    if let Some(payload) = &message.payload {
        for header in &payload.headers {
            match header.name.as_str() {
                "From" => from = header.value.clone(),
                "Subject" => subject = header.value.clone(),
                "Date" => {
                    if let Ok(parsed) = chrono::DateTime::parse_from_rfc2822(&header.value) {
                        date = parsed.timestamp_millis();
                    }
                }
                _ => {}
            }
        }
        body = extract_body(payload, "text/html")
            .or_else(|| extract_body(payload, "text/plain"))
            .unwrap_or_default();
    }

    ParsedEmail {
        message_id: message.id,
        from,
        subject,
        body,
        date,
    }
}

/// Walks the multipart tree looking for the first part of `mime_type`,
/// base64url-decoding its data.
fn extract_body(part: &MessagePart, mime_type: &str) -> Option<String> {
    if part.mime_type == mime_type {
        if let Some(data) = part.body.as_ref().and_then(|b| b.data.as_deref()) {
            if let Some(decoded) = decode_base64_url(data) {
                return Some(decoded);
            }
        }
    }
    part.parts
        .iter()
        .find_map(|child| extract_body(child, mime_type))
}

fn decode_base64_url(data: &str) -> Option<String> {
    general_purpose::URL_SAFE
        .decode(data)
        .or_else(|_| general_purpose::URL_SAFE_NO_PAD.decode(data))
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_extraction_prefers_html() {
        let payload = MessagePart {
            mime_type: "multipart/alternative".into(),
            headers: vec![],
            body: None,
            parts: vec![
                MessagePart {
                    mime_type: "text/plain".into(),
                    headers: vec![],
                    body: Some(PartBody {
                        data: Some(general_purpose::URL_SAFE.encode("plain text")),
                    }),
                    parts: vec![],
                },
                MessagePart {
                    mime_type: "text/html".into(),
                    headers: vec![],
                    body: Some(PartBody {
                        data: Some(general_purpose::URL_SAFE.encode("<p>html</p>")),
                    }),
                    parts: vec![],
                },
            ],
        };
        let body = extract_body(&payload, "text/html")
            .or_else(|| extract_body(&payload, "text/plain"))
            .unwrap();
        assert_eq!(body, "<p>html</p>");
    }

    #[test]
    fn nested_multipart_is_searched_recursively() {
        let payload = MessagePart {
            mime_type: "multipart/mixed".into(),
            headers: vec![],
            body: None,
            parts: vec![MessagePart {
                mime_type: "multipart/alternative".into(),
                headers: vec![],
                body: None,
                parts: vec![MessagePart {
                    mime_type: "text/html".into(),
                    headers: vec![],
                    body: Some(PartBody {
                        data: Some(general_purpose::URL_SAFE_NO_PAD.encode("<b>deep</b>")),
                    }),
                    parts: vec![],
                }],
            }],
        };
        assert_eq!(
            extract_body(&payload, "text/html").unwrap(),
            "<b>deep</b>"
        );
    }
}
