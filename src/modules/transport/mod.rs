// Copyright © 2025 leadgate.dev
// Licensed under LeadGate License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::config::mailbox::{AuthMethod, MailboxConfig};
use crate::modules::error::LeadGateResult;
use crate::modules::transport::gmail::GmailTransport;
use crate::modules::transport::imap::ImapTransport;

pub mod gmail;
pub mod imap;
pub mod oauth;
pub mod session;

/// A provider-neutral view of one inbox message. Both transports normalize
/// into this before the parser ever sees the email.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedEmail {
    /// Stable provider-assigned id, used as the ledger key
    pub message_id: String,
    pub from: String,
    pub subject: String,
    /// HTML body when available, plain text otherwise
    pub body: String,
    /// Message date (epoch milliseconds)
    pub date: i64,
}

/// The two ways a tenant inbox can be read. Selected once when the worker
/// is built; both variants honor the same contract: return currently
/// unread messages without marking anything read.
pub enum MailTransport {
    Imap(ImapTransport),
    Gmail(GmailTransport),
}

impl MailTransport {
    pub fn from_config(config: &MailboxConfig) -> LeadGateResult<Self> {
        match config.auth_method {
            AuthMethod::Password => Ok(MailTransport::Imap(ImapTransport::from_config(config)?)),
            AuthMethod::OAuth2 => Ok(MailTransport::Gmail(GmailTransport::from_config(config)?)),
        }
    }

    pub async fn fetch_unread(&mut self) -> LeadGateResult<Vec<ParsedEmail>> {
        match self {
            MailTransport::Imap(transport) => transport.fetch_unread().await,
            MailTransport::Gmail(transport) => transport.fetch_unread().await,
        }
    }
}
