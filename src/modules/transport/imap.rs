// Copyright © 2025 leadgate.dev
// Licensed under LeadGate License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::config::mailbox::MailboxConfig;
use crate::modules::error::code::ErrorCode;
use crate::modules::error::LeadGateResult;
use crate::modules::transport::session::SessionStream;
use crate::modules::transport::ParsedEmail;
use crate::modules::utils::net::{establish_tls_connection, resolve_to_socket_addr};
use crate::raise_error;
use crate::utc_now;
use async_imap::types::Fetch;
use async_imap::Client as ImapClient;
use async_imap::Session as ImapSession;
use futures::StreamExt;
use itertools::Itertools;
use mail_parser::MessageParser;
use tokio::io::BufWriter;
use tracing::debug;

/// One-shot IMAP poller. A fresh connection is made per poll cycle and torn
/// down afterwards, so a dead connection can never outlive a cycle.
pub struct ImapTransport {
    host: String,
    port: u16,
    username: String,
    password: String,
    folder: String,
}

impl ImapTransport {
    pub fn from_config(config: &MailboxConfig) -> LeadGateResult<Self> {
        Ok(Self {
            host: config.imap_host.clone(),
            port: config.imap_port,
            username: config.imap_username.clone(),
            password: config.decrypted_password()?,
            folder: config.inbox_folder.clone(),
        })
    }

    pub async fn fetch_unread(&self) -> LeadGateResult<Vec<ParsedEmail>> {
        let mut session = self.connect_and_login().await?;
        let result = self.fetch_unread_inner(&mut session).await;
        // Best effort, the connection is dropped either way
        let _ = session.logout().await;
        result
    }

    async fn connect_and_login(
        &self,
    ) -> LeadGateResult<ImapSession<Box<dyn SessionStream>>> {
        let address = resolve_to_socket_addr(&self.host, self.port)?;
        debug!("Attempting IMAP connection to {} ({address})", self.host);
        let tls_stream = establish_tls_connection(address, &self.host).await?;
        let buffered_stream = BufWriter::new(tls_stream);
        let session_stream: Box<dyn SessionStream> = Box::new(buffered_stream);
        let mut client = ImapClient::new(session_stream);

        let _greeting = client
            .read_response()
            .await
            .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::ImapCommandFailed))?
            .ok_or_else(|| {
                raise_error!(
                    "failed to read greeting".into(),
                    ErrorCode::ImapCommandFailed
                )
            })?;

        client
            .login(&self.username, &self.password)
            .await
            .map_err(|(e, _)| {
                raise_error!(format!("{:#?}", e), ErrorCode::ImapAuthenticationFailed)
            })
    }

    async fn fetch_unread_inner(
        &self,
        session: &mut ImapSession<Box<dyn SessionStream>>,
    ) -> LeadGateResult<Vec<ParsedEmail>> {
        session
            .select(&self.folder)
            .await
            .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::ImapCommandFailed))?;

        let unseen_uids = session
            .uid_search("UNSEEN")
            .await
            .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::ImapCommandFailed))?;
        if unseen_uids.is_empty() {
            return Ok(vec![]);
        }
        debug!(
            "Found {} unread message(s) in '{}'",
            unseen_uids.len(),
            self.folder
        );

        let uid_set = unseen_uids.iter().join(",");
        // BODY.PEEK so the fetch does not set \Seen; unread state stays
        // untouched and deduplication is the ledger's job.
        let fetches: Vec<async_imap::error::Result<Fetch>> = {
            let stream = session
                .uid_fetch(&uid_set, "(UID BODY.PEEK[])")
                .await
                .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::ImapCommandFailed))?;
            stream.collect().await
        };

        let mut emails = Vec::new();
        for fetch in fetches {
            let fetch =
                fetch.map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::ImapCommandFailed))?;
            if let Some(email) = extract_email(&fetch) {
                emails.push(email);
            }
        }
        Ok(emails)
    }
}

fn extract_email(fetch: &Fetch) -> Option<ParsedEmail> {
    let raw = fetch.body()?;
    let message = MessageParser::new().parse(raw)?;

    let message_id = message
        .message_id()
        .map(str::to_string)
        .or_else(|| fetch.uid.map(|uid| uid.to_string()))?;
    let from = message
        .from()
        .and_then(|address| address.first())
        .and_then(|addr| addr.address())
        .map(str::to_string)
        .unwrap_or_default();
    let subject = message.subject().map(str::to_string).unwrap_or_default();
    // HTML preferred, the parsers are built for it
    let body = message
        .body_html(0)
        .map(|html| html.to_string())
        .or_else(|| message.body_text(0).map(|text| text.to_string()))
        .unwrap_or_default();
    let date = message
        .date()
        .map(|dt| dt.to_timestamp() * 1000)
        .unwrap_or_else(|| utc_now!());

    Some(ParsedEmail {
        message_id,
        from,
        subject,
        body,
        date,
    })
}
