// Copyright © 2025 leadgate.dev
// Licensed under LeadGate License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::config::mailbox::MailboxConfig;
use crate::modules::error::LeadGateResult;
use crate::modules::ingest::LeadIngestService;
use crate::modules::ledger::ProcessedMessage;
use crate::modules::transport::{MailTransport, ParsedEmail};
use tracing::{debug, warn};

pub mod supervisor;
#[cfg(test)]
mod tests;

/// Polls one tenant's inbox and funnels fresh messages into the ingestion
/// service. One instance per enabled mailbox, driven by a `PeriodicTask`;
/// any error escaping `poll_cycle` is logged there and the next cycle runs
/// on schedule.
pub struct CompanyMailWorker {
    company_id: u64,
    transport: MailTransport,
    ingest: LeadIngestService,
}

impl CompanyMailWorker {
    pub fn new(company_id: u64, transport: MailTransport) -> Self {
        Self {
            company_id,
            transport,
            ingest: LeadIngestService::new(company_id),
        }
    }

    pub async fn poll_cycle(&mut self) -> LeadGateResult<()> {
        let emails = self.transport.fetch_unread().await?;
        let processed = Self::process_messages(&self.ingest, self.company_id, emails).await?;
        if processed > 0 {
            debug!(
                company_id = self.company_id,
                processed, "Mail poll cycle finished"
            );
        }
        MailboxConfig::mark_synced(self.company_id).await?;
        Ok(())
    }

    /// Runs the ledger-gated ingestion for a batch of fetched messages.
    /// Returns how many messages were newly attempted.
    ///
    /// The ledger entry is written even when ingestion fails: a message
    /// that cannot be processed today will not parse better tomorrow, and
    /// retrying it every cycle forever would drown the log.
    pub async fn process_messages(
        ingest: &LeadIngestService,
        company_id: u64,
        emails: Vec<ParsedEmail>,
    ) -> LeadGateResult<usize> {
        let mut processed = 0usize;
        for email in emails {
            if ProcessedMessage::exists(company_id, &email.message_id).await? {
                continue;
            }
            if let Err(e) = ingest.process_email(&email).await {
                warn!(
                    company_id,
                    message_id = %email.message_id,
                    from = %email.from,
                    "Failed to ingest message: {e}"
                );
            }
            ProcessedMessage::record(company_id, &email.message_id).await?;
            processed += 1;
        }
        Ok(processed)
    }
}
