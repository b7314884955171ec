// Copyright © 2025 leadgate.dev
// Licensed under LeadGate License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::database::manager::DB_MANAGER;
use crate::modules::database::{async_find_impl, batch_delete_impl, upsert_impl};
use crate::modules::error::code::ErrorCode;
use crate::modules::error::LeadGateResult;
use crate::raise_error;
use crate::utc_now;
use itertools::Itertools;
use native_db::*;
use native_model::{native_model, Model};
use serde::{Deserialize, Serialize};

/// A message the worker has already handled for a given tenant.
///
/// Because inbox messages are never marked read, this append-only ledger is
/// the only thing standing between a poll cycle and re-ingesting the same
/// email forever. A row is written after every processing attempt, including
/// failed ones, so a poison message is attempted exactly once.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[native_model(id = 3, version = 1)]
#[native_db(primary_key(pk -> String))]
pub struct ProcessedMessage {
    /// Provider-assigned message id (IMAP Message-ID header or Gmail id)
    pub message_id: String,
    /// Company (tenant) whose inbox produced the message
    #[secondary_key]
    pub company_id: u64,
    /// When the message was handled (epoch milliseconds)
    pub processed_at: i64,
}

impl ProcessedMessage {
    fn pk(&self) -> String {
        format!("{}:{}", self.company_id, self.message_id)
    }

    /// Whether `(company_id, message_id)` was already handled.
    pub async fn exists(company_id: u64, message_id: &str) -> LeadGateResult<bool> {
        let key = format!("{}:{}", company_id, message_id);
        Ok(
            async_find_impl::<ProcessedMessage>(DB_MANAGER.meta_db(), key)
                .await?
                .is_some(),
        )
    }

    /// Records a processing attempt. Upsert keeps a concurrent double-record
    /// harmless.
    pub async fn record(company_id: u64, message_id: &str) -> LeadGateResult<()> {
        let entry = ProcessedMessage {
            message_id: message_id.to_string(),
            company_id,
            processed_at: utc_now!(),
        };
        upsert_impl(DB_MANAGER.meta_db(), entry).await
    }

    /// Deletes ledger rows with `processed_at` before `cutoff` (epoch
    /// milliseconds). Returns the number of rows removed.
    pub async fn prune_older_than(cutoff: i64) -> LeadGateResult<usize> {
        batch_delete_impl::<ProcessedMessage>(DB_MANAGER.meta_db(), move |rw| {
            let expired: Vec<ProcessedMessage> = rw
                .scan()
                .primary()
                .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?
                .all()
                .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?
                .filter_ok(|entry: &ProcessedMessage| entry.processed_at < cutoff)
                .try_collect()
                .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?;
            Ok(expired)
        })
        .await
    }
}
