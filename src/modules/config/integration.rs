// Copyright © 2025 leadgate.dev
// Licensed under LeadGate License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::database::manager::DB_MANAGER;
use crate::modules::database::{async_find_impl, update_impl, upsert_impl};
use crate::modules::error::code::ErrorCode;
use crate::modules::error::LeadGateResult;
use crate::raise_error;
use crate::utc_now;
use crate::{decrypt, encrypt};
use native_db::*;
use native_model::{native_model, Model};
use poem_openapi::Object;
use serde::{Deserialize, Serialize};

/// Per-tenant credentials for the external listings catalog.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Object)]
#[native_model(id = 5, version = 1)]
#[native_db]
pub struct IntegrationConfig {
    /// Company (tenant) this integration belongs to; one per company.
    #[primary_key]
    pub company_id: u64,
    /// Encrypted listings API key
    pub api_key: String,
    /// Agency identifier in the external catalog
    pub agency_id: String,
    pub enabled: bool,
    /// When the last bulk sync completed (epoch milliseconds)
    pub last_sync: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl IntegrationConfig {
    pub fn create(company_id: u64, api_key: &str, agency_id: &str) -> LeadGateResult<Self> {
        if api_key.is_empty() || agency_id.is_empty() {
            return Err(raise_error!(
                "Listings integration requires both 'api_key' and 'agency_id'".into(),
                ErrorCode::MissingConfiguration
            ));
        }
        let now = utc_now!();
        Ok(Self {
            company_id,
            api_key: encrypt!(api_key)?,
            agency_id: agency_id.to_string(),
            enabled: true,
            last_sync: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn decrypted_api_key(&self) -> LeadGateResult<String> {
        decrypt!(&self.api_key)
    }

    pub async fn find(company_id: u64) -> LeadGateResult<Option<IntegrationConfig>> {
        async_find_impl::<IntegrationConfig>(DB_MANAGER.meta_db(), company_id).await
    }

    /// Loads the config for a sync trigger; missing or disabled configs are
    /// both reported to the caller.
    pub async fn get_active(company_id: u64) -> LeadGateResult<IntegrationConfig> {
        let config = Self::find(company_id).await?.ok_or_else(|| {
            raise_error!(
                format!("No listings integration configured for company {company_id}"),
                ErrorCode::MissingConfiguration
            )
        })?;
        if !config.enabled {
            return Err(raise_error!(
                format!("Listings integration for company {company_id} is disabled"),
                ErrorCode::ConfigDisabled
            ));
        }
        Ok(config)
    }

    pub async fn save(&self) -> LeadGateResult<()> {
        upsert_impl(DB_MANAGER.meta_db(), self.to_owned()).await
    }

    /// Creates or replaces the stored credentials. History survives a
    /// replacement: created_at and last_sync are kept from the existing row.
    pub async fn apply(company_id: u64, api_key: &str, agency_id: &str) -> LeadGateResult<Self> {
        let mut config = Self::create(company_id, api_key, agency_id)?;
        if let Some(existing) = Self::find(company_id).await? {
            config.created_at = existing.created_at;
            config.last_sync = existing.last_sync;
        }
        config.save().await?;
        Ok(config)
    }

    /// Records a completed sync run.
    pub async fn mark_synced(company_id: u64) -> LeadGateResult<()> {
        update_impl(
            DB_MANAGER.meta_db(),
            move |rw| {
                rw.get()
                    .primary::<IntegrationConfig>(company_id)
                    .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?
                    .ok_or_else(|| {
                        raise_error!(
                            format!("No listings integration configured for company {company_id}"),
                            ErrorCode::ResourceNotFound
                        )
                    })
            },
            move |current| {
                let mut updated = current.clone();
                updated.last_sync = Some(utc_now!());
                updated.updated_at = utc_now!();
                Ok(updated)
            },
        )
        .await?;
        Ok(())
    }
}
