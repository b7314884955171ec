// Copyright © 2025 leadgate.dev
// Licensed under LeadGate License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::id;
use crate::modules::database::manager::DB_MANAGER;
use crate::modules::database::{
    filter_by_secondary_key_impl, insert_impl, secondary_find_impl, update_impl,
};
use crate::modules::error::code::ErrorCode;
use crate::modules::error::LeadGateResult;
use crate::raise_error;
use crate::utc_now;
use native_db::*;
use native_model::{native_model, Model};
use poem_openapi::{Enum, Object};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a lead. Every lead starts as `New`; repeated portal
/// contact moves it to `Contacted`, including reopening a `Closed` lead.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Enum)]
pub enum LeadStatus {
    #[default]
    New,
    Contacted,
    Qualified,
    Closed,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, Object)]
#[native_model(id = 1, version = 1)]
#[native_db]
pub struct Lead {
    /// Unique lead identifier
    #[primary_key]
    pub id: u64,
    /// Contact email address. One lead per email address.
    #[secondary_key(unique)]
    pub email: String,
    /// Company (tenant) that owns this lead
    #[secondary_key]
    pub company_id: u64,
    /// Display name of the contact
    pub name: String,
    /// Contact phone number, may be empty when the portal omitted it
    pub phone: String,
    pub status: LeadStatus,
    /// The property the lead most recently asked about
    pub property_id: Option<u64>,
    /// Portal that produced the most recent contact (e.g. "Fotocasa")
    pub source: String,
    /// Acquisition channel, always "email" for portal-mail leads
    pub channel: String,
    /// Append-only interaction log. Merge operations add timestamped notes,
    /// they never rewrite earlier entries.
    pub notes: String,
    /// Timestamp of the most recent inbound contact (epoch milliseconds)
    pub last_interaction: Option<i64>,
    /// Creation timestamp (UNIX epoch milliseconds)
    pub created_at: i64,
    /// Last update timestamp (UNIX epoch milliseconds)
    pub updated_at: i64,
}

impl Lead {
    pub async fn find_by_email(email: &str) -> LeadGateResult<Option<Lead>> {
        secondary_find_impl::<Lead>(DB_MANAGER.meta_db(), LeadKey::email, email.to_string()).await
    }

    pub async fn get(lead_id: u64) -> LeadGateResult<Lead> {
        crate::modules::database::async_find_impl::<Lead>(DB_MANAGER.meta_db(), lead_id)
            .await?
            .ok_or_else(|| {
                raise_error!(
                    format!("Lead with ID '{lead_id}' not found"),
                    ErrorCode::ResourceNotFound
                )
            })
    }

    pub async fn list_by_company(company_id: u64) -> LeadGateResult<Vec<Lead>> {
        filter_by_secondary_key_impl::<Lead>(DB_MANAGER.meta_db(), LeadKey::company_id, company_id)
            .await
    }

    pub async fn save(&self) -> LeadGateResult<()> {
        insert_impl(DB_MANAGER.meta_db(), self.to_owned()).await
    }

    /// Replaces the stored lead with `updated`, keyed by its id.
    pub async fn persist_update(updated: Lead) -> LeadGateResult<()> {
        let lead_id = updated.id;
        update_impl(
            DB_MANAGER.meta_db(),
            move |rw| {
                rw.get()
                    .primary::<Lead>(lead_id)
                    .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?
                    .ok_or_else(|| {
                        raise_error!(
                            format!("Lead with ID '{lead_id}' not found"),
                            ErrorCode::ResourceNotFound
                        )
                    })
            },
            move |_| Ok(updated),
        )
        .await?;
        Ok(())
    }
}

/// Builder used by the ingestion service when no lead matches the email yet.
pub struct NewLead {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub property_id: Option<u64>,
    pub company_id: u64,
    pub source: String,
    pub notes: String,
}

impl NewLead {
    pub fn into_lead(self) -> Lead {
        let now = utc_now!();
        Lead {
            id: id!(),
            email: self.email,
            company_id: self.company_id,
            name: self.name,
            phone: self.phone,
            status: LeadStatus::New,
            property_id: self.property_id,
            source: self.source,
            channel: "email".into(),
            notes: self.notes,
            last_interaction: Some(now),
            created_at: now,
            updated_at: now,
        }
    }
}
