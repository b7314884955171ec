// Copyright © 2025 leadgate.dev
// Licensed under LeadGate License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::id;
use crate::modules::database::manager::DB_MANAGER;
use crate::modules::database::{
    async_find_impl, filter_by_secondary_key_impl, insert_impl, secondary_find_impl, update_impl,
};
use crate::modules::error::code::ErrorCode;
use crate::modules::error::LeadGateResult;
use crate::raise_error;
use crate::utc_now;
use native_db::*;
use native_model::{native_model, Model};
use poem_openapi::{Enum, Object};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How a property entered the database.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Enum)]
pub enum PropertyOrigin {
    #[default]
    Manual,
    PortalImport,
}

/// Coarse property taxonomy, derived from free-form portal type strings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize, Enum)]
pub enum PropertyType {
    Apartment,
    House,
    Land,
    Commercial,
    #[default]
    Other,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, Object)]
#[native_model(id = 2, version = 1)]
#[native_db]
pub struct Property {
    /// Unique property identifier
    #[primary_key]
    pub id: u64,
    /// External listing reference (e.g. "R4786633"). The sole upsert key:
    /// re-importing the same reference updates this row instead of creating
    /// a duplicate.
    #[secondary_key(unique)]
    pub reference: String,
    /// Company (tenant) that owns this property
    #[secondary_key]
    pub company_id: u64,
    pub origin: PropertyOrigin,
    /// Listing availability, e.g. "AVAILABLE"
    pub status: String,
    pub title: String,
    pub description: String,
    pub property_type: PropertyType,
    pub country: String,
    pub province: String,
    pub city: String,
    pub address: String,
    /// Built area in square meters
    pub area_m2: f64,
    pub rooms: i32,
    pub bathrooms: i32,
    pub price: f64,
    /// ISO currency code, e.g. "EUR"
    pub currency: String,
    /// Primary listing image URL
    pub main_image: Option<String>,
    /// All listing image URLs, main image first, deduplicated
    pub photos: Vec<String>,
    /// Feature categories flattened to `category -> [values]`
    pub features: BTreeMap<String, Vec<String>>,
    /// Agent assigned when the property was curated in-house. Preserved
    /// across portal re-imports.
    pub created_by_agent_id: Option<u64>,
    /// Creation timestamp (UNIX epoch milliseconds)
    pub created_at: i64,
    /// Last update timestamp (UNIX epoch milliseconds)
    pub updated_at: i64,
}

impl Property {
    pub async fn find_by_reference(reference: &str) -> LeadGateResult<Option<Property>> {
        secondary_find_impl::<Property>(
            DB_MANAGER.meta_db(),
            PropertyKey::reference,
            reference.to_string(),
        )
        .await
    }

    pub async fn get(property_id: u64) -> LeadGateResult<Property> {
        async_find_impl::<Property>(DB_MANAGER.meta_db(), property_id)
            .await?
            .ok_or_else(|| {
                raise_error!(
                    format!("Property with ID '{property_id}' not found"),
                    ErrorCode::ResourceNotFound
                )
            })
    }

    pub async fn list_by_company(company_id: u64) -> LeadGateResult<Vec<Property>> {
        filter_by_secondary_key_impl::<Property>(
            DB_MANAGER.meta_db(),
            PropertyKey::company_id,
            company_id,
        )
        .await
    }

    pub async fn save(&self) -> LeadGateResult<()> {
        insert_impl(DB_MANAGER.meta_db(), self.to_owned()).await
    }

    /// Inserts `incoming` or, when its reference already exists, updates the
    /// stored row in place. Identity fields survive the update: id,
    /// created_at, origin of a manually curated row and the assigned agent
    /// are kept from the stored property.
    ///
    /// Returns `true` when a new row was created.
    pub async fn upsert_by_reference(mut incoming: Property) -> LeadGateResult<bool> {
        let existing = Self::find_by_reference(&incoming.reference).await?;
        match existing {
            Some(current) => {
                incoming.id = current.id;
                incoming.created_at = current.created_at;
                incoming.created_by_agent_id = current.created_by_agent_id;
                incoming.updated_at = utc_now!();
                let reference = incoming.reference.clone();
                update_impl(
                    DB_MANAGER.meta_db(),
                    move |rw| {
                        rw.get()
                            .secondary::<Property>(PropertyKey::reference, reference)
                            .map_err(|e| {
                                raise_error!(format!("{:#?}", e), ErrorCode::InternalError)
                            })?
                            .ok_or_else(|| {
                                raise_error!(
                                    "Property disappeared during upsert".into(),
                                    ErrorCode::InternalError
                                )
                            })
                    },
                    move |_| Ok(incoming),
                )
                .await?;
                Ok(false)
            }
            None => {
                if incoming.id == 0 {
                    incoming.id = id!();
                }
                let now = utc_now!();
                incoming.created_at = now;
                incoming.updated_at = now;
                incoming.save().await?;
                Ok(true)
            }
        }
    }
}
