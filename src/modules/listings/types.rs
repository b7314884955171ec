// Copyright © 2025 leadgate.dev
// Licensed under LeadGate License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use serde::Deserialize;
use serde_json::Value;

/// Envelope returned by every `SearchProperties` call.
#[derive(Debug, Default, Deserialize)]
pub struct ListingsResponse {
    #[serde(default)]
    pub transaction: Transaction,
    #[serde(rename = "QueryInfo")]
    pub query_info: Option<QueryInfo>,
    #[serde(rename = "Property", default)]
    pub properties: Vec<ListingItem>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Transaction {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub version: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct QueryInfo {
    #[serde(rename = "PropertyCount", default)]
    pub property_count: u32,
    #[serde(rename = "CurrentPage", default)]
    pub current_page: u32,
}

/// One property as the upstream API ships it. Numeric fields arrive as
/// strings or numbers depending on the listing, so they stay `Value` here
/// and are coerced in the mapper.
#[derive(Debug, Default, Deserialize)]
pub struct ListingItem {
    #[serde(rename = "Reference", default)]
    pub reference: String,
    /// Agency's own reference, used when `Reference` is absent
    #[serde(rename = "AgencyRef", default)]
    pub agency_ref: String,
    #[serde(rename = "Country", default)]
    pub country: String,
    #[serde(rename = "Province", default)]
    pub province: String,
    #[serde(rename = "Location", default)]
    pub location: String,
    #[serde(rename = "PropertyType", default)]
    pub property_type: ListingTypeInfo,
    #[serde(rename = "Price", default)]
    pub price: Value,
    #[serde(rename = "Currency", default)]
    pub currency: String,
    #[serde(rename = "Bedrooms", default)]
    pub bedrooms: Value,
    #[serde(rename = "Bathrooms", default)]
    pub bathrooms: Value,
    #[serde(rename = "Built", default)]
    pub built: Value,
    #[serde(rename = "Description", default)]
    pub description: String,
    #[serde(rename = "MainImage", default)]
    pub main_image: String,
    #[serde(rename = "PropertyFeatures", default)]
    pub property_features: ListingFeatures,
    #[serde(rename = "Pictures", default)]
    pub pictures: Pictures,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListingTypeInfo {
    #[serde(rename = "NameType", default)]
    pub name_type: String,
    #[serde(rename = "Type", default)]
    pub type_name: String,
    #[serde(rename = "Subtype1", default)]
    pub subtype1: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListingFeatures {
    #[serde(rename = "Category", default)]
    pub categories: Vec<FeatureCategory>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FeatureCategory {
    #[serde(rename = "Type", default)]
    pub category: String,
    /// Scalar string or array of strings
    #[serde(rename = "Value", default)]
    pub value: Value,
}

#[derive(Debug, Default, Deserialize)]
pub struct Pictures {
    #[serde(rename = "Picture", default)]
    pub pictures: Vec<Picture>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Picture {
    #[serde(rename = "PictureURL", default)]
    pub url: String,
}

pub fn to_f64(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

pub fn to_i32(value: &Value) -> i32 {
    match value {
        Value::Number(n) => n.as_f64().map(|f| f as i32).unwrap_or(0),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map(|f| f as i32)
            .unwrap_or(0),
        _ => 0,
    }
}
