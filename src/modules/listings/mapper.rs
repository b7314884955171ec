// Copyright © 2025 leadgate.dev
// Licensed under LeadGate License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::error::code::ErrorCode;
use crate::modules::error::LeadGateResult;
use crate::modules::listings::types::{to_f64, to_i32, ListingItem};
use crate::modules::property::{Property, PropertyOrigin, PropertyType};
use crate::raise_error;
use crate::utc_now;
use serde_json::Value;
use std::collections::BTreeMap;

/// Maps one upstream listing onto the domain `Property`. The id is left 0;
/// the upsert assigns or preserves it.
pub fn map_listing(item: &ListingItem, company_id: u64) -> LeadGateResult<Property> {
    let reference = usable_reference(item)?;
    let type_name = if item.property_type.type_name.is_empty() {
        &item.property_type.name_type
    } else {
        &item.property_type.type_name
    };

    let mut photos = Vec::new();
    if !item.main_image.is_empty() {
        photos.push(item.main_image.clone());
    }
    for picture in &item.pictures.pictures {
        if !picture.url.is_empty() && picture.url != item.main_image {
            photos.push(picture.url.clone());
        }
    }

    let mut features: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for category in &item.property_features.categories {
        if category.category.is_empty() {
            continue;
        }
        features.insert(category.category.clone(), feature_values(&category.value));
    }

    let now = utc_now!();
    Ok(Property {
        id: 0,
        reference,
        company_id,
        origin: PropertyOrigin::PortalImport,
        status: "AVAILABLE".into(),
        title: format!("{type_name} in {}", item.location),
        description: item.description.clone(),
        property_type: map_type(type_name),
        country: if item.country.is_empty() {
            "Spain".into()
        } else {
            item.country.clone()
        },
        province: item.province.clone(),
        city: item.location.clone(),
        address: item.location.clone(),
        area_m2: to_f64(&item.built),
        rooms: to_i32(&item.bedrooms),
        bathrooms: to_i32(&item.bathrooms),
        price: to_f64(&item.price),
        currency: item.currency.clone(),
        main_image: (!item.main_image.is_empty()).then(|| item.main_image.clone()),
        photos,
        features,
        created_by_agent_id: None,
        created_at: now,
        updated_at: now,
    })
}

fn usable_reference(item: &ListingItem) -> LeadGateResult<String> {
    if !item.reference.is_empty() {
        return Ok(item.reference.clone());
    }
    if !item.agency_ref.is_empty() {
        return Ok(item.agency_ref.clone());
    }
    Err(raise_error!(
        "listing carries no usable reference".into(),
        ErrorCode::ListingMappingFailed
    ))
}

/// Feature values arrive either as one string or as an array of strings.
fn feature_values(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_owned))
            .collect(),
        _ => Vec::new(),
    }
}

/// Substring taxonomy over the free-form upstream type string.
pub fn map_type(type_name: &str) -> PropertyType {
    let lower = type_name.to_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));
    if has(&["apartment", "flat", "penthouse"]) {
        PropertyType::Apartment
    } else if has(&["villa", "house", "chalet", "townhouse"]) {
        PropertyType::House
    } else if has(&["land", "plot"]) {
        PropertyType::Land
    } else if has(&["commercial", "office", "shop"]) {
        PropertyType::Commercial
    } else {
        PropertyType::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::listings::types::{
        FeatureCategory, ListingFeatures, ListingTypeInfo, Picture, Pictures,
    };
    use serde_json::json;

    fn listing(reference: &str) -> ListingItem {
        ListingItem {
            reference: reference.into(),
            agency_ref: String::new(),
            country: "Spain".into(),
            province: "Málaga".into(),
            location: "Marbella".into(),
            property_type: ListingTypeInfo {
                name_type: "Apartment".into(),
                type_name: "Middle Floor Apartment".into(),
                subtype1: String::new(),
            },
            price: json!("265000"),
            currency: "EUR".into(),
            bedrooms: json!(3),
            bathrooms: json!("2"),
            built: json!(104.5),
            description: "Bright apartment near the beach".into(),
            main_image: "https://cdn.example.com/main.jpg".into(),
            property_features: ListingFeatures {
                categories: vec![
                    FeatureCategory {
                        category: "Pool".into(),
                        value: json!("Communal"),
                    },
                    FeatureCategory {
                        category: "Views".into(),
                        value: json!(["Sea", "Mountain"]),
                    },
                ],
            },
            pictures: Pictures {
                pictures: vec![
                    Picture {
                        url: "https://cdn.example.com/main.jpg".into(),
                    },
                    Picture {
                        url: "https://cdn.example.com/pool.jpg".into(),
                    },
                ],
            },
        }
    }

    #[test]
    fn maps_full_listing() {
        let property = map_listing(&listing("R4786633"), 42).unwrap();
        assert_eq!(property.reference, "R4786633");
        assert_eq!(property.company_id, 42);
        assert_eq!(property.origin, PropertyOrigin::PortalImport);
        assert_eq!(property.status, "AVAILABLE");
        assert_eq!(property.title, "Middle Floor Apartment in Marbella");
        assert_eq!(property.property_type, PropertyType::Apartment);
        assert_eq!(property.price, 265000.0);
        assert_eq!(property.rooms, 3);
        assert_eq!(property.bathrooms, 2);
        assert_eq!(property.area_m2, 104.5);
        assert_eq!(property.city, "Marbella");
        assert_eq!(property.id, 0);
    }

    #[test]
    fn photos_start_with_main_image_without_duplicates() {
        let property = map_listing(&listing("R1"), 1).unwrap();
        assert_eq!(
            property.photos,
            vec![
                "https://cdn.example.com/main.jpg".to_string(),
                "https://cdn.example.com/pool.jpg".to_string(),
            ]
        );
        assert_eq!(
            property.main_image.as_deref(),
            Some("https://cdn.example.com/main.jpg")
        );
    }

    #[test]
    fn features_accept_scalar_and_array_values() {
        let property = map_listing(&listing("R2"), 1).unwrap();
        assert_eq!(property.features["Pool"], vec!["Communal"]);
        assert_eq!(property.features["Views"], vec!["Sea", "Mountain"]);
    }

    #[test]
    fn agency_ref_backs_up_a_missing_reference() {
        let mut item = listing("");
        item.agency_ref = "7272-00444".into();
        let property = map_listing(&item, 1).unwrap();
        assert_eq!(property.reference, "7272-00444");
    }

    #[test]
    fn missing_reference_is_a_mapping_error() {
        let item = listing("");
        let err = map_listing(&item, 1).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ListingMappingFailed);
    }

    #[test]
    fn taxonomy_buckets_by_substring() {
        assert_eq!(map_type("Ground Floor Apartment"), PropertyType::Apartment);
        assert_eq!(map_type("Detached Villa"), PropertyType::House);
        assert_eq!(map_type("Townhouse"), PropertyType::House);
        assert_eq!(map_type("Residential Plot"), PropertyType::Land);
        assert_eq!(map_type("Office Space"), PropertyType::Commercial);
        assert_eq!(map_type("Parking Space"), PropertyType::Other);
    }

    #[test]
    fn numeric_coercion_handles_strings_and_numbers() {
        assert_eq!(to_f64(&json!("1250000.50")), 1250000.50);
        assert_eq!(to_f64(&json!(995000)), 995000.0);
        assert_eq!(to_f64(&json!(null)), 0.0);
        assert_eq!(to_i32(&json!("4")), 4);
        assert_eq!(to_i32(&json!(2.0)), 2);
        assert_eq!(to_i32(&json!("not a number")), 0);
    }
}
