//! Document projection.
//!
//! Restaurants are flat documents carrying a `zone_id` foreign key; zones
//! carry no restaurant list. Per-zone rankings join the two at query time.

use serde_json::{json, Value};

use crate::domain::{normalize_city_name, LinkedModel};
use crate::error::InsufficientDataError;
use crate::port::outbound::document::{Document, IndexSpec, SortKey};

pub const ZONES: &str = "zones";
pub const RESTAURANTS: &str = "restaurants";

/// Documents for both collections.
#[derive(Debug, Clone, Default)]
pub struct DocumentBatch {
    pub zones: Vec<Document>,
    pub restaurants: Vec<Document>,
}

impl DocumentBatch {
    #[must_use]
    pub fn len(&self) -> usize {
        self.zones.len() + self.restaurants.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Key used to look a zone up by name: diacritic-free and lowercased.
#[must_use]
pub fn zone_name_key(name: &str) -> String {
    normalize_city_name(name).to_lowercase()
}

/// Indexes on the restaurant collection.
#[must_use]
pub fn indexes() -> Vec<(&'static str, IndexSpec)> {
    vec![
        (RESTAURANTS, IndexSpec::single(SortKey::asc("category"))),
        (RESTAURANTS, IndexSpec::single(SortKey::desc("rating"))),
        (RESTAURANTS, IndexSpec::single(SortKey::asc("zone_id"))),
    ]
}

fn object(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        _ => Document::new(),
    }
}

/// Project every zone and restaurant.
///
/// # Errors
///
/// [`InsufficientDataError::UnassignedZone`] if a restaurant has no zone.
pub fn project(model: &LinkedModel) -> Result<DocumentBatch, InsufficientDataError> {
    let zones = model
        .zones()
        .iter()
        .map(|zone| {
            object(json!({
                "id": zone.id.get(),
                "name": zone.name,
                "name_key": zone_name_key(&zone.name),
            }))
        })
        .collect();

    let restaurants = model
        .restaurants()
        .iter()
        .map(|restaurant| {
            let zone = restaurant
                .zone
                .ok_or(InsufficientDataError::UnassignedZone(restaurant.id))?;
            Ok(object(json!({
                "id": restaurant.id.get(),
                "name": restaurant.name,
                "category": restaurant.category.as_str(),
                "rating": restaurant.rating,
                "sales": restaurant.sales.as_slice(),
                "zone_id": zone.get(),
            })))
        })
        .collect::<Result<_, _>>()?;

    Ok(DocumentBatch { zones, restaurants })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::fixtures;

    #[test]
    fn restaurants_reference_their_zone_by_id() {
        let model = fixtures::linked_model(5);
        let batch = project(&model).unwrap();
        assert_eq!(batch.restaurants.len(), model.restaurants().len());
        for (doc, restaurant) in batch.restaurants.iter().zip(model.restaurants()) {
            assert_eq!(doc["zone_id"], json!(restaurant.zone.unwrap().get()));
            assert_eq!(doc["sales"].as_array().map(Vec::len), Some(12));
            assert!(!doc.contains_key("zone"));
        }
    }

    #[test]
    fn zones_carry_no_restaurant_list() {
        let batch = project(&fixtures::linked_model(5)).unwrap();
        assert!(batch.zones.iter().all(|z| !z.contains_key("restaurants")));
    }

    #[test]
    fn zone_key_strips_accents_and_case() {
        assert_eq!(zone_name_key("Cancún"), "cancun");
        assert_eq!(zone_name_key("  ciudad de MÉXICO "), zone_name_key("Ciudad de Mexico"));
    }

    #[test]
    fn index_names_follow_store_convention() {
        let names: Vec<_> = indexes().iter().map(|(_, spec)| spec.name()).collect();
        assert_eq!(names, vec!["category_1", "rating_-1", "zone_id_1"]);
    }
}
