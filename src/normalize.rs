//! Turns the parsed reply array into typed outfit records.
//!
//! Normalization is lenient: elements that are not objects are skipped,
//! and every field falls back to a declared default when it is missing or
//! has the wrong shape. Nothing here returns an error.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use serde_with::{serde_as, DefaultOnError};
use tracing::{debug, warn};

use crate::models::{Category, OutfitItem, OutfitRecord, TotalPrice};

const DEFAULT_OUTFIT_NAME: &str = "Outfit";

#[serde_as]
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OutfitWire {
    #[serde_as(deserialize_as = "DefaultOnError")]
    outfit_name: String,
    #[serde_as(deserialize_as = "DefaultOnError")]
    items: Vec<Value>,
    #[serde(deserialize_with = "lenient_total")]
    total_price: Option<f64>,
}

#[serde_as]
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ItemWire {
    #[serde_as(deserialize_as = "DefaultOnError")]
    category: String,
    #[serde_as(deserialize_as = "DefaultOnError")]
    name: String,
    #[serde_as(deserialize_as = "DefaultOnError")]
    brand: String,
    #[serde_as(deserialize_as = "DefaultOnError")]
    color: String,
    #[serde_as(deserialize_as = "DefaultOnError")]
    material: String,
    #[serde(deserialize_with = "lenient_price")]
    price: f64,
}

/// Accepts numbers and numeric text such as `"$45.50"`. Negative or
/// non-finite amounts count as unparsable.
pub fn parse_price(value: &Value) -> Option<f64> {
    let amount = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let s = s.trim();
            s.strip_prefix('$').unwrap_or(s).trim().parse::<f64>().ok()?
        }
        _ => return None,
    };
    (amount.is_finite() && amount >= 0.0).then_some(amount)
}

fn lenient_price<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(parse_price(&value).unwrap_or(0.0))
}

fn lenient_total<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(parse_price(&value))
}

pub fn normalize(elements: Vec<Value>) -> Vec<OutfitRecord> {
    let total = elements.len();
    let records: Vec<OutfitRecord> = elements
        .into_iter()
        .enumerate()
        .filter_map(|(idx, element)| normalize_outfit(idx, element))
        .collect();
    if records.len() != total {
        warn!("⚠️ Kept {} of {} outfit entries", records.len(), total);
    }
    records
}

fn normalize_outfit(idx: usize, element: Value) -> Option<OutfitRecord> {
    if !element.is_object() {
        warn!("⚠️ Skipping outfit #{}: not an object", idx);
        return None;
    }
    let wire: OutfitWire = match serde_json::from_value(element) {
        Ok(wire) => wire,
        Err(e) => {
            warn!("⚠️ Skipping outfit #{}: {}", idx, e);
            return None;
        }
    };

    let outfit_name = if wire.outfit_name.trim().is_empty() { DEFAULT_OUTFIT_NAME.to_string() } else { wire.outfit_name };
    let items: Vec<OutfitItem> = wire.items.into_iter().filter_map(normalize_item).collect();
    debug!("Outfit '{}' with {} items", outfit_name, items.len());

    Some(OutfitRecord {
        outfit_name,
        items,
        total_price: wire.total_price.map_or(TotalPrice::Unknown, TotalPrice::Amount),
    })
}

fn normalize_item(element: Value) -> Option<OutfitItem> {
    if !element.is_object() {
        debug!("Skipping non-object item: {}", element);
        return None;
    }
    let wire: ItemWire = serde_json::from_value(element).ok()?;
    Some(OutfitItem {
        category: Category::from(wire.category),
        name: wire.name,
        brand: wire.brand,
        color: wire.color,
        material: wire.material,
        price: wire.price,
    })
}
