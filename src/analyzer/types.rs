//! AI analysis result types

use crate::category::AttributeBundle;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Normalized listing data produced from one product image.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingAnalysis {
    /// SEO title, at most 80 characters.
    pub title: String,
    /// HTML description.
    pub description: String,
    /// Suggested price in GBP.
    pub price: f64,
    /// Inventory API condition enum value.
    pub condition: String,
    /// Item specifics as name -> values.
    pub aspects: BTreeMap<String, Vec<String>>,
    /// Free-text hints for category matching.
    pub category_keywords: String,
}

impl ListingAnalysis {
    /// Flattens the analysis into matcher input. The title, keywords and
    /// every aspect (capped at two values each) contribute.
    pub fn attribute_bundle(&self) -> AttributeBundle {
        let mut bundle = AttributeBundle::new();
        bundle.insert("Title", &self.title);
        bundle.insert("Keywords", &self.category_keywords);

        for (name, values) in &self.aspects {
            bundle.insert_all(name, &values[..values.len().min(2)]);
        }

        bundle
    }

    /// First item-type-ish aspect value, used to pick the rules family.
    pub fn item_type(&self) -> &str {
        for name in ["Type", "Garment Type", "Product Type"] {
            if let Some(value) = self.aspects.get(name).and_then(|v| v.first()) {
                return value;
            }
        }
        "general"
    }
}
