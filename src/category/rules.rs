//! Item-type listing rules
//!
//! Each item family has different eBay requirements: allowed condition
//! values, aspects that must be present, and aspects that only accept a
//! single value. Free-text item types from the AI analysis are mapped
//! onto a known family first.

use std::collections::BTreeMap;

/// Per-family listing rules.
#[derive(Debug)]
pub struct ItemTypeRules {
    pub name: &'static str,
    pub default_category_id: &'static str,
    /// Ordered, most specific key first: matching is substring-based.
    pub condition_mapping: &'static [(&'static str, &'static str)],
    pub default_condition: &'static str,
    pub required_aspects: &'static [&'static str],
    pub default_aspects: &'static [(&'static str, &'static str)],
    pub single_value_aspects: &'static [&'static str],
}

static CLOTHING: ItemTypeRules = ItemTypeRules {
    name: "Clothing",
    default_category_id: "15687", // Men's T-Shirts
    condition_mapping: &[
        ("like new", "PRE_OWNED_EXCELLENT"),
        ("very good", "PRE_OWNED_EXCELLENT"),
        ("excellent", "PRE_OWNED_EXCELLENT"),
        ("acceptable", "PRE_OWNED_FAIR"),
        ("good", "USED_GOOD"),
        ("fair", "PRE_OWNED_FAIR"),
        ("new", "NEW"),
    ],
    default_condition: "PRE_OWNED_EXCELLENT",
    required_aspects: &["Brand", "Department"],
    default_aspects: &[("Brand", "Unbranded"), ("Department", "Unisex Adults")],
    single_value_aspects: &["Colour", "Size", "Department"],
};

static KITCHENWARE: ItemTypeRules = ItemTypeRules {
    name: "Kitchenware/Crockery",
    default_category_id: "20693", // Mugs
    // Crockery only allows NEW, NEW_OTHER or ungraded USED
    condition_mapping: &[
        ("new other", "NEW_OTHER"),
        ("like new", "USED"),
        ("very good", "USED"),
        ("excellent", "USED"),
        ("acceptable", "USED"),
        ("good", "USED"),
        ("fair", "USED"),
        ("used", "USED"),
        ("new", "NEW"),
    ],
    default_condition: "USED",
    required_aspects: &["Brand"],
    default_aspects: &[("Brand", "Unbranded")],
    single_value_aspects: &["Colour"],
};

static SHOES: ItemTypeRules = ItemTypeRules {
    name: "Shoes",
    default_category_id: "93427", // Men's Shoes
    condition_mapping: &[
        ("like new", "PRE_OWNED_EXCELLENT"),
        ("very good", "PRE_OWNED_EXCELLENT"),
        ("excellent", "PRE_OWNED_EXCELLENT"),
        ("acceptable", "PRE_OWNED_FAIR"),
        ("good", "USED_GOOD"),
        ("fair", "PRE_OWNED_FAIR"),
        ("new", "NEW"),
    ],
    default_condition: "PRE_OWNED_EXCELLENT",
    required_aspects: &["Brand", "UK Shoe Size"],
    default_aspects: &[("Brand", "Unbranded")],
    single_value_aspects: &["Colour", "UK Shoe Size"],
};

static BOOKS: ItemTypeRules = ItemTypeRules {
    name: "Books & Media",
    default_category_id: "261186", // Books
    condition_mapping: &[
        ("like new", "LIKE_NEW"),
        ("very good", "USED_VERY_GOOD"),
        ("excellent", "LIKE_NEW"),
        ("acceptable", "USED_ACCEPTABLE"),
        ("good", "USED_GOOD"),
        ("fair", "USED_ACCEPTABLE"),
        ("new", "NEW"),
    ],
    default_condition: "USED_VERY_GOOD",
    required_aspects: &["Brand"],
    default_aspects: &[("Brand", "Unbranded")],
    single_value_aspects: &[],
};

static ELECTRONICS: ItemTypeRules = ItemTypeRules {
    name: "Electronics",
    default_category_id: "175672", // Consumer Electronics
    condition_mapping: &[
        ("like new", "USED_EXCELLENT"),
        ("very good", "USED_VERY_GOOD"),
        ("excellent", "USED_EXCELLENT"),
        ("acceptable", "USED_ACCEPTABLE"),
        ("good", "USED_GOOD"),
        ("fair", "USED_ACCEPTABLE"),
        ("new", "NEW"),
    ],
    default_condition: "USED_VERY_GOOD",
    required_aspects: &["Brand"],
    default_aspects: &[("Brand", "Unbranded")],
    single_value_aspects: &["Colour"],
};

static GENERAL: ItemTypeRules = ItemTypeRules {
    name: "General/Other",
    default_category_id: "11450", // Other
    condition_mapping: &[
        ("like new", "USED_EXCELLENT"),
        ("very good", "USED_VERY_GOOD"),
        ("excellent", "USED_EXCELLENT"),
        ("acceptable", "USED_ACCEPTABLE"),
        ("good", "USED_GOOD"),
        ("fair", "USED_ACCEPTABLE"),
        ("new", "NEW"),
    ],
    default_condition: "USED_VERY_GOOD",
    required_aspects: &["Brand"],
    default_aspects: &[("Brand", "Unbranded")],
    single_value_aspects: &["Colour"],
};

/// Maps a free-text item type onto a known family. Unknown types land in
/// the general family.
pub fn rules_for_item_type(item_type: &str) -> &'static ItemTypeRules {
    match item_type.to_lowercase().trim() {
        "clothing" | "clothes" | "apparel" | "t-shirt" | "tshirt" | "shirt" | "dress"
        | "jacket" | "jeans" | "trousers" | "pants" => &CLOTHING,
        "kitchenware" | "crockery" | "mug" | "mugs" | "cup" | "plate" | "bowl" | "dish"
        | "ceramic" | "pottery" => &KITCHENWARE,
        "shoes" | "shoe" | "footwear" | "trainers" | "boots" | "heels" | "sandals"
        | "sneakers" => &SHOES,
        "books" | "book" | "media" | "dvd" | "cd" | "vinyl" | "magazine" => &BOOKS,
        "electronics" | "electronic" | "phone" | "laptop" | "computer" | "camera"
        | "tablet" | "gadget" => &ELECTRONICS,
        _ => &GENERAL,
    }
}

/// Maps an arbitrary condition string onto the family's allowed set.
pub fn normalize_condition_for_type(condition: &str, item_type: &str) -> &'static str {
    let rules = rules_for_item_type(item_type);
    let condition_lower = condition.to_lowercase().replace(['_', '-'], " ");

    for (key, value) in rules.condition_mapping {
        if condition_lower.contains(key) {
            return value;
        }
    }

    rules.default_condition
}

/// Fills in required aspects and enforces single-value constraints.
pub fn apply_required_aspects(
    aspects: &mut BTreeMap<String, Vec<String>>,
    item_type: &str,
) {
    let rules = rules_for_item_type(item_type);

    // GB marketplace spells it "Colour"
    if let Some(values) = aspects.remove("Color") {
        aspects.entry("Colour".to_string()).or_insert(values);
    }

    for aspect_name in rules.required_aspects {
        let missing = aspects
            .get(*aspect_name)
            .map(|v| v.is_empty())
            .unwrap_or(true);
        if missing {
            let default_value = rules
                .default_aspects
                .iter()
                .find(|(name, _)| name == aspect_name)
                .map(|(_, value)| *value)
                .unwrap_or("Not Specified");
            aspects.insert(aspect_name.to_string(), vec![default_value.to_string()]);
        }
    }

    for aspect_name in rules.single_value_aspects {
        if let Some(values) = aspects.get_mut(*aspect_name) {
            if values.len() > 1 {
                if *aspect_name == "Colour" {
                    *values = vec!["Multicoloured".to_string()];
                } else {
                    values.truncate(1);
                }
            }
        }
    }
}

/// Default eBay category for an item family.
pub fn default_category_for_type(item_type: &str) -> &'static str {
    rules_for_item_type(item_type).default_category_id
}
