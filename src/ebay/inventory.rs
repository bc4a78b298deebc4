//! eBay Sell Inventory API
//!
//! Draft listings are two sequential calls: upsert an inventory item
//! keyed by SKU, then create an offer referencing it. Offers stay drafts
//! until explicitly published.

use crate::config::Config;
use crate::error::{ListerError, Result};
use serde_json::{json, Value};
use std::collections::BTreeMap;

const INV_BASE: &str = "https://api.ebay.com/sell/inventory/v1";

/// Inventory item fields before payload assembly.
#[derive(Debug, Default)]
pub struct InventoryItemDraft<'a> {
    pub sku: &'a str,
    pub title: &'a str,
    pub description: &'a str,
    pub quantity: u32,
    pub image_urls: &'a [String],
    pub condition: &'a str,
    pub brand: Option<&'a str>,
    pub mpn: Option<&'a str>,
    pub aspects: Option<&'a BTreeMap<String, Vec<String>>>,
}

/// `Content-Language` header value for a marketplace.
pub fn content_language(marketplace_id: &str) -> &'static str {
    match marketplace_id {
        "EBAY_US" => "en-US",
        "EBAY_AU" => "en-AU",
        "EBAY_DE" => "de-DE",
        "EBAY_FR" => "fr-FR",
        "EBAY_IT" => "it-IT",
        "EBAY_ES" => "es-ES",
        _ => "en-GB",
    }
}

pub fn build_inventory_item_payload(draft: &InventoryItemDraft) -> Result<Value> {
    if draft.image_urls.is_empty() {
        return Err(ListerError::InvalidListing(
            "image_urls is empty; at least one public URL is required".into(),
        ));
    }

    let title: String = draft.title.chars().take(80).collect();
    let description: String = draft.description.chars().take(40_000).collect();

    let mut product = json!({
        "title": title,
        "description": description,
        "imageUrls": draft.image_urls,
    });

    // Brand requires an MPN; "Does Not Apply" is eBay's explicit opt-out
    let brand = draft.brand.map(str::to_string).or_else(|| {
        draft
            .aspects
            .and_then(|a| a.get("Brand"))
            .and_then(|v| v.first())
            .filter(|v| !v.is_empty())
            .cloned()
    });

    if let Some(brand) = &brand {
        product["brand"] = json!(brand);
        product["mpn"] = json!(draft.mpn.unwrap_or("Does Not Apply"));
    } else if let Some(mpn) = draft.mpn {
        product["mpn"] = json!(mpn);
    }

    if let Some(aspects) = draft.aspects {
        let mut validated = serde_json::Map::new();
        for (key, values) in aspects {
            // Brand already lives on the product itself
            if key == "Brand" && brand.is_some() {
                continue;
            }
            let values: Vec<&String> = values.iter().filter(|v| !v.is_empty()).collect();
            if !values.is_empty() {
                validated.insert(key.clone(), json!(values));
            }
        }
        if !validated.is_empty() {
            product["aspects"] = Value::Object(validated);
        }
    }

    Ok(json!({
        "sku": draft.sku,
        "condition": draft.condition,
        "product": product,
        "availability": {
            "shipToLocationAvailability": {"quantity": draft.quantity}
        },
    }))
}

pub fn build_offer_payload(
    sku: &str,
    price_value: f64,
    category_id: &str,
    config: &Config,
) -> Result<Value> {
    if category_id.is_empty() {
        return Err(ListerError::Config(
            "category_id is required (fallback_category_id not set)".into(),
        ));
    }

    for (name, value) in [
        ("payment_policy_id", &config.payment_policy_id),
        ("return_policy_id", &config.return_policy_id),
        ("fulfillment_policy_id", &config.fulfillment_policy_id),
    ] {
        if value.is_empty() {
            return Err(ListerError::Config(format!(
                "missing required policy setting: {}",
                name
            )));
        }
    }

    if config.merchant_location_key.is_empty() {
        return Err(ListerError::Config(
            "missing merchant_location_key".into(),
        ));
    }

    Ok(json!({
        "sku": sku,
        "marketplaceId": config.marketplace_id,
        "format": "FIXED_PRICE",
        "availableQuantity": 1,
        "categoryId": category_id,
        "pricingSummary": {
            "price": {"value": format!("{:.2}", price_value), "currency": "GBP"}
        },
        "listingPolicies": {
            "paymentPolicyId": config.payment_policy_id,
            "returnPolicyId": config.return_policy_id,
            "fulfillmentPolicyId": config.fulfillment_policy_id,
        },
        "merchantLocationKey": config.merchant_location_key,
    }))
}

/// PUT the inventory item. 200/201/204 all count as success.
pub async fn create_or_replace_inventory_item(
    client: &reqwest::Client,
    token: &str,
    marketplace_id: &str,
    sku: &str,
    payload: &Value,
) -> Result<Value> {
    let url = format!("{}/inventory_item/{}", INV_BASE, sku);

    let response = client
        .put(&url)
        .bearer_auth(token)
        .header("Content-Language", content_language(marketplace_id))
        .json(payload)
        .send()
        .await?;

    let status = response.status();
    let text = response.text().await?;

    if !matches!(status.as_u16(), 200 | 201 | 204) {
        return Err(ListerError::Ebay(format!(
            "inventory item upsert failed {}: {}",
            status, text
        )));
    }

    if text.is_empty() {
        Ok(json!({"status": status.as_u16()}))
    } else {
        Ok(serde_json::from_str(&text)?)
    }
}

/// POST a new offer for a SKU. Returns the offer response JSON.
pub async fn create_offer(
    client: &reqwest::Client,
    token: &str,
    marketplace_id: &str,
    payload: &Value,
) -> Result<Value> {
    let url = format!("{}/offer", INV_BASE);

    let response = client
        .post(&url)
        .bearer_auth(token)
        .header("Content-Language", content_language(marketplace_id))
        .json(payload)
        .send()
        .await?;

    let status = response.status();
    let text = response.text().await?;

    if !matches!(status.as_u16(), 200 | 201) {
        return Err(ListerError::Ebay(format!(
            "create offer failed {}: {}",
            status, text
        )));
    }

    Ok(serde_json::from_str(&text)?)
}

/// Publishes a draft offer, making the listing live.
pub async fn publish_offer(
    client: &reqwest::Client,
    token: &str,
    marketplace_id: &str,
    offer_id: &str,
) -> Result<Value> {
    let url = format!("{}/offer/{}/publish", INV_BASE, offer_id);

    let response = client
        .post(&url)
        .bearer_auth(token)
        .header("Content-Language", content_language(marketplace_id))
        .send()
        .await?;

    let status = response.status();
    let text = response.text().await?;

    if !matches!(status.as_u16(), 200 | 201) {
        return Err(ListerError::Ebay(format!(
            "publish offer failed {}: {}",
            status, text
        )));
    }

    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls() -> Vec<String> {
        vec!["https://i.ebayimg.com/00/a.jpg".to_string()]
    }

    fn config_with_policies() -> Config {
        let mut config = Config::default();
        config.payment_policy_id = "PAY-1".into();
        config.return_policy_id = "RET-1".into();
        config.fulfillment_policy_id = "FUL-1".into();
        config.merchant_location_key = "loc1".into();
        config
    }

    #[test]
    fn test_content_language_map() {
        assert_eq!(content_language("EBAY_GB"), "en-GB");
        assert_eq!(content_language("EBAY_DE"), "de-DE");
        assert_eq!(content_language("EBAY_XX"), "en-GB");
    }

    #[test]
    fn test_inventory_payload_requires_images() {
        let draft = InventoryItemDraft {
            sku: "SKU-1",
            title: "Mug",
            description: "A mug",
            quantity: 1,
            image_urls: &[],
            condition: "USED_GOOD",
            ..Default::default()
        };
        let result = build_inventory_item_payload(&draft);
        assert!(matches!(result, Err(ListerError::InvalidListing(_))));
    }

    #[test]
    fn test_inventory_payload_brand_implies_mpn() {
        let image_urls = urls();
        let draft = InventoryItemDraft {
            sku: "SKU-1",
            title: "Trainers",
            description: "Trainers",
            quantity: 1,
            image_urls: &image_urls,
            condition: "USED_GOOD",
            brand: Some("Nike"),
            ..Default::default()
        };
        let payload = build_inventory_item_payload(&draft).unwrap();
        assert_eq!(payload["product"]["brand"], "Nike");
        assert_eq!(payload["product"]["mpn"], "Does Not Apply");
    }

    #[test]
    fn test_inventory_payload_brand_from_aspects() {
        let image_urls = urls();
        let mut aspects = BTreeMap::new();
        aspects.insert("Brand".to_string(), vec!["Adidas".to_string()]);
        aspects.insert("Colour".to_string(), vec!["Black".to_string()]);

        let draft = InventoryItemDraft {
            sku: "SKU-1",
            title: "Trainers",
            description: "Trainers",
            quantity: 1,
            image_urls: &image_urls,
            condition: "USED_GOOD",
            aspects: Some(&aspects),
            ..Default::default()
        };
        let payload = build_inventory_item_payload(&draft).unwrap();

        assert_eq!(payload["product"]["brand"], "Adidas");
        assert_eq!(payload["product"]["mpn"], "Does Not Apply");
        // Brand moved onto the product, not duplicated in aspects
        assert!(payload["product"]["aspects"].get("Brand").is_none());
        assert_eq!(payload["product"]["aspects"]["Colour"][0], "Black");
    }

    #[test]
    fn test_inventory_payload_clamps_title() {
        let image_urls = urls();
        let long_title = "x".repeat(100);
        let draft = InventoryItemDraft {
            sku: "SKU-1",
            title: &long_title,
            description: "desc",
            quantity: 1,
            image_urls: &image_urls,
            condition: "USED_GOOD",
            ..Default::default()
        };
        let payload = build_inventory_item_payload(&draft).unwrap();
        assert_eq!(payload["product"]["title"].as_str().unwrap().len(), 80);
    }

    #[test]
    fn test_offer_payload_complete() {
        let config = config_with_policies();
        let payload = build_offer_payload("SKU-1", 19.5, "15687", &config).unwrap();

        assert_eq!(payload["categoryId"], "15687");
        assert_eq!(payload["format"], "FIXED_PRICE");
        assert_eq!(payload["pricingSummary"]["price"]["value"], "19.50");
        assert_eq!(payload["pricingSummary"]["price"]["currency"], "GBP");
        assert_eq!(payload["listingPolicies"]["paymentPolicyId"], "PAY-1");
        assert_eq!(payload["merchantLocationKey"], "loc1");
    }

    #[test]
    fn test_offer_payload_missing_policy_is_config_error() {
        let mut config = config_with_policies();
        config.return_policy_id.clear();

        let result = build_offer_payload("SKU-1", 19.5, "15687", &config);
        assert!(matches!(result, Err(ListerError::Config(_))));
    }

    #[test]
    fn test_offer_payload_empty_category_is_config_error() {
        let config = config_with_policies();
        let result = build_offer_payload("SKU-1", 19.5, "", &config);
        assert!(matches!(result, Err(ListerError::Config(_))));
    }

    #[test]
    fn test_offer_payload_missing_location_is_config_error() {
        let mut config = config_with_policies();
        config.merchant_location_key.clear();

        let result = build_offer_payload("SKU-1", 19.5, "15687", &config);
        assert!(matches!(result, Err(ListerError::Config(_))));
    }
}
