//! Draft listing pipeline
//!
//! Pure sequencing: process image -> AI analysis -> category resolution
//! -> EPS upload -> inventory item -> offer. Category resolution can
//! never abort the pipeline; it always yields some valid leaf category.

use crate::analyzer::{self, ListingAnalysis};
use crate::category::{rules, CategoryMatcher, CategoryTable, MatchResult};
use crate::config::Config;
use crate::ebay::{auth::EbayAuth, inventory, pictures};
use crate::error::{ListerError, Result};
use crate::image;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Operator overrides for a single listing run.
#[derive(Debug, Default)]
pub struct ListOptions {
    pub category_id: Option<String>,
    pub price: Option<f64>,
    pub title: Option<String>,
    pub sku: Option<String>,
}

/// Summary of a created draft listing.
#[derive(Debug, Serialize)]
pub struct DraftListing {
    pub sku: String,
    pub offer_id: String,
    pub title: String,
    pub price: f64,
    pub category_id: String,
    pub condition: String,
    pub image_url: String,
}

/// `SKU-<unix-secs>-<hash suffix>`, unique enough for one seller.
pub fn generate_sku() -> String {
    let now = chrono::Utc::now();
    let digest = Sha256::digest(format!("{}:{}", now.timestamp(), now.timestamp_subsec_nanos()));
    format!("SKU-{}-{}", now.timestamp(), &hex::encode(digest)[..4])
}

/// Runs AI analysis plus category suggestion without touching eBay.
pub async fn analyze_image_file(
    config: &Config,
    table: &CategoryTable,
    image_path: &Path,
    category_hint: Option<&str>,
    verbose: bool,
) -> Result<(ListingAnalysis, MatchResult)> {
    let matcher = CategoryMatcher::new(
        table,
        &config.fallback_category_id,
        config.matcher.clone(),
    )?;

    let raw_bytes = image::load_image_file(image_path)?;
    let processed = image::process_image(&raw_bytes, config.max_image_size, config.jpeg_quality)?;

    let client = reqwest::Client::new();
    let api_key = config.get_openai_key()?;
    let analysis = analyzer::analyze_image(
        &client,
        &api_key,
        &config.openai_model,
        &processed,
        category_hint,
        verbose,
    )
    .await?;

    let matched = matcher.resolve(&analysis.attribute_bundle());
    Ok((analysis, matched))
}

/// Full pipeline: one image file in, one eBay draft listing out.
pub async fn create_draft_listing(
    config: &Config,
    table: &CategoryTable,
    image_path: &Path,
    opts: ListOptions,
    verbose: bool,
) -> Result<DraftListing> {
    let client = reqwest::Client::new();
    let mut auth = EbayAuth::new(client.clone());

    // 1. Validate and bound the image
    println!("[1/5] Processing image...");
    let raw_bytes = image::load_image_file(image_path)?;
    let processed = image::process_image(&raw_bytes, config.max_image_size, config.jpeg_quality)?;
    println!("\u{2714} Image ready ({} bytes)\n", processed.len());

    // 2. AI analysis
    println!("[2/5] Analyzing image with AI...");
    let api_key = config.get_openai_key()?;
    let analysis = analyzer::analyze_image(
        &client,
        &api_key,
        &config.openai_model,
        &processed,
        None,
        verbose,
    )
    .await?;
    println!("\u{2714} Analysis complete: {}\n", truncate(&analysis.title, 50));

    // 3. Category resolution; an explicit override wins
    println!("[3/5] Resolving category...");
    let category_id = match &opts.category_id {
        Some(id) => {
            println!("\u{2714} Using override category: {}\n", id);
            id.clone()
        }
        None => {
            let matcher = CategoryMatcher::new(
                table,
                &config.fallback_category_id,
                config.matcher.clone(),
            )?;
            let matched = matcher.resolve(&analysis.attribute_bundle());
            if verbose {
                for entry in &matched.ranking {
                    println!("  {} {} (score {:.1})", entry.id, entry.name, entry.score);
                }
            }
            println!(
                "\u{2714} Category {} (confidence {:.1})\n",
                matched.category_id, matched.confidence
            );
            matched.category_id
        }
    };

    // Item-family rules: condition vocabulary and required aspects
    let item_type = analysis.item_type().to_string();
    let condition = rules::normalize_condition_for_type(&analysis.condition, &item_type);
    let mut aspects = analysis.aspects.clone();
    rules::apply_required_aspects(&mut aspects, &item_type);

    let title = opts.title.clone().unwrap_or_else(|| analysis.title.clone());
    let price = opts.price.unwrap_or(analysis.price);
    let sku = opts.sku.clone().unwrap_or_else(generate_sku);

    // 4. Host the image on eBay's picture service
    println!("[4/5] Uploading image to eBay Picture Service...");
    let token = auth.token().await?;
    let image_url = pictures::upload_image(
        &client,
        &token,
        &processed,
        &format!("{}.jpg", sku),
        verbose,
    )
    .await?;
    println!("\u{2714} Image hosted: {}\n", image_url);

    // 5. Inventory item, then offer
    println!("[5/5] Creating draft listing {}...", sku);
    let image_urls = vec![image_url.clone()];
    let item_payload = inventory::build_inventory_item_payload(&inventory::InventoryItemDraft {
        sku: &sku,
        title: &title,
        description: &analysis.description,
        quantity: 1,
        image_urls: &image_urls,
        condition,
        brand: None,
        mpn: None,
        aspects: Some(&aspects),
    })?;
    inventory::create_or_replace_inventory_item(
        &client,
        &token,
        &config.marketplace_id,
        &sku,
        &item_payload,
    )
    .await?;

    let offer_payload = inventory::build_offer_payload(&sku, price, &category_id, config)?;
    let offer_response =
        inventory::create_offer(&client, &token, &config.marketplace_id, &offer_payload).await?;

    let offer_id = offer_response["offerId"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| ListerError::Ebay("offer response has no offerId".into()))?;

    Ok(DraftListing {
        sku,
        offer_id,
        title,
        price,
        category_id,
        condition: condition.to_string(),
        image_url,
    })
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}
