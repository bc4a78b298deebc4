use clap::Parser;
use ebay_lister::category::{AttributeBundle, CategoryMatcher, CategoryTable};
use ebay_lister::cli::{Cli, Commands};
use ebay_lister::ebay::{auth::EbayAuth, inventory};
use ebay_lister::error::Result;
use ebay_lister::{pipeline, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::List {
            image,
            category_id,
            price,
            title,
            sku,
        } => {
            println!("\u{1F4E6} ebay-lister - draft listing\n");

            let table = CategoryTable::from_file(&config.categories_path)?;
            let opts = pipeline::ListOptions {
                category_id,
                price,
                title,
                sku,
            };

            let draft =
                pipeline::create_draft_listing(&config, &table, &image, opts, cli.verbose).await?;

            println!("\u{2705} Draft listing created");
            println!("  SKU:      {}", draft.sku);
            println!("  Offer:    {}", draft.offer_id);
            println!("  Title:    {}", draft.title);
            println!("  Price:    \u{00A3}{:.2}", draft.price);
            println!("  Category: {}", draft.category_id);
            println!("  Image:    {}", draft.image_url);
            if config.force_drafts {
                println!("\nThis is a DRAFT listing. It will not be published automatically.");
            }
        }

        Commands::Analyze { image, hint } => {
            println!("\u{1F50D} ebay-lister - analyze\n");

            let table = CategoryTable::from_file(&config.categories_path)?;
            let (analysis, matched) = pipeline::analyze_image_file(
                &config,
                &table,
                &image,
                hint.as_deref(),
                cli.verbose,
            )
            .await?;

            let output = serde_json::json!({
                "analysis": analysis,
                "suggested_category": matched,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Commands::Suggest {
            item_type,
            keywords,
            aspects,
        } => {
            let table = CategoryTable::from_file(&config.categories_path)?;
            let matcher = CategoryMatcher::new(
                &table,
                &config.fallback_category_id,
                config.matcher.clone(),
            )?;

            let mut bundle = AttributeBundle::new();
            if let Some(item_type) = &item_type {
                bundle.insert("Type", item_type);
            }
            if let Some(keywords) = &keywords {
                bundle.insert("Keywords", keywords);
            }
            for aspect in &aspects {
                match aspect.split_once('=') {
                    Some((name, value)) => bundle.insert(name, value),
                    None => bundle.insert("Keywords", aspect),
                }
            }

            let result = matcher.resolve(&bundle);
            println!("Best match: {} (confidence {:.1})", result.category_id, result.confidence);
            for entry in &result.ranking {
                let marker = if entry.id == result.category_id { ">" } else { " " };
                println!("  {} {:<10} {:<40} {:.1}", marker, entry.id, entry.name, entry.score);
            }
            if result.confidence == 0.0 {
                println!("  (no confident match - fallback category used)");
            }
        }

        Commands::Publish { offer_id } => {
            if config.force_drafts {
                println!(
                    "\u{26A0} force_drafts is enabled; refusing to publish offer {}.",
                    offer_id
                );
                println!("  Disable it in the config file or set FORCE_DRAFTS=false.");
                return Ok(());
            }

            println!("\u{1F680} ebay-lister - publish\n");
            let client = reqwest::Client::new();
            let mut auth = EbayAuth::new(client.clone());
            let token = auth.token().await?;

            let result =
                inventory::publish_offer(&client, &token, &config.marketplace_id, &offer_id)
                    .await?;

            println!("\u{2705} Offer published");
            if let Some(listing_id) = result["listingId"].as_str() {
                println!("  Listing: {}", listing_id);
            }
        }

        Commands::Config { set_openai_key, show } => {
            let mut config = config;

            if let Some(key) = set_openai_key {
                config.set_openai_key(key)?;
                println!("\u{2714} OpenAI API key saved");
            }

            if show {
                println!("Settings:");
                println!("  Model:             {}", config.openai_model);
                println!("  Marketplace:       {}", config.marketplace_id);
                println!("  Categories:        {}", config.categories_path.display());
                println!("  Fallback category: {}", display_or(&config.fallback_category_id));
                println!("  Payment policy:    {}", display_or(&config.payment_policy_id));
                println!("  Return policy:     {}", display_or(&config.return_policy_id));
                println!("  Fulfillment:       {}", display_or(&config.fulfillment_policy_id));
                println!("  Location key:      {}", display_or(&config.merchant_location_key));
                println!("  Force drafts:      {}", config.force_drafts);
                println!(
                    "  OpenAI key:        {}",
                    if config.openai_api_key.is_some() { "set" } else { "not set" }
                );
            }
        }
    }

    Ok(())
}

fn display_or(value: &str) -> &str {
    if value.is_empty() {
        "(not set)"
    } else {
        value
    }
}
