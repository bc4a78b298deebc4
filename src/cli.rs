use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ebay-lister")]
#[command(about = "AI image analysis and eBay draft listing tool", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze an image and create an eBay draft listing
    List {
        /// Product image file
        #[arg(required = true)]
        image: PathBuf,

        /// Category id override (skips the matcher)
        #[arg(short, long)]
        category_id: Option<String>,

        /// Price override in GBP
        #[arg(short, long)]
        price: Option<f64>,

        /// Title override
        #[arg(short, long)]
        title: Option<String>,

        /// SKU override (generated when omitted)
        #[arg(long)]
        sku: Option<String>,
    },

    /// Analyze an image with AI, print the result without listing
    Analyze {
        /// Product image file
        #[arg(required = true)]
        image: PathBuf,

        /// Category hint passed to the model
        #[arg(long)]
        hint: Option<String>,
    },

    /// Run the category matcher against ad-hoc attributes
    Suggest {
        /// Item type (primary weight)
        #[arg(short = 't', long)]
        item_type: Option<String>,

        /// Free-text category keywords (primary weight)
        #[arg(short, long)]
        keywords: Option<String>,

        /// Extra aspects as NAME=VALUE (secondary weight)
        #[arg(short, long = "aspect", value_name = "NAME=VALUE")]
        aspects: Vec<String>,
    },

    /// Publish a draft offer (refused while force_drafts is set)
    Publish {
        /// Offer id returned by `list`
        #[arg(required = true)]
        offer_id: String,
    },

    /// Show or edit configuration
    Config {
        /// Set the OpenAI API key
        #[arg(long)]
        set_openai_key: Option<String>,

        /// Show current settings
        #[arg(long)]
        show: bool,
    },
}
