//! ebay-lister: AI image analysis and eBay draft listing tool
//!
//! One product image in, one draft listing out: the image is analyzed by
//! a vision model, matched against a static category table, hosted on
//! eBay's picture service, and turned into an inventory item plus offer.

pub mod analyzer;
pub mod category;
pub mod cli;
pub mod config;
pub mod ebay;
pub mod error;
pub mod image;
pub mod pipeline;

pub use config::Config;
pub use error::{ListerError, Result};
