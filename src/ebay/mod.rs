//! eBay API integration
//!
//! - auth: OAuth token cache + refresh-on-expiry
//! - pictures: Trading API image hosting (EPS)
//! - inventory: Sell Inventory API (inventory items, offers)

pub mod auth;
pub mod inventory;
pub mod pictures;

pub use auth::EbayAuth;
