use crate::category::MatcherConfig;
use crate::error::{ListerError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Persisted tool configuration.
///
/// Stored as JSON under `~/.config/ebay-lister/config.json`. Environment
/// variables take priority over the file so the tool can run unconfigured
/// in CI or behind dotenv-style wrappers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub openai_model: String,

    pub marketplace_id: String,
    pub payment_policy_id: String,
    pub return_policy_id: String,
    pub fulfillment_policy_id: String,
    pub merchant_location_key: String,

    /// Leaf category used when the matcher finds no confident match.
    pub fallback_category_id: String,
    /// Path to the static category table JSON.
    pub categories_path: PathBuf,

    /// When true, `publish` is refused and offers stay drafts.
    pub force_drafts: bool,

    pub max_image_size: u32,
    pub jpeg_quality: u8,

    pub matcher: MatcherConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_model: "gpt-4o-mini".into(),
            marketplace_id: "EBAY_GB".into(),
            payment_policy_id: String::new(),
            return_policy_id: String::new(),
            fulfillment_policy_id: String::new(),
            merchant_location_key: String::new(),
            fallback_category_id: String::new(),
            categories_path: PathBuf::from("categories.json"),
            force_drafts: true,
            max_image_size: 1600,
            jpeg_quality: 90,
            matcher: MatcherConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            serde_json::from_str(&content)?
        } else {
            Self::default()
        };

        config.apply_env();
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| ListerError::Config("home directory not found".into()))?;
        Ok(home.join(".config").join("ebay-lister").join("config.json"))
    }

    /// Environment variables override persisted values.
    fn apply_env(&mut self) {
        env_override(&mut self.openai_model, "OPENAI_MODEL");
        env_override(&mut self.marketplace_id, "EBAY_MARKETPLACE_ID");
        env_override(&mut self.payment_policy_id, "EBAY_PAYMENT_POLICY_ID");
        env_override(&mut self.return_policy_id, "EBAY_RETURN_POLICY_ID");
        env_override(&mut self.fulfillment_policy_id, "EBAY_FULFILLMENT_POLICY_ID");
        env_override(&mut self.merchant_location_key, "EBAY_MERCHANT_LOCATION_KEY");
        env_override(&mut self.fallback_category_id, "DEFAULT_CATEGORY_ID");

        if let Ok(path) = std::env::var("EBAY_CATEGORIES_JSON") {
            if !path.is_empty() {
                self.categories_path = PathBuf::from(path);
            }
        }
        if let Ok(v) = std::env::var("FORCE_DRAFTS") {
            self.force_drafts = v.to_lowercase() != "false";
        }
    }

    pub fn get_openai_key(&self) -> Result<String> {
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            if !key.trim().is_empty() {
                return Ok(key);
            }
        }

        self.openai_api_key.clone().ok_or(ListerError::MissingApiKey)
    }

    pub fn set_openai_key(&mut self, key: String) -> Result<()> {
        self.openai_api_key = Some(key);
        self.save()
    }
}

fn env_override(target: &mut String, var: &str) {
    if let Ok(value) = std::env::var(var) {
        if !value.trim().is_empty() {
            *target = value;
        }
    }
}
