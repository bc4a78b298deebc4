//! eBay OAuth token handling
//!
//! Caches an access token and refreshes it via the refresh-token grant
//! when it nears expiry. An `EBAY_ACCESS_TOKEN` from the environment can
//! bootstrap the cache once, on a short leash, after which the refresh
//! flow takes over.

use crate::error::{ListerError, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Deserialize;

const TOKEN_URL: &str = "https://api.ebay.com/identity/v1/oauth2/token";
const INVENTORY_SCOPE: &str = "https://api.ebay.com/oauth/api_scope/sell.inventory";

/// Refresh this long before the reported expiry.
const EXPIRY_BUFFER_SECS: i64 = 120;
/// Lifetime granted to a token bootstrapped from the environment.
const ENV_TOKEN_LEASH_SECS: i64 = 300;

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: i64,
}

impl CachedToken {
    fn is_valid(&self, now: i64) -> bool {
        now < self.expires_at
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    7200
}

/// Token cache plus refresh flow. One per process is enough; the CLI is
/// single-threaded so no locking is needed.
pub struct EbayAuth {
    client: reqwest::Client,
    cached: Option<CachedToken>,
    env_bootstrapped: bool,
}

impl EbayAuth {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            cached: None,
            env_bootstrapped: false,
        }
    }

    /// Returns a valid access token, refreshing if needed.
    pub async fn token(&mut self) -> Result<String> {
        let now = chrono::Utc::now().timestamp();

        if let Some(cached) = &self.cached {
            if cached.is_valid(now) {
                return Ok(cached.access_token.clone());
            }
        }

        // Allow bootstrapping from the environment once, then prefer the
        // refresh flow
        if !self.env_bootstrapped {
            self.env_bootstrapped = true;
            if let Ok(token) = std::env::var("EBAY_ACCESS_TOKEN") {
                if !token.trim().is_empty() {
                    self.cached = Some(CachedToken {
                        access_token: token.clone(),
                        expires_at: now + ENV_TOKEN_LEASH_SECS,
                    });
                    return Ok(token);
                }
            }
        }

        self.refresh(now).await
    }

    async fn refresh(&mut self, now: i64) -> Result<String> {
        let client_id = env_credential("EBAY_CLIENT_ID")?;
        let client_secret = env_credential("EBAY_CLIENT_SECRET")?;
        let refresh_token = env_credential("EBAY_REFRESH_TOKEN")?;

        let basic = BASE64.encode(format!("{}:{}", client_id, client_secret));

        let response = self
            .client
            .post(TOKEN_URL)
            .header("Authorization", format!("Basic {}", basic))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token.as_str()),
                ("scope", INVENTORY_SCOPE),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ListerError::Ebay(format!(
                "token refresh failed {}: {}",
                status, text
            )));
        }

        let payload: TokenResponse = response.json().await?;

        self.cached = Some(CachedToken {
            access_token: payload.access_token.clone(),
            expires_at: now + payload.expires_in - EXPIRY_BUFFER_SECS,
        });

        Ok(payload.access_token)
    }
}

fn env_credential(var: &str) -> Result<String> {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ListerError::MissingCredentials),
    }
}
