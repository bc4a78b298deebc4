//! AI image analysis
//!
//! Sends the product image to an OpenAI vision model and normalizes the
//! reply into a [`ListingAnalysis`]. The model is asked for strict JSON
//! but replies are treated as chatty: the JSON object is extracted from
//! whatever came back before parsing.

pub mod prompts;
pub mod types;

pub use types::ListingAnalysis;

use crate::error::{ListerError, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Deserialize;
use serde_json::json;
use std::collections::BTreeMap;

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

const VALID_CONDITIONS: &[&str] = &[
    "NEW",
    "NEW_WITH_TAGS",
    "NEW_WITHOUT_TAGS",
    "NEW_WITH_DEFECTS",
    "USED_EXCELLENT",
    "USED_GOOD",
    "USED_ACCEPTABLE",
    "FOR_PARTS_OR_NOT_WORKING",
    "REFURBISHED",
];

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Untrusted model output before normalization.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawAnalysis {
    title: String,
    description: String,
    price: serde_json::Value,
    condition: String,
    aspects: serde_json::Value,
    category_keywords: String,
}

/// Analyzes one processed JPEG and returns normalized listing data.
pub async fn analyze_image(
    client: &reqwest::Client,
    api_key: &str,
    model: &str,
    image_bytes: &[u8],
    category_hint: Option<&str>,
    verbose: bool,
) -> Result<ListingAnalysis> {
    let data_uri = format!("data:image/jpeg;base64,{}", BASE64.encode(image_bytes));

    let body = json!({
        "model": model,
        "temperature": 0.3,
        "max_tokens": 1500,
        "messages": [
            {"role": "system", "content": prompts::SYSTEM_PROMPT},
            {"role": "user", "content": [
                {"type": "text", "text": prompts::build_user_prompt(category_hint)},
                {"type": "image_url", "image_url": {"url": data_uri}},
            ]},
        ],
    });

    let response = client
        .post(OPENAI_API_URL)
        .bearer_auth(api_key)
        .json(&body)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        return Err(ListerError::AiAnalysis(format!(
            "OpenAI API returned {}: {}",
            status, text
        )));
    }

    let parsed: ChatResponse = response.json().await?;
    let content = parsed
        .choices
        .first()
        .and_then(|c| c.message.content.as_deref())
        .unwrap_or_default();

    if verbose {
        println!("  [analyze] response length: {} chars", content.len());
    }

    let json_str = extract_json_object(content)?;
    let raw: RawAnalysis = serde_json::from_str(json_str)
        .map_err(|e| ListerError::AiAnalysis(format!("invalid JSON from model: {}", e)))?;

    Ok(normalize(raw))
}

/// Extracts the JSON object from a model reply.
///
/// Priority: a ```json fenced block, then the outermost `{...}` span.
pub fn extract_json_object(response: &str) -> Result<&str> {
    if let Some(start_marker) = response.find("```json") {
        let start = start_marker + 7;
        if let Some(end_offset) = response[start..].find("```") {
            return Ok(response[start..start + end_offset].trim());
        }
    }

    if let Some(start) = response.find('{') {
        if let Some(end) = response.rfind('}') {
            if end > start {
                return Ok(&response[start..=end]);
            }
        }
    }

    Err(ListerError::AiAnalysis(
        "model reply contains no JSON object".into(),
    ))
}

/// Clamps and validates everything the model returned.
fn normalize(raw: RawAnalysis) -> ListingAnalysis {
    let mut title: String = raw.title.trim().chars().take(80).collect();
    if title.is_empty() {
        title = "Untitled Item".to_string();
    }

    let mut description = raw.description.trim().to_string();
    if description.is_empty() {
        description =
            "<p>Item in good condition. Please see photos for details.</p>".to_string();
    }

    let price = normalize_price(&raw.price);
    let condition = normalize_condition(&raw.condition);
    let aspects = normalize_aspects(&raw.aspects);
    let category_keywords = raw.category_keywords.trim().to_string();

    ListingAnalysis {
        title,
        description,
        price,
        condition,
        aspects,
        category_keywords,
    }
}

fn normalize_price(value: &serde_json::Value) -> f64 {
    let price = match value {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(9.99),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or(9.99),
        _ => 9.99,
    };
    // "NaN" and "inf" parse successfully but clamp() passes NaN through
    let price = if price.is_finite() { price } else { 9.99 };
    let clamped = price.clamp(0.99, 999_999.99);
    (clamped * 100.0).round() / 100.0
}

fn normalize_condition(condition: &str) -> String {
    let condition = condition.trim().to_uppercase();

    if VALID_CONDITIONS.contains(&condition.as_str()) {
        return condition;
    }

    // Common variations the model produces anyway
    if condition.contains("NEW") {
        "NEW".to_string()
    } else if condition.contains("EXCELLENT") || condition.contains("LIKE NEW") {
        "USED_EXCELLENT".to_string()
    } else {
        "USED_GOOD".to_string()
    }
}

fn normalize_aspects(value: &serde_json::Value) -> BTreeMap<String, Vec<String>> {
    let mut normalized = BTreeMap::new();

    let Some(map) = value.as_object() else {
        return normalized;
    };

    for (key, raw_values) in map {
        let key = key.trim();
        if key.is_empty() {
            continue;
        }

        let values: Vec<String> = match raw_values {
            serde_json::Value::Array(items) => items
                .iter()
                .filter_map(value_to_string)
                .collect(),
            other => value_to_string(other).into_iter().collect(),
        };

        if !values.is_empty() {
            normalized.insert(key.to_string(), values);
        }
    }

    normalized
}

fn value_to_string(value: &serde_json::Value) -> Option<String> {
    let s = match value {
        serde_json::Value::String(s) => s.trim().to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}
