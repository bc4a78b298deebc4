//! Static category table loader
//!
//! Loads the eBay category table from JSON once at startup. The table is
//! read-only after load; the matcher receives it as an explicit handle.

use crate::error::{ListerError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// One taxonomy node. Only leaf categories are valid listing targets.
#[derive(Debug, Clone)]
pub struct Category {
    pub id: String,
    pub name: String,
    /// Ordered ancestor chain, ending with the display name itself.
    pub path: Vec<String>,
    pub leaf: bool,
}

impl Category {
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    pub fn full_path(&self) -> String {
        self.path.join(" > ")
    }
}

/// Raw JSON record. Both the Taxonomy API export shape (`CategoryID`,
/// `CategoryName`, `LeafCategory`) and the short form (`id`, `name`,
/// `leaf`) are accepted.
#[derive(Debug, Deserialize)]
struct RawCategory {
    #[serde(alias = "CategoryID", alias = "categoryId")]
    id: Option<serde_json::Value>,
    #[serde(alias = "CategoryName", alias = "categoryName")]
    name: Option<String>,
    #[serde(alias = "LeafCategory", default)]
    leaf: bool,
    #[serde(alias = "categoryPath", default)]
    path: Vec<String>,
}

/// Read-only category table keyed by category id.
#[derive(Debug, Clone, Default)]
pub struct CategoryTable {
    categories: Vec<Category>,
    by_id: HashMap<String, usize>,
}

impl CategoryTable {
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ListerError::FileNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Accepts both `{"categories": [...]}` and a bare `[...]`.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(content)
            .map_err(|e| ListerError::Config(format!("invalid category table JSON: {}", e)))?;

        let records = match &value {
            serde_json::Value::Object(map) => map
                .get("categories")
                .and_then(|v| v.as_array())
                .ok_or_else(|| {
                    ListerError::Config("category table object has no `categories` array".into())
                })?,
            serde_json::Value::Array(arr) => arr,
            _ => {
                return Err(ListerError::Config(
                    "category table must be a JSON array or object".into(),
                ))
            }
        };

        let mut categories = Vec::new();
        let mut by_id = HashMap::new();

        for record in records {
            let raw: RawCategory = match serde_json::from_value(record.clone()) {
                Ok(raw) => raw,
                Err(_) => continue,
            };

            let id = raw.id.map(stringify_id).unwrap_or_default();
            let name = raw.name.unwrap_or_default().trim().to_string();

            // Rows without an id or name are skipped, not fatal
            if id.is_empty() || name.is_empty() {
                continue;
            }

            if by_id.contains_key(&id) {
                return Err(ListerError::Config(format!(
                    "duplicate category id in table: {}",
                    id
                )));
            }

            let path = if raw.path.is_empty() {
                vec![name.clone()]
            } else {
                raw.path
            };

            by_id.insert(id.clone(), categories.len());
            categories.push(Category {
                id,
                name,
                path,
                leaf: raw.leaf,
            });
        }

        Ok(Self { categories, by_id })
    }

    pub fn get(&self, id: &str) -> Option<&Category> {
        self.by_id.get(id).map(|&i| &self.categories[i])
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Leaf categories in table order.
    pub fn leaves(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter().filter(|c| c.leaf)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

fn stringify_id(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.trim().to_string(),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_u64() {
                i.to_string()
            } else if let Some(i) = n.as_i64() {
                i.to_string()
            } else {
                // Integral floats ("93427.0") must match their "93427"
                // form; anything fractional is not a category id
                match n.as_f64() {
                    Some(f) if f.is_finite() && f.fract() == 0.0 => format!("{:.0}", f),
                    _ => String::new(),
                }
            }
        }
        _ => String::new(),
    }
}
