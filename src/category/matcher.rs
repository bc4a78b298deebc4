//! Category matcher
//!
//! Scores every leaf category by weighted token overlap with the
//! attributes extracted from a product image and picks the best match.
//! A sparse or empty attribute bundle is never an error: it degrades to
//! the configured fallback category instead.

use super::table::CategoryTable;
use crate::error::{ListerError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

lazy_static! {
    static ref TOKEN_RE: Regex = Regex::new(r"[a-z0-9]+").expect("token regex");
}

/// Attribute names that are strongly category-discriminative. These get
/// the primary weight; everything else (Brand, Colour, Size, ...) gets
/// the secondary weight.
const PRIMARY_ATTRIBUTES: &[&str] = &[
    "title",
    "keywords",
    "type",
    "garment type",
    "product type",
    "department",
    "style",
    "category",
];

/// Whole-token and substring match points, from the original heuristic.
const WHOLE_TOKEN_POINTS: f64 = 3.0;
const SUBSTRING_POINTS: f64 = 1.0;

/// Runner-up entries kept in the diagnostic ranking.
const TOP_K: usize = 5;

/// Scoring policy. These are policy values, not derived from data, so
/// they live in configuration where tests can probe boundaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Weight for item-type/keyword attributes.
    pub primary_weight: f64,
    /// Weight for secondary descriptors (brand, colour, size, ...).
    pub secondary_weight: f64,
    /// The top score must strictly exceed this or the fallback wins.
    pub min_score: f64,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            primary_weight: 3.0,
            secondary_weight: 1.0,
            min_score: 0.0,
        }
    }
}

/// Free-text attributes extracted from a product image.
///
/// Backed by a `BTreeMap` so iteration order, and therefore scoring, is
/// deterministic.
#[derive(Debug, Clone, Default)]
pub struct AttributeBundle {
    attributes: BTreeMap<String, Vec<String>>,
}

impl AttributeBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value under an attribute name. Blank values are dropped.
    pub fn insert(&mut self, name: &str, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            return;
        }
        self.attributes
            .entry(name.trim().to_string())
            .or_default()
            .push(value.to_string());
    }

    pub fn insert_all(&mut self, name: &str, values: &[String]) {
        for value in values {
            self.insert(name, value);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.attributes.iter()
    }
}

/// A scored candidate in the diagnostic ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCategory {
    pub id: String,
    pub name: String,
    pub score: f64,
}

/// Outcome of one resolution. `category_id` always references a leaf
/// category (the fallback is validated at matcher construction).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub category_id: String,
    pub confidence: f64,
    /// Ranked runner-ups, for diagnostics only.
    pub ranking: Vec<RankedCategory>,
}

struct Candidate<'a> {
    id: &'a str,
    name: &'a str,
    depth: usize,
    tokens: Vec<String>,
}

/// Stateless matcher over a read-only category table.
pub struct CategoryMatcher<'a> {
    candidates: Vec<Candidate<'a>>,
    fallback_id: &'a str,
    config: MatcherConfig,
}

impl<'a> CategoryMatcher<'a> {
    /// Validates the table and fallback up front. A missing or non-leaf
    /// fallback is a configuration error surfaced here, never deferred
    /// to first use.
    pub fn new(
        table: &'a CategoryTable,
        fallback_id: &'a str,
        config: MatcherConfig,
    ) -> Result<Self> {
        if table.is_empty() {
            return Err(ListerError::Config("category table is empty".into()));
        }

        match table.get(fallback_id) {
            None => {
                return Err(ListerError::Config(format!(
                    "fallback category {} not found in table",
                    if fallback_id.is_empty() { "(unset)" } else { fallback_id }
                )))
            }
            Some(cat) if !cat.leaf => {
                return Err(ListerError::Config(format!(
                    "fallback category {} is not a leaf category",
                    fallback_id
                )))
            }
            Some(_) => {}
        }

        let candidates = table
            .leaves()
            .map(|cat| Candidate {
                id: cat.id.as_str(),
                name: cat.name.as_str(),
                depth: cat.depth(),
                tokens: tokenize(&cat.path.join(" ")),
            })
            .collect();

        Ok(Self {
            candidates,
            fallback_id,
            config,
        })
    }

    /// Resolves an attribute bundle to a leaf category.
    ///
    /// Pure and deterministic: identical inputs produce an identical
    /// result, including the ranking order for tied scores.
    pub fn resolve(&self, bundle: &AttributeBundle) -> MatchResult {
        let query = self.build_query(bundle);

        if query.is_empty() {
            return self.fallback_result(Vec::new());
        }

        let mut scored: Vec<RankedCategory> = Vec::new();
        let mut order: Vec<(f64, usize, &str)> = Vec::new();

        for candidate in &self.candidates {
            let mut score = 0.0;
            for (token, weight) in &query {
                if candidate.tokens.iter().any(|t| t == token) {
                    score += WHOLE_TOKEN_POINTS * weight;
                } else if candidate.tokens.iter().any(|t| t.contains(token.as_str())) {
                    score += SUBSTRING_POINTS * weight;
                }
            }
            if score > 0.0 {
                order.push((score, candidate.depth, candidate.id));
                scored.push(RankedCategory {
                    id: candidate.id.to_string(),
                    name: candidate.name.to_string(),
                    score,
                });
            }
        }

        // Score descending, then shallower path (a general category is a
        // safer guess than an overly specific one), then id ascending so
        // the ranking is fully reproducible.
        let mut indices: Vec<usize> = (0..order.len()).collect();
        indices.sort_by(|&a, &b| {
            let (sa, da, ia) = order[a];
            let (sb, db, ib) = order[b];
            sb.partial_cmp(&sa)
                .unwrap_or(Ordering::Equal)
                .then(da.cmp(&db))
                .then(ia.cmp(ib))
        });

        let ranking: Vec<RankedCategory> = indices
            .iter()
            .take(TOP_K)
            .map(|&i| scored[i].clone())
            .collect();

        match ranking.first() {
            Some(top) if top.score > self.config.min_score => MatchResult {
                category_id: top.id.clone(),
                confidence: top.score,
                ranking,
            },
            // Conscious fallback branch: a low-confidence guess is worse
            // than the operator-configured default.
            _ => self.fallback_result(ranking),
        }
    }

    /// Flattens the bundle into weighted query tokens.
    fn build_query(&self, bundle: &AttributeBundle) -> Vec<(String, f64)> {
        let mut query = Vec::new();
        for (name, values) in bundle.iter() {
            let weight = if PRIMARY_ATTRIBUTES.contains(&name.to_lowercase().as_str()) {
                self.config.primary_weight
            } else {
                self.config.secondary_weight
            };
            for value in values {
                for token in tokenize(value) {
                    query.push((token, weight));
                }
            }
        }
        query
    }

    fn fallback_result(&self, ranking: Vec<RankedCategory>) -> MatchResult {
        MatchResult {
            category_id: self.fallback_id.to_string(),
            confidence: 0.0,
            ranking,
        }
    }
}

/// Case-fold and split into alphanumeric tokens.
fn tokenize(text: &str) -> Vec<String> {
    TOKEN_RE
        .find_iter(&text.to_lowercase())
        .map(|m| m.as_str().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(json: &str) -> CategoryTable {
        CategoryTable::from_json_str(json).unwrap()
    }

    fn shoe_table() -> CategoryTable {
        table(
            r#"[
            {"id": "93427", "name": "Trainers", "leaf": true, "path": ["Shoes", "Trainers"]},
            {"id": "20693", "name": "Mugs", "leaf": true, "path": ["Home", "Kitchen", "Mugs"]},
            {"id": "261186", "name": "Fiction Books", "leaf": true, "path": ["Books", "Fiction Books"]},
            {"id": "11450", "name": "Other", "leaf": true},
            {"id": "1", "name": "Shoes", "leaf": false}
        ]"#,
        )
    }

    fn bundle(pairs: &[(&str, &str)]) -> AttributeBundle {
        let mut b = AttributeBundle::new();
        for (name, value) in pairs {
            b.insert(name, value);
        }
        b
    }

    #[test]
    fn test_exact_item_type_wins() {
        let t = shoe_table();
        let m = CategoryMatcher::new(&t, "11450", MatcherConfig::default()).unwrap();
        let result = m.resolve(&bundle(&[("Type", "trainers")]));

        assert_eq!(result.category_id, "93427");
        assert!(result.confidence > 0.0);
        // Strictly higher than every runner-up
        for runner_up in &result.ranking[1..] {
            assert!(runner_up.score < result.confidence);
        }
    }

    #[test]
    fn test_result_is_always_a_leaf() {
        let t = shoe_table();
        let m = CategoryMatcher::new(&t, "11450", MatcherConfig::default()).unwrap();

        // "shoes" matches the non-leaf parent's name but only leaves are
        // candidates
        let result = m.resolve(&bundle(&[("Type", "shoes")]));
        assert!(t.get(&result.category_id).unwrap().leaf);
    }

    #[test]
    fn test_empty_bundle_returns_fallback() {
        let t = shoe_table();
        let m = CategoryMatcher::new(&t, "11450", MatcherConfig::default()).unwrap();

        let result = m.resolve(&AttributeBundle::new());
        assert_eq!(result.category_id, "11450");
        assert_eq!(result.confidence, 0.0);
        assert!(result.ranking.is_empty());
    }

    #[test]
    fn test_insert_all_drops_blank_values() {
        let mut b = AttributeBundle::new();
        b.insert_all(
            "Features",
            &["Waterproof".to_string(), "  ".to_string(), String::new()],
        );

        let (_, values) = b.iter().next().unwrap();
        assert_eq!(values, &vec!["Waterproof".to_string()]);
    }

    #[test]
    fn test_blank_values_return_fallback() {
        let t = shoe_table();
        let m = CategoryMatcher::new(&t, "11450", MatcherConfig::default()).unwrap();

        let result = m.resolve(&bundle(&[("Type", "   "), ("Brand", "")]));
        assert_eq!(result.category_id, "11450");
    }

    #[test]
    fn test_no_overlap_returns_fallback() {
        let t = shoe_table();
        let m = CategoryMatcher::new(&t, "11450", MatcherConfig::default()).unwrap();

        let result = m.resolve(&bundle(&[("Type", "zeppelin")]));
        assert_eq!(result.category_id, "11450");
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn test_deterministic_resolution() {
        let t = shoe_table();
        let m = CategoryMatcher::new(&t, "11450", MatcherConfig::default()).unwrap();
        let b = bundle(&[("Type", "trainers"), ("Keywords", "shoes footwear")]);

        let first = m.resolve(&b);
        let second = m.resolve(&b);
        assert_eq!(first, second);
    }

    #[test]
    fn test_tie_broken_by_shallower_path() {
        // Both leaves carry the same tokens; depths differ
        let t = table(
            r#"[
            {"id": "200", "name": "Tops", "leaf": true, "path": ["Clothing", "Tops"]},
            {"id": "100", "name": "Casual Tops", "leaf": true, "path": ["Clothing", "Tops", "Casual Tops"]}
        ]"#,
        );
        let m = CategoryMatcher::new(&t, "200", MatcherConfig::default()).unwrap();

        let result = m.resolve(&bundle(&[("Type", "tops"), ("Keywords", "clothing")]));
        // "Casual Tops" scores higher on its extra token only when the
        // bundle mentions "casual"; here both score identically and the
        // shallower category wins despite its larger id
        assert_eq!(result.category_id, "200");
    }

    #[test]
    fn test_tie_broken_by_id_last() {
        let t = table(
            r#"[
            {"id": "b2", "name": "Vinyl Records", "leaf": true, "path": ["Music", "Vinyl Records"]},
            {"id": "a1", "name": "Vinyl Albums", "leaf": true, "path": ["Music", "Vinyl Albums"]}
        ]"#,
        );
        let m = CategoryMatcher::new(&t, "a1", MatcherConfig::default()).unwrap();

        // "vinyl" and "music" hit both equally at equal depth
        let result = m.resolve(&bundle(&[("Type", "vinyl"), ("Keywords", "music")]));
        assert_eq!(result.category_id, "a1");
    }

    #[test]
    fn test_primary_attributes_outweigh_secondary() {
        let t = table(
            r#"[
            {"id": "10", "name": "Nike Memorabilia", "leaf": true},
            {"id": "20", "name": "Trainers", "leaf": true}
        ]"#,
        );
        let m = CategoryMatcher::new(&t, "10", MatcherConfig::default()).unwrap();

        // Brand (secondary) points at memorabilia, Type (primary) at
        // trainers; the primary weight must dominate
        let result = m.resolve(&bundle(&[("Brand", "nike"), ("Type", "trainers")]));
        assert_eq!(result.category_id, "20");
    }

    #[test]
    fn test_score_at_threshold_falls_back() {
        let t = shoe_table();
        let config = MatcherConfig {
            // A single whole-token secondary match scores exactly 3.0
            min_score: 3.0,
            ..MatcherConfig::default()
        };
        let m = CategoryMatcher::new(&t, "11450", config).unwrap();

        let result = m.resolve(&bundle(&[("Brand", "mugs")]));
        // Score equals the threshold, does not exceed it
        assert_eq!(result.category_id, "11450");
        assert_eq!(result.confidence, 0.0);
        // Diagnostics still carry what was scored
        assert!(!result.ranking.is_empty());
    }

    #[test]
    fn test_substring_scores_lower_than_whole_token() {
        let t = table(
            r#"[
            {"id": "10", "name": "Mugs", "leaf": true},
            {"id": "20", "name": "Mug", "leaf": true}
        ]"#,
        );
        let m = CategoryMatcher::new(&t, "10", MatcherConfig::default()).unwrap();

        // "mug" is a whole token of "Mug" but only a substring of "mugs"
        let result = m.resolve(&bundle(&[("Type", "mug")]));
        assert_eq!(result.category_id, "20");
        let plural = result.ranking.iter().find(|r| r.id == "10").unwrap();
        assert!(plural.score < result.confidence);
    }

    #[test]
    fn test_ranking_capped_at_top_k() {
        let mut rows = String::from("[");
        for i in 0..20 {
            rows.push_str(&format!(
                r#"{{"id": "{}", "name": "Mug Variant {}", "leaf": true}},"#,
                100 + i,
                i
            ));
        }
        rows.push_str(r#"{"id": "11450", "name": "Other", "leaf": true}]"#);

        let t = table(&rows);
        let m = CategoryMatcher::new(&t, "11450", MatcherConfig::default()).unwrap();
        let result = m.resolve(&bundle(&[("Type", "mug")]));
        assert_eq!(result.ranking.len(), 5);
    }

    // =============================================
    // Configuration errors
    // =============================================

    #[test]
    fn test_empty_table_is_config_error() {
        let t = table("[]");
        let result = CategoryMatcher::new(&t, "11450", MatcherConfig::default());
        assert!(matches!(result, Err(ListerError::Config(_))));
    }

    #[test]
    fn test_unknown_fallback_is_config_error() {
        let t = shoe_table();
        let result = CategoryMatcher::new(&t, "99999", MatcherConfig::default());
        assert!(matches!(result, Err(ListerError::Config(_))));
    }

    #[test]
    fn test_non_leaf_fallback_is_config_error() {
        let t = shoe_table();
        // id 1 ("Shoes") is a parent node
        let result = CategoryMatcher::new(&t, "1", MatcherConfig::default());
        assert!(matches!(result, Err(ListerError::Config(_))));
    }

    #[test]
    fn test_unset_fallback_is_config_error() {
        let t = shoe_table();
        let result = CategoryMatcher::new(&t, "", MatcherConfig::default());
        assert!(matches!(result, Err(ListerError::Config(_))));
    }

    #[test]
    fn test_tokenize_strips_punctuation() {
        assert_eq!(tokenize("Men's T-Shirts"), vec!["men", "s", "t", "shirts"]);
        assert_eq!(tokenize("  "), Vec::<String>::new());
    }
}
