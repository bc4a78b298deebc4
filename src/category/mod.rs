//! Category resolution
//!
//! - table: static category table, loaded once, read-only
//! - matcher: token-overlap scoring with a configured fallback
//! - rules: per-item-family listing requirements

pub mod matcher;
pub mod rules;
pub mod table;

pub use matcher::{AttributeBundle, CategoryMatcher, MatchResult, MatcherConfig, RankedCategory};
pub use table::{Category, CategoryTable};
