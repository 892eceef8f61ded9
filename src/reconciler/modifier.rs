use std::collections::HashMap;

use regex::Regex;
use serde::Deserialize;

use crate::errors::{Result, TradeError};
use crate::models::ModifierCategory;

/// Matches rendered modifier text against trade stat ids.
pub trait ModifierProvider: Send + Sync {
    fn is_match(&self, id: &str, text: &str) -> bool;

    fn modifier_category(&self, id: &str) -> ModifierCategory {
        ModifierCategory::from_stat_id(id)
    }
}

/// One entry of the trade site's stat list, e.g.
/// `{ "id": "explicit.stat_3299347043", "text": "+# to maximum Life" }`.
#[derive(Debug, Clone, Deserialize)]
pub struct StatDefinition {
    pub id: String,
    pub text: String,
}

const NUMBER_PATTERN: &str = r"[-+]?\d+(?:\.\d+)?";

/// Compiles `#` placeholders in a stat text to numeric captures.
fn compile_stat_text(text: &str) -> Result<Regex> {
    let body = text
        .split('#')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(NUMBER_PATTERN);

    Regex::new(&format!("^{}$", body))
        .map_err(|e| TradeError::Parse(format!("invalid stat text {:?}: {}", text, e)))
}

#[derive(Debug, Default)]
pub struct StatPatternProvider {
    patterns: HashMap<String, Vec<Regex>>,
}

impl StatPatternProvider {
    pub fn new(definitions: impl IntoIterator<Item = StatDefinition>) -> Result<Self> {
        let mut patterns: HashMap<String, Vec<Regex>> = HashMap::new();
        for definition in definitions {
            // Multi line stats are matched on their first line.
            let first_line = definition.text.lines().next().unwrap_or_default();
            let pattern = compile_stat_text(first_line)?;
            patterns.entry(definition.id).or_default().push(pattern);
        }
        Ok(Self { patterns })
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl ModifierProvider for StatPatternProvider {
    fn is_match(&self, id: &str, text: &str) -> bool {
        self.patterns
            .get(id)
            .map(|patterns| patterns.iter().any(|pattern| pattern.is_match(text)))
            .unwrap_or(false)
    }
}
