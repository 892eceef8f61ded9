use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ModifierCategory {
    #[default]
    Undefined,
    Pseudo,
    Explicit,
    Implicit,
    Crafted,
    Enchant,
    Fractured,
    Scourge,
    Monster,
    Delve,
    Veiled,
}

impl ModifierCategory {
    /// Category encoded in a stat id such as `explicit.stat_3299347043`.
    pub fn from_stat_id(id: &str) -> Self {
        match id.split('.').next().unwrap_or_default() {
            "pseudo" => ModifierCategory::Pseudo,
            "explicit" => ModifierCategory::Explicit,
            "implicit" => ModifierCategory::Implicit,
            "crafted" => ModifierCategory::Crafted,
            "enchant" => ModifierCategory::Enchant,
            "fractured" => ModifierCategory::Fractured,
            "scourge" => ModifierCategory::Scourge,
            "monster" => ModifierCategory::Monster,
            "delve" => ModifierCategory::Delve,
            "veiled" => ModifierCategory::Veiled,
            _ => ModifierCategory::Undefined,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    pub id: String,
    pub category: ModifierCategory,
    pub text: Option<String>,
    pub tier: Option<String>,
    pub tier_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModifierLine {
    pub text: Option<String>,
    pub modifier: Option<Modifier>,
}

impl ModifierLine {
    pub fn new(text: impl Into<String>, modifier: Modifier) -> Self {
        Self {
            text: Some(text.into()),
            modifier: Some(modifier),
        }
    }
}
