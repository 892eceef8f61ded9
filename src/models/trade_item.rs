use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::item::{Influences, ItemMetadata, ItemProperties, OriginalItem, Socket};
use super::modifier::{Modifier, ModifierLine};

/// How the API tags a value inside a property or requirement line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum LineContentType {
    Simple,
    Augmented,
    Unmet,
    Physical,
    Fire,
    Cold,
    Lightning,
    Chaos,
    Other(i32),
}

impl From<i32> for LineContentType {
    fn from(value: i32) -> Self {
        match value {
            0 => LineContentType::Simple,
            1 => LineContentType::Augmented,
            2 => LineContentType::Unmet,
            3 => LineContentType::Physical,
            4 => LineContentType::Fire,
            5 => LineContentType::Cold,
            6 => LineContentType::Lightning,
            7 => LineContentType::Chaos,
            other => LineContentType::Other(other),
        }
    }
}

impl From<LineContentType> for i32 {
    fn from(value: LineContentType) -> Self {
        match value {
            LineContentType::Simple => 0,
            LineContentType::Augmented => 1,
            LineContentType::Unmet => 2,
            LineContentType::Physical => 3,
            LineContentType::Fire => 4,
            LineContentType::Cold => 5,
            LineContentType::Lightning => 6,
            LineContentType::Chaos => 7,
            LineContentType::Other(other) => other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineContentValue {
    pub value: String,
    pub r#type: LineContentType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineContent {
    pub text: String,
    pub values: Vec<LineContentValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradePrice {
    pub account_name: String,
    pub account_character: Option<String>,
    /// `-1` when the seller did not set a price.
    pub amount: f64,
    pub currency: String,
    pub date: Option<DateTime<Utc>>,
    pub whisper: Option<String>,
    pub note: Option<String>,
}

impl TradePrice {
    pub fn is_priced(&self) -> bool {
        self.amount >= 0.0 && !self.currency.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeItem {
    pub id: String,
    pub price: TradePrice,
    pub metadata: ItemMetadata,
    pub original: OriginalItem,
    pub properties: ItemProperties,
    pub influences: Influences,
    pub image: Option<String>,
    pub width: u32,
    pub height: u32,
    pub requirement_contents: Option<Vec<LineContent>>,
    pub property_contents: Option<Vec<LineContent>>,
    pub additional_property_contents: Option<Vec<LineContent>>,
    pub sockets: Vec<Socket>,
    pub modifier_lines: Vec<ModifierLine>,
    pub pseudo_modifiers: Vec<Modifier>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_content_type_from_api_code() {
        let value: LineContentValue = serde_json::from_str(r#"{"value":"40","type":1}"#).unwrap();
        assert_eq!(value.r#type, LineContentType::Augmented);
        assert_eq!(LineContentType::from(42), LineContentType::Other(42));
        assert_eq!(i32::from(LineContentType::Chaos), 7);
    }
}
