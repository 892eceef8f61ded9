//! Raw response envelopes of the trade API, deserialized as the server sends them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::item::Influences;
use super::item_type::ItemRarity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    pub code: i32,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ErrorResult {
    pub error: ApiError,
}

/// Answer of the search and exchange endpoints. A failed query only carries `error`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeSearchResult {
    #[serde(default)]
    pub result: Vec<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub total: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

impl TradeSearchResult {
    pub fn from_error(error: ApiError) -> Self {
        Self {
            error: Some(error),
            ..Default::default()
        }
    }

    pub fn get_result_ids(&self) -> &[String] {
        &self.result
    }
}

#[derive(Debug, Deserialize)]
pub struct FetchResponse {
    pub result: Vec<Option<ItemResponse>>,
}

#[derive(Debug, Deserialize)]
pub struct ItemResponse {
    pub id: String,
    pub item: ItemData,
    pub listing: ListingData,
}

#[derive(Debug, Deserialize)]
pub struct ItemData {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "typeLine", default)]
    pub type_line: Option<String>,
    #[serde(default)]
    pub rarity: ItemRarity,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub w: u32,
    #[serde(default)]
    pub h: u32,
    #[serde(default)]
    pub ilvl: u32,
    #[serde(default)]
    pub identified: bool,
    #[serde(default)]
    pub corrupted: bool,
    #[serde(rename = "isRelic", default)]
    pub is_relic: bool,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub influences: Influences,
    #[serde(default)]
    pub sockets: Vec<ResultSocket>,
    #[serde(default)]
    pub requirements: Option<Vec<ResultLineContent>>,
    #[serde(default)]
    pub properties: Option<Vec<ResultLineContent>>,
    #[serde(rename = "additionalProperties", default)]
    pub additional_properties: Option<Vec<ResultLineContent>>,
    #[serde(rename = "enchantMods", default)]
    pub enchant_mods: Option<Vec<String>>,
    #[serde(rename = "implicitMods", default)]
    pub implicit_mods: Option<Vec<String>>,
    #[serde(rename = "logbookMods", default)]
    pub logbook_mods: Option<Vec<LogbookMod>>,
    #[serde(rename = "craftedMods", default)]
    pub crafted_mods: Option<Vec<String>>,
    #[serde(rename = "explicitMods", default)]
    pub explicit_mods: Option<Vec<String>>,
    #[serde(rename = "fracturedMods", default)]
    pub fractured_mods: Option<Vec<String>>,
    #[serde(rename = "scourgeMods", default)]
    pub scourge_mods: Option<Vec<String>>,
    #[serde(rename = "pseudoMods", default)]
    pub pseudo_mods: Option<Vec<String>>,
    #[serde(default)]
    pub scourged: Option<Scourged>,
    pub extended: ExtendedData,
}

#[derive(Debug, Deserialize)]
pub struct LogbookMod {
    #[serde(default)]
    pub mods: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct Scourged {
    #[serde(default)]
    pub tier: u32,
}

#[derive(Debug, Deserialize)]
pub struct ResultSocket {
    pub group: u32,
    #[serde(rename = "sColour")]
    pub colour: String,
}

/// One property, requirement or additional property line. `values` holds
/// `[text, type]` pairs.
#[derive(Debug, Deserialize)]
pub struct ResultLineContent {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub values: Vec<Vec<serde_json::Value>>,
    #[serde(rename = "displayMode", default)]
    pub display_mode: i32,
    #[serde(default, alias = "type")]
    pub order: i32,
}

#[derive(Debug, Deserialize)]
pub struct ExtendedData {
    /// Base64 encoded item text as copied from the game client.
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub ar: Option<f64>,
    #[serde(default)]
    pub ev: Option<f64>,
    #[serde(default)]
    pub es: Option<f64>,
    #[serde(default)]
    pub dps: Option<f64>,
    #[serde(default)]
    pub pdps: Option<f64>,
    #[serde(default)]
    pub edps: Option<f64>,
    #[serde(default)]
    pub mods: Option<ModData>,
    #[serde(default)]
    pub hashes: Option<HashData>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ModData {
    pub enchant: Option<Vec<ModInfo>>,
    pub implicit: Option<Vec<ModInfo>>,
    pub crafted: Option<Vec<ModInfo>>,
    pub explicit: Option<Vec<ModInfo>>,
    pub fractured: Option<Vec<ModInfo>>,
    pub scourge: Option<Vec<ModInfo>>,
    pub pseudo: Option<Vec<ModInfo>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tier: Option<String>,
    #[serde(default)]
    pub magnitudes: Option<Vec<Magnitude>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Magnitude {
    pub hash: String,
    #[serde(default)]
    pub min: Option<serde_json::Value>,
    #[serde(default)]
    pub max: Option<serde_json::Value>,
}

/// Per category `[hash, [mod indices] | null]` entries.
#[derive(Debug, Default, Deserialize)]
pub struct HashData {
    pub enchant: Option<Vec<Vec<serde_json::Value>>>,
    pub implicit: Option<Vec<Vec<serde_json::Value>>>,
    pub crafted: Option<Vec<Vec<serde_json::Value>>>,
    pub explicit: Option<Vec<Vec<serde_json::Value>>>,
    pub monster: Option<Vec<Vec<serde_json::Value>>>,
    pub fractured: Option<Vec<Vec<serde_json::Value>>>,
    pub scourge: Option<Vec<Vec<serde_json::Value>>>,
    pub pseudo: Option<Vec<Vec<serde_json::Value>>>,
}

#[derive(Debug, Deserialize)]
pub struct ListingData {
    #[serde(default)]
    pub indexed: Option<DateTime<Utc>>,
    pub account: Account,
    #[serde(default)]
    pub price: Option<Price>,
    #[serde(default)]
    pub whisper: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Price {
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Account {
    pub name: String,
    #[serde(rename = "lastCharacterName", default)]
    pub last_character_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_response_keeps_null_entries() {
        let json = r#"{"result":[null,{"id":"a1","listing":{"account":{"name":"seller"}},"item":{"typeLine":"Leather Belt","extended":{}}}]}"#;
        let response: FetchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.result.len(), 2);
        assert!(response.result[0].is_none());
        let item = response.result[1].as_ref().unwrap();
        assert_eq!(item.item.type_line.as_deref(), Some("Leather Belt"));
        assert!(item.listing.price.is_none());
    }

    #[test]
    fn test_search_error_envelope() {
        let json = r#"{"error":{"code":2,"message":"Invalid query"}}"#;
        let result: ErrorResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.error.code, 2);
        assert_eq!(TradeSearchResult::from_error(result.error.clone()).error, Some(result.error));
    }
}
