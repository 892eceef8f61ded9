use std::collections::HashMap;

use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::errors::{Result, TradeError};
use crate::fetcher::{PoeTradeHandler, TradeRequest};
use crate::models::Item;
use crate::reconciler::{StatDefinition, StatPatternProvider};

/// Shape shared by the `data/static` and `data/stats` endpoints.
#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    result: Vec<DataGroup<T>>,
}

#[derive(Debug, Deserialize)]
struct DataGroup<T> {
    #[serde(default = "Vec::new")]
    entries: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StaticEntry {
    pub id: String,
    pub text: String,
}

/// Bulk trade ids of currency-like items, keyed by display text.
#[derive(Debug, Clone, Default)]
pub struct StaticItemIndex {
    ids: HashMap<String, String>,
}

impl StaticItemIndex {
    pub fn new(entries: impl IntoIterator<Item = StaticEntry>) -> Self {
        Self {
            ids: entries
                .into_iter()
                .map(|entry| (entry.text, entry.id))
                .collect(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let envelope: DataEnvelope<StaticEntry> = serde_json::from_str(json)?;
        Ok(Self::new(envelope.result.into_iter().flat_map(|group| group.entries)))
    }

    pub async fn load_from_file(path: &str) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        Self::from_json(&content)
    }

    /// Trade id of an item, looked up by name first, then by type.
    pub fn get_id(&self, item: &Item) -> Option<&str> {
        [&item.metadata.name, &item.metadata.r#type]
            .into_iter()
            .flatten()
            .find_map(|text| self.ids.get(text))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

pub fn parse_stat_definitions(json: &str) -> Result<Vec<StatDefinition>> {
    let envelope: DataEnvelope<StatDefinition> = serde_json::from_str(json)?;
    Ok(envelope
        .result
        .into_iter()
        .flat_map(|group| group.entries)
        .collect())
}

async fn get_data(handler: &PoeTradeHandler, path: &str, cancel: &CancellationToken) -> Result<String> {
    let url = handler.settings().api_base_url()?.join(path)?;
    let response = handler.send(TradeRequest::get(url.clone()), cancel).await?;
    if !response.is_success() {
        return Err(TradeError::Api {
            status: response.status,
            body: response.body,
        });
    }
    info!("Loaded trade data from {}", url);
    Ok(response.body)
}

pub async fn load_static_items(handler: &PoeTradeHandler, cancel: &CancellationToken) -> Result<StaticItemIndex> {
    let body = get_data(handler, "data/static", cancel).await?;
    StaticItemIndex::from_json(&body)
}

pub async fn load_stat_provider(handler: &PoeTradeHandler, cancel: &CancellationToken) -> Result<StatPatternProvider> {
    let body = get_data(handler, "data/stats", cancel).await?;
    StatPatternProvider::new(parse_stat_definitions(&body)?)
}
