use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use url::Url;

use crate::config::TradeSettings;
use crate::data::StaticItemIndex;
use crate::errors::{Result, TradeError};
use crate::models::poe_item::ErrorResult;
use crate::models::{
    FetchResponse, Item, ItemRarity, ModifierCategory, ModifierFilter, PropertyFilters, TradeItem,
    TradeSearchResult,
};
use crate::reconciler::{reconcile, ModifierProvider};

use super::handler::{PoeTradeHandler, TradeRequest, TradeResponse};
use super::requests::{BulkQueryRequest, SearchRequest};

/// The fetch endpoint answers at most this many listings per call.
const FETCH_BATCH_SIZE: usize = 10;

/// Search, exchange and fetch calls against the trade API.
///
/// Failures are soft: anything but an authentication problem or a
/// cancellation is logged and comes back as `Ok(None)`.
#[derive(Clone)]
pub struct TradeApiClient {
    handler: PoeTradeHandler,
    modifiers: Arc<dyn ModifierProvider>,
    static_items: StaticItemIndex,
}

impl TradeApiClient {
    pub fn new(
        handler: PoeTradeHandler,
        modifiers: Arc<dyn ModifierProvider>,
        static_items: StaticItemIndex,
    ) -> Self {
        Self {
            handler,
            modifiers,
            static_items,
        }
    }

    fn settings(&self) -> &TradeSettings {
        self.handler.settings()
    }

    fn endpoint(&self, kind: &str) -> Result<Url> {
        let base = self.settings().api_base_url()?;
        Ok(base.join(&format!("{}/{}", kind, self.settings().league_id))?)
    }

    #[tracing::instrument(skip_all, fields(league = %self.settings().league_id))]
    pub async fn search(
        &self,
        item: &Item,
        property_filters: Option<&PropertyFilters>,
        modifier_filters: Option<&[ModifierFilter]>,
        cancel: &CancellationToken,
    ) -> Result<Option<TradeSearchResult>> {
        info!("Querying Trade API.");

        let request = SearchRequest::for_item(item, property_filters, modifier_filters);
        let url = match self.endpoint("search") {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, "Could not build the search endpoint.");
                return Ok(None);
            }
        };

        self.post_query(url, &request, cancel).await
    }

    #[tracing::instrument(skip_all, fields(league = %self.settings().league_id))]
    pub async fn search_bulk(&self, item: &Item, cancel: &CancellationToken) -> Result<Option<TradeSearchResult>> {
        info!("Querying Exchange API.");

        let Some(id) = self.static_items.get_id(item) else {
            warn!(item = ?item.metadata, "Item has no bulk trade id.");
            return Ok(None);
        };

        let url = match self.endpoint("exchange") {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, "Could not build the exchange endpoint.");
                return Ok(None);
            }
        };

        self.post_query(url, &BulkQueryRequest::new(id), cancel).await
    }

    async fn post_query<T: Serialize>(
        &self,
        url: Url,
        query: &T,
        cancel: &CancellationToken,
    ) -> Result<Option<TradeSearchResult>> {
        let json = match serde_json::to_string(query) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "Could not serialize the query.");
                return Ok(None);
            }
        };

        let request = TradeRequest::post_json(url.clone(), json.clone());
        let response = match self.handler.send(request, cancel).await {
            Ok(response) => response,
            Err(e) if e.is_user_facing() => return Err(e),
            Err(TradeError::Api { status, body }) => TradeResponse::new(status, body),
            Err(e) => {
                warn!(error = %e, uri = %url, query = %json, "Exception thrown while querying trade api.");
                return Ok(None);
            }
        };

        if response.is_success() {
            return match serde_json::from_str::<TradeSearchResult>(&response.body) {
                Ok(result) => Ok(Some(result)),
                Err(e) => {
                    warn!(error = %e, body = %response.body, "Failed to parse search response.");
                    Ok(None)
                }
            };
        }

        warn!(status = %response.status, body = %response.body, "Querying failed.");
        warn!("Uri: {}", url);
        warn!("Query: {}", json);

        match serde_json::from_str::<ErrorResult>(&response.body) {
            Ok(error) => Ok(Some(TradeSearchResult::from_error(error.error))),
            Err(e) => {
                warn!(error = %e, "Failed response has no error body.");
                Ok(None)
            }
        }
    }

    fn fetch_url(&self, query_id: &str, ids: &[String], pseudos: &[&str]) -> Result<Url> {
        let base = self.settings().api_base_url()?;
        let mut url = base.join(&format!("fetch/{}", ids.join(",")))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("query", query_id);
            for pseudo in pseudos {
                pairs.append_pair("pseudos[]", pseudo);
            }
        }
        Ok(url)
    }

    /// Failures are logged here with the URI and response body before they reach the boundary.
    async fn fetch_batch(&self, url: Url, cancel: &CancellationToken) -> Result<Vec<TradeItem>> {
        let response = match self.handler.send(TradeRequest::get(url.clone()), cancel).await {
            Ok(response) => response,
            Err(TradeError::Api { status, body }) => TradeResponse::new(status, body),
            Err(e) => return Err(e),
        };

        if !response.is_success() {
            warn!(status = %response.status, uri = %url, body = %response.body, "Fetching listings failed.");
            return Err(TradeError::Api {
                status: response.status,
                body: response.body,
            });
        }

        let fetched: FetchResponse = match serde_json::from_str(&response.body) {
            Ok(fetched) => fetched,
            Err(e) => {
                warn!(error = %e, uri = %url, body = %response.body, "Failed to parse fetch response.");
                return Err(e.into());
            }
        };

        reconcile(fetched, self.modifiers.as_ref()).map_err(|e| {
            warn!(error = %e, uri = %url, body = %response.body, "Failed to reconcile fetched listings.");
            e
        })
    }

    /// Fetches the listings behind `ids` and rebuilds them as trade items.
    #[tracing::instrument(skip_all, fields(query_id = %query_id, count = ids.len()))]
    pub async fn fetch_results(
        &self,
        query_id: &str,
        ids: &[String],
        modifier_filters: Option<&[ModifierFilter]>,
        cancel: &CancellationToken,
    ) -> Result<Option<Vec<TradeItem>>> {
        info!("Fetching Trade API Listings from Query {}.", query_id);

        let pseudos: Vec<&str> = modifier_filters
            .unwrap_or_default()
            .iter()
            .filter_map(|filter| filter.line.modifier.as_ref())
            .filter(|modifier| modifier.category == ModifierCategory::Pseudo)
            .map(|modifier| modifier.id.as_str())
            .collect();

        let mut items = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(FETCH_BATCH_SIZE) {
            let url = match self.fetch_url(query_id, chunk, &pseudos) {
                Ok(url) => url,
                Err(e) => {
                    warn!(error = %e, "Could not build the fetch endpoint.");
                    return Ok(None);
                }
            };

            match self.fetch_batch(url.clone(), cancel).await {
                Ok(batch) => items.extend(batch),
                Err(e) if e.is_user_facing() => return Err(e),
                Err(e) => {
                    warn!(error = %e, uri = %url, "Exception thrown when fetching trade API listings from Query {}.", query_id);
                    return Ok(None);
                }
            }
        }

        Ok(Some(items))
    }

    /// Website link showing the results of a query.
    pub fn trade_uri(&self, item: &Item, query_id: &str) -> Result<Url> {
        let base = if item.metadata.rarity == ItemRarity::Currency && self.static_items.get_id(item).is_some() {
            self.settings().exchange_site_url()?
        } else {
            self.settings().search_site_url()?
        };

        Ok(base.join(&format!("{}/{}", self.settings().league_id, query_id))?)
    }
}
