use serde::Serialize;

use crate::models::{Item, ItemCategory, ItemRarity, ModifierFilter, PropertyFilters};

use super::dispatch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub enum TradeStatus {
    #[default]
    Online,
}

impl TradeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeStatus::Online => "online",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusFilter {
    pub option: String,
}

impl From<TradeStatus> for StatusFilter {
    fn from(status: TradeStatus) -> Self {
        Self {
            option: status.as_str().to_string(),
        }
    }
}

/// Exact or enumerated filter value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchFilterOption {
    pub option: String,
}

impl SearchFilterOption {
    pub fn new(option: impl Into<String>) -> Self {
        Self {
            option: option.into(),
        }
    }
}

/// Numeric range filter, open on any side left empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchFilterValue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl From<&ModifierFilter> for SearchFilterValue {
    fn from(filter: &ModifierFilter) -> Self {
        Self {
            min: filter.min,
            max: filter.max,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterGroup<T> {
    pub filters: T,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TypeFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<SearchFilterOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rarity: Option<SearchFilterOption>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ArmourFilters {
    #[serde(rename = "ar", skip_serializing_if = "Option::is_none")]
    pub armour: Option<SearchFilterValue>,
    #[serde(rename = "ev", skip_serializing_if = "Option::is_none")]
    pub evasion: Option<SearchFilterValue>,
    #[serde(rename = "es", skip_serializing_if = "Option::is_none")]
    pub energy_shield: Option<SearchFilterValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block: Option<SearchFilterValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WeaponFilters {
    #[serde(rename = "pdps", skip_serializing_if = "Option::is_none")]
    pub physical_dps: Option<SearchFilterValue>,
    #[serde(rename = "edps", skip_serializing_if = "Option::is_none")]
    pub elemental_dps: Option<SearchFilterValue>,
    #[serde(rename = "dps", skip_serializing_if = "Option::is_none")]
    pub damage_per_second: Option<SearchFilterValue>,
    #[serde(rename = "aps", skip_serializing_if = "Option::is_none")]
    pub attacks_per_second: Option<SearchFilterValue>,
    #[serde(rename = "crit", skip_serializing_if = "Option::is_none")]
    pub critical_strike_chance: Option<SearchFilterValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MapFilters {
    #[serde(rename = "map_iiq", skip_serializing_if = "Option::is_none")]
    pub item_quantity: Option<SearchFilterValue>,
    #[serde(rename = "map_iir", skip_serializing_if = "Option::is_none")]
    pub item_rarity: Option<SearchFilterValue>,
    #[serde(rename = "map_packsize", skip_serializing_if = "Option::is_none")]
    pub monster_pack_size: Option<SearchFilterValue>,
    #[serde(rename = "map_blighted", skip_serializing_if = "Option::is_none")]
    pub blighted: Option<SearchFilterOption>,
    #[serde(rename = "map_tier", skip_serializing_if = "Option::is_none")]
    pub map_tier: Option<SearchFilterValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MiscFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<SearchFilterValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gem_level: Option<SearchFilterValue>,
    #[serde(rename = "ilvl", skip_serializing_if = "Option::is_none")]
    pub item_level: Option<SearchFilterValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corrupted: Option<SearchFilterOption>,
    #[serde(rename = "scourge_tier", skip_serializing_if = "Option::is_none")]
    pub scourged: Option<SearchFilterValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crusader_item: Option<SearchFilterOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elder_item: Option<SearchFilterOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hunter_item: Option<SearchFilterOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redeemer_item: Option<SearchFilterOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shaper_item: Option<SearchFilterOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warlord_item: Option<SearchFilterOption>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SocketFilterOption {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SocketFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<SocketFilterOption>,
}

/// The `filters` document of a search query. Groups stay `None` until a
/// filter is written into them so empty groups never reach the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_filters: Option<FilterGroup<TypeFilters>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub armour_filters: Option<FilterGroup<ArmourFilters>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weapon_filters: Option<FilterGroup<WeaponFilters>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map_filters: Option<FilterGroup<MapFilters>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub misc_filters: Option<FilterGroup<MiscFilters>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub socket_filters: Option<FilterGroup<SocketFilters>>,
}

impl SearchFilters {
    pub fn type_filters(&mut self) -> &mut TypeFilters {
        &mut self.type_filters.get_or_insert_with(Default::default).filters
    }

    pub fn armour_filters(&mut self) -> &mut ArmourFilters {
        &mut self.armour_filters.get_or_insert_with(Default::default).filters
    }

    pub fn weapon_filters(&mut self) -> &mut WeaponFilters {
        &mut self.weapon_filters.get_or_insert_with(Default::default).filters
    }

    pub fn map_filters(&mut self) -> &mut MapFilters {
        &mut self.map_filters.get_or_insert_with(Default::default).filters
    }

    pub fn misc_filters(&mut self) -> &mut MiscFilters {
        &mut self.misc_filters.get_or_insert_with(Default::default).filters
    }

    pub fn socket_filters(&mut self) -> &mut SocketFilters {
        &mut self.socket_filters.get_or_insert_with(Default::default).filters
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatFilter {
    pub id: String,
    pub value: SearchFilterValue,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatFilterGroup {
    pub r#type: String,
    pub filters: Vec<StatFilter>,
}

impl Default for StatFilterGroup {
    fn default() -> Self {
        Self {
            r#type: "and".to_string(),
            filters: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeQuery {
    pub status: StatusFilter,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,
    pub filters: SearchFilters,
    pub stats: Vec<StatFilterGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    pub query: TradeQuery,
    pub sort: serde_json::Value,
}

const RARITY_UNIQUE: &str = "Unique";
const RARITY_RELIC: &str = "uniquefoil";
const RARITY_NON_UNIQUE: &str = "nonunique";
const AUTO_LINK_THRESHOLD: usize = 5;

impl SearchRequest {
    pub fn new(status: TradeStatus) -> Self {
        Self {
            query: TradeQuery {
                status: status.into(),
                name: None,
                r#type: None,
                term: None,
                filters: SearchFilters::default(),
                stats: Vec::new(),
            },
            sort: serde_json::json!({
                "price": "asc"
            }),
        }
    }

    /// Builds the regular search for an item and the filters picked for it.
    pub fn for_item(
        item: &Item,
        property_filters: Option<&PropertyFilters>,
        modifier_filters: Option<&[ModifierFilter]>,
    ) -> Self {
        let mut request = Self::new(TradeStatus::Online);
        let query = &mut request.query;
        let metadata = &item.metadata;

        if metadata.category == ItemCategory::ItemisedMonster {
            if let Some(name) = non_empty(&metadata.name) {
                query.term = Some(name);
            } else if let Some(r#type) = non_empty(&metadata.r#type) {
                query.r#type = Some(r#type);
            }
        } else if metadata.rarity == ItemRarity::Unique {
            query.name = metadata.name.clone();
            query.r#type = metadata.r#type.clone();

            let rarity = if item.properties.is_relic {
                RARITY_RELIC
            } else {
                RARITY_UNIQUE
            };
            query.filters.type_filters().rarity = Some(SearchFilterOption::new(rarity));
        } else {
            query.r#type = metadata.r#type.clone();
            query.filters.type_filters().rarity = Some(SearchFilterOption::new(RARITY_NON_UNIQUE));
        }

        if let Some(property_filters) = property_filters {
            dispatch::apply_property_filters(query, property_filters);
        }

        if let Some(modifier_filters) = modifier_filters {
            query.stats.push(stat_group(modifier_filters));
        }

        apply_socket_filters(item, &mut query.filters);

        if item.properties.alternate_quality {
            query.term = item.original.name.clone();
        }

        request
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|value| !value.is_empty()).cloned()
}

fn stat_group(modifier_filters: &[ModifierFilter]) -> StatFilterGroup {
    let filters = modifier_filters
        .iter()
        .filter_map(|filter| {
            filter.line.modifier.as_ref().map(|modifier| StatFilter {
                id: modifier.id.clone(),
                value: SearchFilterValue::from(filter),
                disabled: !filter.enabled,
            })
        })
        .collect();

    StatFilterGroup {
        filters,
        ..Default::default()
    }
}

/// Five or more linked sockets are worth searching for by default.
fn apply_socket_filters(item: &Item, filters: &mut SearchFilters) {
    let links = item.link_count();
    if links >= AUTO_LINK_THRESHOLD {
        filters.socket_filters().links = Some(SocketFilterOption {
            min: Some(links as u32),
            max: None,
        });
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Exchange {
    pub status: StatusFilter,
    pub have: Vec<String>,
    pub want: Vec<String>,
}

/// Body of the bulk exchange endpoint, keyed by the item's trade id only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkQueryRequest {
    pub exchange: Exchange,
}

const DEFAULT_HAVE_CURRENCY: &str = "chaos";

impl BulkQueryRequest {
    pub fn new(want_id: impl Into<String>) -> Self {
        Self {
            exchange: Exchange {
                status: TradeStatus::Online.into(),
                have: vec![DEFAULT_HAVE_CURRENCY.to_string()],
                want: vec![want_id.into()],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        ItemMetadata, ItemProperties, Modifier, ModifierLine, OriginalItem, Socket, SocketColour,
    };

    fn unique_belt(is_relic: bool) -> Item {
        let mut item = Item::new(ItemMetadata {
            name: Some("Headhunter".to_string()),
            r#type: Some("Leather Belt".to_string()),
            category: ItemCategory::Accessory,
            rarity: ItemRarity::Unique,
        });
        item.properties = ItemProperties {
            is_relic,
            ..Default::default()
        };
        item
    }

    fn sockets(groups: &[u32]) -> Vec<Socket> {
        groups
            .iter()
            .map(|group| Socket {
                group: *group,
                colour: SocketColour::Green,
            })
            .collect()
    }

    #[test]
    fn test_unique_query_matches_name_and_type() {
        let request = SearchRequest::for_item(&unique_belt(false), None, None);
        assert_eq!(request.query.name.as_deref(), Some("Headhunter"));
        assert_eq!(request.query.r#type.as_deref(), Some("Leather Belt"));

        let rarity = request
            .query
            .filters
            .type_filters
            .as_ref()
            .and_then(|group| group.filters.rarity.as_ref())
            .map(|rarity| rarity.option.as_str());
        assert_eq!(rarity, Some("Unique"));
    }

    #[test]
    fn test_relic_uses_foil_rarity() {
        let request = SearchRequest::for_item(&unique_belt(true), None, None);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["query"]["filters"]["type_filters"]["filters"]["rarity"]["option"], "uniquefoil");
    }

    #[test]
    fn test_non_unique_query_matches_base_type_only() {
        let item = Item::new(ItemMetadata {
            name: Some("Doom Loop".to_string()),
            r#type: Some("Vaal Regalia".to_string()),
            category: ItemCategory::Armour,
            rarity: ItemRarity::Rare,
        });
        let request = SearchRequest::for_item(&item, None, None);
        assert_eq!(request.query.name, None);
        assert_eq!(request.query.r#type.as_deref(), Some("Vaal Regalia"));

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["query"]["filters"]["type_filters"]["filters"]["rarity"]["option"], "nonunique");
        assert_eq!(json["sort"]["price"], "asc");
        assert_eq!(json["query"]["status"]["option"], "online");
    }

    #[test]
    fn test_itemised_monster_prefers_name_term() {
        let mut metadata = ItemMetadata {
            name: Some("Fenumal Plagued Arachnid".to_string()),
            r#type: Some("Wild Bristle Matron".to_string()),
            category: ItemCategory::ItemisedMonster,
            rarity: ItemRarity::Unknown,
        };
        let request = SearchRequest::for_item(&Item::new(metadata.clone()), None, None);
        assert_eq!(request.query.term.as_deref(), Some("Fenumal Plagued Arachnid"));
        assert_eq!(request.query.r#type, None);
        assert_eq!(request.query.filters.type_filters, None);

        metadata.name = Some(String::new());
        let request = SearchRequest::for_item(&Item::new(metadata), None, None);
        assert_eq!(request.query.term, None);
        assert_eq!(request.query.r#type.as_deref(), Some("Wild Bristle Matron"));
    }

    #[test]
    fn test_alternate_quality_overrides_term() {
        let mut item = Item::new(ItemMetadata {
            name: None,
            r#type: Some("Raise Spectre".to_string()),
            category: ItemCategory::Gem,
            rarity: ItemRarity::Gem,
        })
        .with_original(OriginalItem {
            name: Some("Phantasmal Raise Spectre".to_string()),
            r#type: Some("Raise Spectre".to_string()),
            text: String::new(),
        });
        item.properties.alternate_quality = true;

        let request = SearchRequest::for_item(&item, None, None);
        assert_eq!(request.query.term.as_deref(), Some("Phantasmal Raise Spectre"));
    }

    #[test]
    fn test_five_links_add_socket_filter() {
        let item = unique_belt(false).with_sockets(sockets(&[0, 0, 1, 1, 2, 2, 2, 2, 2]));
        let request = SearchRequest::for_item(&item, None, None);
        let links = request
            .query
            .filters
            .socket_filters
            .as_ref()
            .and_then(|group| group.filters.links.as_ref())
            .and_then(|links| links.min);
        assert_eq!(links, Some(5));
    }

    #[test]
    fn test_unlinked_sockets_add_no_socket_filter() {
        let item = unique_belt(false).with_sockets(sockets(&[0, 1, 2, 3]));
        let request = SearchRequest::for_item(&item, None, None);
        assert_eq!(request.query.filters.socket_filters, None);
    }

    #[test]
    fn test_modifier_filters_form_one_stat_group() {
        let life = ModifierFilter::new(ModifierLine::new(
            "+40 to maximum Life",
            Modifier {
                id: "explicit.stat_3299347043".to_string(),
                ..Default::default()
            },
        ))
        .with_range(Some(35.0), None);
        let mut resist = ModifierFilter::new(ModifierLine::new(
            "+20% to Fire Resistance",
            Modifier {
                id: "explicit.stat_3372524247".to_string(),
                ..Default::default()
            },
        ));
        resist.enabled = false;
        let unmatched = ModifierFilter::new(ModifierLine {
            text: Some("Unknown line".to_string()),
            modifier: None,
        });

        let filters = vec![life, resist, unmatched];
        let request = SearchRequest::for_item(&unique_belt(false), None, Some(&filters));

        assert_eq!(request.query.stats.len(), 1);
        let group = &request.query.stats[0];
        assert_eq!(group.r#type, "and");
        assert_eq!(group.filters.len(), 2);
        assert_eq!(group.filters[0].value.min, Some(35.0));
        assert!(!group.filters[0].disabled);
        assert!(group.filters[1].disabled);
    }

    #[test]
    fn test_bulk_query_body() {
        let json = serde_json::to_value(BulkQueryRequest::new("divine")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "exchange": {
                    "status": { "option": "online" },
                    "have": ["chaos"],
                    "want": ["divine"]
                }
            })
        );
    }
}
