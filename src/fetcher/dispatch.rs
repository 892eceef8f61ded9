//! Maps price check filters onto the leaves of the search filter document.
//!
//! Both tables are closed matches without a wildcard arm, so a new filter type
//! or item class does not compile until it is given a destination.

use tracing::debug;

use crate::models::{FilterValue, ItemClass, PropertyFilter, PropertyFilterType, PropertyFilters};

use super::requests::{SearchFilterOption, SearchFilterValue, SearchFilters, TradeQuery};

/// Leaves taking an exact value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionLeaf {
    TypeCategory,
    MapBlighted,
    MiscCorrupted,
    MiscCrusader,
    MiscElder,
    MiscHunter,
    MiscRedeemer,
    MiscShaper,
    MiscWarlord,
}

/// Leaves taking a numeric range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeLeaf {
    ArmourArmour,
    ArmourEvasion,
    ArmourEnergyShield,
    ArmourBlock,
    WeaponPhysicalDps,
    WeaponElementalDps,
    WeaponDps,
    WeaponAttacksPerSecond,
    WeaponCriticalStrikeChance,
    MapItemQuantity,
    MapItemRarity,
    MapMonsterPackSize,
    MapTier,
    MiscQuality,
    MiscGemLevel,
    MiscItemLevel,
    MiscScourged,
}

/// A single leaf of [`SearchFilters`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterLeaf {
    Exact(OptionLeaf),
    Range(RangeLeaf),
}

impl FilterLeaf {
    pub fn for_filter(kind: PropertyFilterType) -> Self {
        use FilterLeaf::{Exact as O, Range as R};

        match kind {
            PropertyFilterType::Category => O(OptionLeaf::TypeCategory),
            PropertyFilterType::ArmourArmour => R(RangeLeaf::ArmourArmour),
            PropertyFilterType::ArmourEvasion => R(RangeLeaf::ArmourEvasion),
            PropertyFilterType::ArmourEnergyShield => R(RangeLeaf::ArmourEnergyShield),
            PropertyFilterType::ArmourBlock => R(RangeLeaf::ArmourBlock),
            PropertyFilterType::WeaponPhysicalDps => R(RangeLeaf::WeaponPhysicalDps),
            PropertyFilterType::WeaponElementalDps => R(RangeLeaf::WeaponElementalDps),
            PropertyFilterType::WeaponDps => R(RangeLeaf::WeaponDps),
            PropertyFilterType::WeaponAttacksPerSecond => R(RangeLeaf::WeaponAttacksPerSecond),
            PropertyFilterType::WeaponCriticalStrikeChance => R(RangeLeaf::WeaponCriticalStrikeChance),
            PropertyFilterType::MapItemQuantity => R(RangeLeaf::MapItemQuantity),
            PropertyFilterType::MapItemRarity => R(RangeLeaf::MapItemRarity),
            PropertyFilterType::MapMonsterPackSize => R(RangeLeaf::MapMonsterPackSize),
            PropertyFilterType::MapBlighted => O(OptionLeaf::MapBlighted),
            PropertyFilterType::MapTier => R(RangeLeaf::MapTier),
            PropertyFilterType::MiscQuality => R(RangeLeaf::MiscQuality),
            PropertyFilterType::MiscGemLevel => R(RangeLeaf::MiscGemLevel),
            PropertyFilterType::MiscItemLevel => R(RangeLeaf::MiscItemLevel),
            PropertyFilterType::MiscCorrupted => O(OptionLeaf::MiscCorrupted),
            PropertyFilterType::MiscScourged => R(RangeLeaf::MiscScourged),
            PropertyFilterType::MiscInfluenceCrusader => O(OptionLeaf::MiscCrusader),
            PropertyFilterType::MiscInfluenceElder => O(OptionLeaf::MiscElder),
            PropertyFilterType::MiscInfluenceHunter => O(OptionLeaf::MiscHunter),
            PropertyFilterType::MiscInfluenceRedeemer => O(OptionLeaf::MiscRedeemer),
            PropertyFilterType::MiscInfluenceShaper => O(OptionLeaf::MiscShaper),
            PropertyFilterType::MiscInfluenceWarlord => O(OptionLeaf::MiscWarlord),
        }
    }

    pub fn is_option(&self) -> bool {
        matches!(self, FilterLeaf::Exact(_))
    }
}

impl OptionLeaf {
    fn slot<'a>(&self, filters: &'a mut SearchFilters) -> &'a mut Option<SearchFilterOption> {
        match self {
            OptionLeaf::TypeCategory => &mut filters.type_filters().category,
            OptionLeaf::MapBlighted => &mut filters.map_filters().blighted,
            OptionLeaf::MiscCorrupted => &mut filters.misc_filters().corrupted,
            OptionLeaf::MiscCrusader => &mut filters.misc_filters().crusader_item,
            OptionLeaf::MiscElder => &mut filters.misc_filters().elder_item,
            OptionLeaf::MiscHunter => &mut filters.misc_filters().hunter_item,
            OptionLeaf::MiscRedeemer => &mut filters.misc_filters().redeemer_item,
            OptionLeaf::MiscShaper => &mut filters.misc_filters().shaper_item,
            OptionLeaf::MiscWarlord => &mut filters.misc_filters().warlord_item,
        }
    }
}

impl RangeLeaf {
    fn slot<'a>(&self, filters: &'a mut SearchFilters) -> &'a mut Option<SearchFilterValue> {
        match self {
            RangeLeaf::ArmourArmour => &mut filters.armour_filters().armour,
            RangeLeaf::ArmourEvasion => &mut filters.armour_filters().evasion,
            RangeLeaf::ArmourEnergyShield => &mut filters.armour_filters().energy_shield,
            RangeLeaf::ArmourBlock => &mut filters.armour_filters().block,
            RangeLeaf::WeaponPhysicalDps => &mut filters.weapon_filters().physical_dps,
            RangeLeaf::WeaponElementalDps => &mut filters.weapon_filters().elemental_dps,
            RangeLeaf::WeaponDps => &mut filters.weapon_filters().damage_per_second,
            RangeLeaf::WeaponAttacksPerSecond => &mut filters.weapon_filters().attacks_per_second,
            RangeLeaf::WeaponCriticalStrikeChance => &mut filters.weapon_filters().critical_strike_chance,
            RangeLeaf::MapItemQuantity => &mut filters.map_filters().item_quantity,
            RangeLeaf::MapItemRarity => &mut filters.map_filters().item_rarity,
            RangeLeaf::MapMonsterPackSize => &mut filters.map_filters().monster_pack_size,
            RangeLeaf::MapTier => &mut filters.map_filters().map_tier,
            RangeLeaf::MiscQuality => &mut filters.misc_filters().quality,
            RangeLeaf::MiscGemLevel => &mut filters.misc_filters().gem_level,
            RangeLeaf::MiscItemLevel => &mut filters.misc_filters().item_level,
            RangeLeaf::MiscScourged => &mut filters.misc_filters().scourged,
        }
    }
}

const TRI_STATE_UNSET: &str = "any";

fn option_value(filter: &PropertyFilter) -> Option<SearchFilterOption> {
    // The corrupted checkbox is tri-state, a disabled one still goes out as "any".
    if filter.kind == PropertyFilterType::MiscCorrupted && !filter.enabled {
        return Some(SearchFilterOption::new(TRI_STATE_UNSET));
    }

    match &filter.value {
        FilterValue::Text(text) if !text.is_empty() => Some(SearchFilterOption::new(text.clone())),
        FilterValue::Flag(Some(checked)) => Some(SearchFilterOption::new(checked.to_string())),
        FilterValue::Flag(None) => Some(SearchFilterOption::new(TRI_STATE_UNSET)),
        _ => None,
    }
}

fn range_value(filter: &PropertyFilter) -> Option<SearchFilterValue> {
    match filter.value {
        FilterValue::Range { min, max } => Some(SearchFilterValue { min, max }),
        _ => None,
    }
}

/// Writes one property filter into its leaf. Returns whether anything changed.
pub fn apply_property_filter(filters: &mut SearchFilters, filter: &PropertyFilter) -> bool {
    if !filter.enabled && filter.kind != PropertyFilterType::MiscCorrupted {
        return false;
    }

    match FilterLeaf::for_filter(filter.kind) {
        FilterLeaf::Exact(leaf) => {
            let Some(value) = option_value(filter) else {
                debug!(?filter, "Property filter carries no option value, skipping");
                return false;
            };
            *leaf.slot(filters) = Some(value);
        }
        FilterLeaf::Range(leaf) => {
            let Some(value) = range_value(filter) else {
                debug!(?filter, "Property filter carries no range, skipping");
                return false;
            };
            *leaf.slot(filters) = Some(value);
        }
    }
    true
}

/// Trade category of an item class. `None` means the class has no category
/// on the trade site yet and the item is matched by its type instead.
pub fn class_category(class: ItemClass) -> Option<&'static str> {
    match class {
        ItemClass::AbyssJewel => Some("jewel.abyss"),
        ItemClass::ActiveSkillGems => Some("gem.activegem"),
        ItemClass::Amulet => Some("accessory.amulet"),
        ItemClass::Belt => Some("accessory.belt"),
        ItemClass::Blueprint => Some("heistmission.blueprint"),
        ItemClass::BodyArmours => Some("armour.chest"),
        ItemClass::Boots => Some("armour.boots"),
        ItemClass::Bows => Some("weapon.bow"),
        ItemClass::Claws => Some("weapon.claw"),
        ItemClass::Contract => Some("heistmission.contract"),
        ItemClass::Daggers => Some("weapon.dagger"),
        ItemClass::DelveStackableSocketableCurrency => Some("currency.resonator"),
        ItemClass::DivinationCard => Some("card"),
        ItemClass::Gloves => Some("armour.gloves"),
        ItemClass::HeistBrooch => Some("heistequipment.heistreward"),
        ItemClass::HeistCloak => Some("heistequipment.heistutility"),
        ItemClass::HeistGear => Some("heistequipment.heistweapon"),
        ItemClass::HeistTarget => Some("currency.heistobjective"),
        ItemClass::HeistTool => Some("heistequipment.heisttool"),
        ItemClass::Helmets => Some("armour.helmet"),
        ItemClass::HybridFlasks => Some("flask"),
        ItemClass::Jewel => Some("jewel.base"),
        ItemClass::LifeFlasks => Some("flask"),
        ItemClass::Logbooks => Some("logbook"),
        ItemClass::ManaFlasks => Some("flask"),
        ItemClass::MapFragments => Some("map.fragment"),
        ItemClass::Maps => Some("map"),
        ItemClass::MetamorphSample => Some("monster.sample"),
        ItemClass::OneHandAxes => Some("weapon.oneaxe"),
        ItemClass::OneHandMaces => Some("weapon.onemace"),
        ItemClass::OneHandSwords => Some("weapon.onesword"),
        ItemClass::Quivers => Some("armour.quiver"),
        ItemClass::Ring => Some("accessory.ring"),
        ItemClass::RuneDaggers => Some("weapon.runedagger"),
        ItemClass::Sceptres => Some("weapon.sceptre"),
        ItemClass::Sentinel => Some("sentinel"),
        ItemClass::Shields => Some("armour.shield"),
        ItemClass::Staves => Some("weapon.staff"),
        ItemClass::SupportSkillGems => Some("gem.supportgem"),
        ItemClass::Trinkets => Some("accessory.trinket"),
        ItemClass::TwoHandAxes => Some("weapon.twoaxe"),
        ItemClass::TwoHandMaces => Some("weapon.twomace"),
        ItemClass::TwoHandSwords => Some("weapon.twosword"),
        ItemClass::UtilityFlasks => Some("flask"),
        ItemClass::Wands => Some("weapon.wand"),
        ItemClass::Warstaves => Some("weapon.warstaff"),
        // Not supported by the trade site yet.
        ItemClass::Undefined
        | ItemClass::CriticalUtilityFlasks
        | ItemClass::MapInvitations
        | ItemClass::MapScarabs
        | ItemClass::MiscMapItems
        | ItemClass::StackableCurrency
        | ItemClass::ThrustingOneHandSwords => None,
    }
}

/// Applies the class selector and every grouped property filter to a query.
pub fn apply_property_filters(query: &mut TradeQuery, property_filters: &PropertyFilters) {
    if let Some(class) = property_filters.class {
        match class_category(class) {
            Some(category) => {
                query.filters.type_filters().category = Some(SearchFilterOption::new(category));
                query.r#type = None;
            }
            None => debug!(?class, "Item class has no trade category, matching by type"),
        }
    }

    for filter in property_filters.all() {
        apply_property_filter(&mut query.filters, filter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::requests::{SearchRequest, TradeStatus};
    use strum::IntoEnumIterator;

    fn sample_filter(kind: PropertyFilterType) -> PropertyFilter {
        if FilterLeaf::for_filter(kind).is_option() {
            match kind {
                PropertyFilterType::Category => PropertyFilter::text(kind, "weapon.bow"),
                _ => PropertyFilter::flag(kind, Some(true)),
            }
        } else {
            PropertyFilter::range(kind, Some(1.0), Some(10.0))
        }
    }

    fn written_leaves(filters: &SearchFilters) -> usize {
        let json = serde_json::to_value(filters).unwrap();
        json.as_object()
            .map(|groups| {
                groups
                    .values()
                    .map(|group| group["filters"].as_object().map(|leaves| leaves.len()).unwrap_or(0))
                    .sum()
            })
            .unwrap_or(0)
    }

    #[test]
    fn test_every_enabled_filter_writes_exactly_one_leaf() {
        for kind in PropertyFilterType::iter() {
            let mut filters = SearchFilters::default();
            assert!(apply_property_filter(&mut filters, &sample_filter(kind)), "{:?}", kind);
            assert_eq!(written_leaves(&filters), 1, "{:?}", kind);
        }
    }

    #[test]
    fn test_disabled_filters_do_not_mutate() {
        for kind in PropertyFilterType::iter() {
            if kind == PropertyFilterType::MiscCorrupted {
                continue;
            }
            let mut filters = SearchFilters::default();
            assert!(!apply_property_filter(&mut filters, &sample_filter(kind).disabled()));
            assert_eq!(filters, SearchFilters::default(), "{:?}", kind);
        }
    }

    #[test]
    fn test_disabled_corrupted_filter_is_still_sent() {
        let mut filters = SearchFilters::default();
        let corrupted = PropertyFilter::flag(PropertyFilterType::MiscCorrupted, Some(false)).disabled();
        assert!(apply_property_filter(&mut filters, &corrupted));
        assert_eq!(
            filters.misc_filters().corrupted,
            Some(SearchFilterOption::new("any"))
        );
    }

    #[test]
    fn test_corrupted_false_is_distinct_from_unset() {
        let mut filters = SearchFilters::default();
        apply_property_filter(
            &mut filters,
            &PropertyFilter::flag(PropertyFilterType::MiscCorrupted, Some(false)),
        );
        assert_eq!(filters.misc_filters().corrupted, Some(SearchFilterOption::new("false")));
    }

    #[test]
    fn test_mismatched_value_shape_is_ignored() {
        let mut filters = SearchFilters::default();
        let filter = PropertyFilter::flag(PropertyFilterType::ArmourArmour, Some(true));
        assert!(!apply_property_filter(&mut filters, &filter));
        assert_eq!(filters, SearchFilters::default());
    }

    #[test]
    fn test_range_filter_lands_in_armour_group() {
        let mut filters = SearchFilters::default();
        apply_property_filter(
            &mut filters,
            &PropertyFilter::range(PropertyFilterType::ArmourEnergyShield, Some(300.0), None),
        );
        let json = serde_json::to_value(&filters).unwrap();
        assert_eq!(json["armour_filters"]["filters"]["es"]["min"], 300.0);
        assert!(json["armour_filters"]["filters"]["es"].get("max").is_none());
        assert!(json.get("weapon_filters").is_none());
    }

    #[test]
    fn test_mapped_class_replaces_type_match() {
        let mut request = SearchRequest::new(TradeStatus::Online);
        request.query.r#type = Some("Imperial Bow".to_string());
        let property_filters = PropertyFilters {
            class: Some(ItemClass::Bows),
            ..Default::default()
        };
        apply_property_filters(&mut request.query, &property_filters);
        assert_eq!(request.query.r#type, None);
        assert_eq!(
            request.query.filters.type_filters().category,
            Some(SearchFilterOption::new("weapon.bow"))
        );
    }

    #[test]
    fn test_unmapped_class_falls_back_to_type() {
        let mut request = SearchRequest::new(TradeStatus::Online);
        request.query.r#type = Some("Scarab".to_string());
        let property_filters = PropertyFilters {
            class: Some(ItemClass::MapScarabs),
            ..Default::default()
        };
        apply_property_filters(&mut request.query, &property_filters);
        assert_eq!(request.query.r#type.as_deref(), Some("Scarab"));
        assert_eq!(request.query.filters.type_filters, None);
    }
}
