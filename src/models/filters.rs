use serde::{Deserialize, Serialize};
use strum::EnumIter;

use super::modifier::ModifierLine;

/// Every property the price check window can toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
pub enum PropertyFilterType {
    Category,

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
    MapBlighted,
    MapTier,

    MiscQuality,
    MiscGemLevel,
    MiscItemLevel,
    MiscCorrupted,
    MiscScourged,
    MiscInfluenceCrusader,
    MiscInfluenceElder,
    MiscInfluenceHunter,
    MiscInfluenceRedeemer,
    MiscInfluenceShaper,
    MiscInfluenceWarlord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterValue {
    /// Numeric bounds; either side may be open.
    Range { min: Option<f64>, max: Option<f64> },
    /// `None` is the unset state of a tri-state checkbox.
    Flag(Option<bool>),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyFilter {
    pub kind: PropertyFilterType,
    pub enabled: bool,
    pub value: FilterValue,
}

impl PropertyFilter {
    pub fn range(kind: PropertyFilterType, min: Option<f64>, max: Option<f64>) -> Self {
        Self {
            kind,
            enabled: true,
            value: FilterValue::Range { min, max },
        }
    }

    pub fn flag(kind: PropertyFilterType, checked: Option<bool>) -> Self {
        Self {
            kind,
            enabled: true,
            value: FilterValue::Flag(checked),
        }
    }

    pub fn text(kind: PropertyFilterType, text: impl Into<String>) -> Self {
        Self {
            kind,
            enabled: true,
            value: FilterValue::Text(text.into()),
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// Item classes as the game names them in the `Item Class:` header line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemClass {
    Undefined,
    AbyssJewel,
    ActiveSkillGems,
    Amulet,
    Belt,
    Blueprint,
    BodyArmours,
    Boots,
    Bows,
    Claws,
    Contract,
    CriticalUtilityFlasks,
    Daggers,
    DelveStackableSocketableCurrency,
    DivinationCard,
    Gloves,
    HeistBrooch,
    HeistCloak,
    HeistGear,
    HeistTarget,
    HeistTool,
    Helmets,
    HybridFlasks,
    Jewel,
    LifeFlasks,
    Logbooks,
    ManaFlasks,
    MapFragments,
    MapInvitations,
    MapScarabs,
    Maps,
    MetamorphSample,
    MiscMapItems,
    OneHandAxes,
    OneHandMaces,
    OneHandSwords,
    Quivers,
    Ring,
    RuneDaggers,
    Sceptres,
    Sentinel,
    Shields,
    StackableCurrency,
    Staves,
    SupportSkillGems,
    ThrustingOneHandSwords,
    Trinkets,
    TwoHandAxes,
    TwoHandMaces,
    TwoHandSwords,
    UtilityFlasks,
    Wands,
    Warstaves,
}

/// Property filters grouped the way the price check window shows them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyFilters {
    pub class: Option<ItemClass>,
    pub armour: Vec<PropertyFilter>,
    pub weapon: Vec<PropertyFilter>,
    pub map: Vec<PropertyFilter>,
    pub misc: Vec<PropertyFilter>,
}

impl PropertyFilters {
    pub fn all(&self) -> impl Iterator<Item = &PropertyFilter> {
        self.armour
            .iter()
            .chain(self.weapon.iter())
            .chain(self.map.iter())
            .chain(self.misc.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierFilter {
    pub line: ModifierLine,
    pub enabled: bool,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl ModifierFilter {
    pub fn new(line: ModifierLine) -> Self {
        Self {
            line,
            enabled: true,
            min: None,
            max: None,
        }
    }

    pub fn with_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_filter_kinds_iterate_in_declaration_order() {
        let kinds: Vec<PropertyFilterType> = PropertyFilterType::iter().collect();
        assert_eq!(kinds.len(), 26);
        assert_eq!(kinds.first(), Some(&PropertyFilterType::Category));
        assert_eq!(kinds.last(), Some(&PropertyFilterType::MiscInfluenceWarlord));
        assert!(kinds.contains(&PropertyFilterType::MiscCorrupted));
    }
}
