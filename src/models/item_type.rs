use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ItemCategory {
    #[default]
    Unknown,
    Accessory,
    Armour,
    Weapon,
    Jewel,
    Flask,
    Gem,
    Currency,
    DivinationCard,
    Map,
    Contract,
    HeistEquipment,
    Logbook,
    Sentinel,
    ItemisedMonster,
}

/// Rarity as written in the item header and in the trade API `rarity` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ItemRarity {
    Normal,
    Magic,
    Rare,
    Unique,
    Currency,
    Gem,
    #[serde(rename = "Divination Card")]
    DivinationCard,
    #[default]
    #[serde(other)]
    Unknown,
}
