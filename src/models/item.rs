use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::item_type::{ItemCategory, ItemRarity};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemMetadata {
    pub name: Option<String>,
    pub r#type: Option<String>,
    pub category: ItemCategory,
    pub rarity: ItemRarity,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Influences {
    #[serde(default)]
    pub crusader: bool,
    #[serde(default)]
    pub elder: bool,
    #[serde(default)]
    pub hunter: bool,
    #[serde(default)]
    pub redeemer: bool,
    #[serde(default)]
    pub shaper: bool,
    #[serde(default)]
    pub warlord: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemProperties {
    pub item_level: u32,
    pub identified: bool,
    pub corrupted: bool,
    pub scourged: bool,
    pub is_relic: bool,
    pub alternate_quality: bool,
    pub armor: Option<f64>,
    pub evasion: Option<f64>,
    pub energy_shield: Option<f64>,
    pub damage_per_second: Option<f64>,
    pub physical_dps: Option<f64>,
    pub elemental_dps: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SocketColour {
    Red,
    Green,
    Blue,
    White,
    Abyss,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Socket {
    pub group: u32,
    pub colour: SocketColour,
}

/// Text the item was parsed from, kept as the game client printed it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OriginalItem {
    pub name: Option<String>,
    pub r#type: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Item {
    pub metadata: ItemMetadata,
    pub properties: ItemProperties,
    pub influences: Influences,
    pub sockets: Vec<Socket>,
    pub original: OriginalItem,
}

impl Item {
    pub fn new(metadata: ItemMetadata) -> Self {
        Self {
            metadata,
            ..Default::default()
        }
    }

    pub fn with_sockets(mut self, sockets: Vec<Socket>) -> Self {
        self.sockets = sockets;
        self
    }

    pub fn with_original(mut self, original: OriginalItem) -> Self {
        self.original = original;
        self
    }

    /// Size of the largest linked socket group, zero for socketless items.
    pub fn link_count(&self) -> usize {
        link_count(&self.sockets)
    }
}

pub fn link_count(sockets: &[Socket]) -> usize {
    let mut groups: HashMap<u32, usize> = HashMap::new();
    for socket in sockets {
        *groups.entry(socket.group).or_insert(0) += 1;
    }
    groups.into_values().max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sockets(groups: &[u32]) -> Vec<Socket> {
        groups
            .iter()
            .map(|group| Socket {
                group: *group,
                colour: SocketColour::Red,
            })
            .collect()
    }

    #[test]
    fn test_link_count_uses_largest_group() {
        let item = Item::new(ItemMetadata::default())
            .with_sockets(sockets(&[0, 0, 1, 1, 2, 2, 2, 2, 2]));
        assert_eq!(item.link_count(), 5);
    }

    #[test]
    fn test_link_count_without_sockets() {
        let item = Item::new(ItemMetadata::default());
        assert_eq!(item.link_count(), 0);
    }
}
