//! Turns fetched listings back into trade items.

use base64::{engine::general_purpose, Engine};

use crate::errors::{Result, TradeError};
use crate::models::poe_item::{HashData, ItemResponse, ModData, ModInfo, ResultSocket};
use crate::models::{
    FetchResponse, ItemCategory, ItemMetadata, ItemProperties, LineContentType, LineContentValue,
    Modifier, ModifierLine, OriginalItem, Socket, SocketColour, TradeItem, TradePrice,
};

use super::line_content::parse_line_contents;
use super::modifier::ModifierProvider;

/// Colour code of delve resonator sockets, which never count as item sockets.
const RESONATOR_SOCKET: &str = "DV";

type HashList = Vec<Vec<serde_json::Value>>;

pub fn reconcile(response: FetchResponse, provider: &dyn ModifierProvider) -> Result<Vec<TradeItem>> {
    response
        .result
        .into_iter()
        .flatten()
        .map(|result| trade_item(result, provider))
        .collect()
}

fn decode_text(encoded: Option<&str>) -> Result<String> {
    match encoded {
        Some(encoded) => Ok(String::from_utf8(general_purpose::STANDARD.decode(encoded)?)?),
        None => Ok(String::new()),
    }
}

pub fn trade_item(result: ItemResponse, provider: &dyn ModifierProvider) -> Result<TradeItem> {
    let item = &result.item;
    let listing = &result.listing;
    let extended = &item.extended;

    let price = TradePrice {
        account_name: listing.account.name.clone(),
        account_character: listing.account.last_character_name.clone(),
        amount: listing.price.as_ref().and_then(|price| price.amount).unwrap_or(-1.0),
        currency: listing
            .price
            .as_ref()
            .and_then(|price| price.currency.clone())
            .unwrap_or_default(),
        date: listing.indexed,
        whisper: listing.whisper.clone(),
        note: item.note.clone(),
    };

    let original = OriginalItem {
        name: item.name.clone(),
        r#type: item.type_line.clone(),
        text: decode_text(extended.text.as_deref())?,
    };

    let properties = ItemProperties {
        item_level: item.ilvl,
        identified: item.identified,
        corrupted: item.corrupted,
        scourged: item.scourged.as_ref().map(|scourged| scourged.tier != 0).unwrap_or(false),
        is_relic: item.is_relic,
        armor: extended.ar,
        evasion: extended.ev,
        energy_shield: extended.es,
        damage_per_second: extended.dps,
        physical_dps: extended.pdps,
        elemental_dps: extended.edps,
        ..Default::default()
    };

    let empty_mods = ModData::default();
    let empty_hashes = HashData::default();
    let mods = extended.mods.as_ref().unwrap_or(&empty_mods);
    let hashes = extended.hashes.as_ref().unwrap_or(&empty_hashes);

    let implicit_texts = match &item.implicit_mods {
        Some(texts) => texts.clone(),
        None => item
            .logbook_mods
            .iter()
            .flatten()
            .flat_map(|logbook| logbook.mods.iter().cloned())
            .collect(),
    };

    let categories: [(Option<&[String]>, &Option<Vec<ModInfo>>, Vec<LineContentValue>); 6] = [
        (item.enchant_mods.as_deref(), &mods.enchant, parse_hashes(&[&hashes.enchant])),
        (Some(implicit_texts.as_slice()), &mods.implicit, parse_hashes(&[&hashes.implicit])),
        (item.crafted_mods.as_deref(), &mods.crafted, parse_hashes(&[&hashes.crafted])),
        (
            item.explicit_mods.as_deref(),
            &mods.explicit,
            parse_hashes(&[&hashes.explicit, &hashes.monster]),
        ),
        (item.fractured_mods.as_deref(), &mods.fractured, parse_hashes(&[&hashes.fractured])),
        (item.scourge_mods.as_deref(), &mods.scourge, parse_hashes(&[&hashes.scourge])),
    ];

    let mut modifier_lines: Vec<ModifierLine> = categories
        .into_iter()
        .flat_map(|(texts, details, hashes)| parse_mods(provider, texts, details.as_deref(), &hashes))
        .map(|modifier| ModifierLine {
            text: modifier.text.clone(),
            modifier: Some(modifier),
        })
        .collect();

    let pseudo_modifiers = parse_mods(
        provider,
        item.pseudo_mods.as_deref(),
        mods.pseudo.as_deref(),
        &parse_hashes(&[&hashes.pseudo]),
    );

    // Reading order of the original text; lines not found in it go first.
    modifier_lines.sort_by_key(|line| {
        line.text
            .as_deref()
            .and_then(|text| original.text.find(text))
    });

    Ok(TradeItem {
        id: result.id.clone(),
        price,
        metadata: ItemMetadata {
            name: item.name.clone(),
            r#type: item.type_line.clone(),
            category: ItemCategory::Unknown,
            rarity: item.rarity,
        },
        original,
        properties,
        influences: item.influences.clone(),
        image: item.icon.clone(),
        width: item.w,
        height: item.h,
        requirement_contents: parse_line_contents(item.requirements.as_deref(), true),
        property_contents: parse_line_contents(item.properties.as_deref(), true),
        additional_property_contents: parse_line_contents(item.additional_properties.as_deref(), false),
        sockets: parse_sockets(&item.sockets)?,
        modifier_lines,
        pseudo_modifiers,
    })
}

/// Flattens `[hash, [type]]` entries of one or more hash lists.
pub fn parse_hashes(lists: &[&Option<HashList>]) -> Vec<LineContentValue> {
    lists
        .iter()
        .filter_map(|list| list.as_ref())
        .flatten()
        .filter(|entry| entry.len() == 2)
        .filter_map(|entry| {
            let value = entry[0].as_str()?.to_string();
            let r#type = entry[1]
                .as_array()
                .and_then(|types| types.first())
                .and_then(|code| code.as_i64())
                .map(|code| LineContentType::from(code as i32))
                .unwrap_or(LineContentType::Simple);
            Some(LineContentValue { value, r#type })
        })
        .collect()
}

/// Pairs every hash of a category with its text line and tier details.
/// A category without mod details is skipped; missing matches leave fields empty.
fn parse_mods(
    provider: &dyn ModifierProvider,
    texts: Option<&[String]>,
    details: Option<&[ModInfo]>,
    hashes: &[LineContentValue],
) -> Vec<Modifier> {
    let Some(details) = details else {
        return Vec::new();
    };
    let texts = texts.unwrap_or_default();

    hashes
        .iter()
        .map(|hash| {
            let id = &hash.value;
            let text = texts.iter().find(|text| provider.is_match(id, text)).cloned();
            let detail = details.iter().find(|detail| {
                detail
                    .magnitudes
                    .as_ref()
                    .map(|magnitudes| magnitudes.iter().any(|magnitude| &magnitude.hash == id))
                    .unwrap_or(false)
            });

            Modifier {
                id: id.clone(),
                category: provider.modifier_category(id),
                text,
                tier: detail.and_then(|detail| detail.tier.clone()),
                tier_name: detail.and_then(|detail| detail.name.clone()),
            }
        })
        .collect()
}

pub fn parse_sockets(sockets: &[ResultSocket]) -> Result<Vec<Socket>> {
    sockets
        .iter()
        .filter(|socket| socket.colour != RESONATOR_SOCKET)
        .map(|socket| {
            let colour = match socket.colour.as_str() {
                "B" => SocketColour::Blue,
                "G" => SocketColour::Green,
                "R" => SocketColour::Red,
                "W" => SocketColour::White,
                "A" => SocketColour::Abyss,
                other => return Err(TradeError::InvalidSocket(other.to_string())),
            };
            Ok(Socket {
                group: socket.group,
                colour,
            })
        })
        .collect()
}
