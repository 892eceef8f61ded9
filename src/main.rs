use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use poe_trade_search::config::{GameLanguage, TradeSettings};
use poe_trade_search::data::{load_stat_provider, load_static_items, StaticItemIndex};
use poe_trade_search::errors::{Result, TradeError};
use poe_trade_search::fetcher::{ChallengeService, PoeTradeHandler, ReqwestSender, TradeApiClient};
use poe_trade_search::models::{Item, ItemCategory, ItemMetadata, ItemRarity, TradeItem};
use poe_trade_search::reconciler::{ModifierProvider, StatPatternProvider};

#[derive(Parser)]
#[command(name = "poe-trade-search")]
#[command(about = "Query the Path of Exile trade site for an item")]
struct Args {
    /// League to search, defaults to POE_TRADE_LEAGUE or Standard
    #[arg(long)]
    league: Option<String>,

    /// Game client language code (en, fr, de, pt, ru, es, th, ko, zh)
    #[arg(long)]
    language: Option<String>,

    /// Always search the English trade site
    #[arg(long)]
    invariant: bool,

    /// Item name, for uniques and rares
    #[arg(long)]
    name: Option<String>,

    /// Base type
    #[arg(long = "type")]
    item_type: Option<String>,

    /// Rarity as shown in the item header
    #[arg(long, default_value = "Rare")]
    rarity: String,

    /// Use the bulk exchange instead of the item search
    #[arg(long)]
    bulk: bool,

    /// Number of listings to fetch
    #[arg(long, default_value_t = 10)]
    limit: usize,
}

fn settings_from(args: &Args) -> Result<TradeSettings> {
    let mut settings = TradeSettings::from_env()?;
    if let Some(league) = &args.league {
        settings.league_id = league.clone();
    }
    if let Some(code) = &args.language {
        settings.language = GameLanguage::from_code(code)
            .ok_or_else(|| TradeError::Config(format!("unknown game language: {}", code)))?;
    }
    if args.invariant {
        settings.use_invariant_trade_results = true;
    }
    Ok(settings)
}

fn item_from(args: &Args) -> Result<Item> {
    let rarity: ItemRarity = serde_json::from_value(serde_json::Value::String(args.rarity.clone()))?;
    let category = match rarity {
        ItemRarity::Currency => ItemCategory::Currency,
        ItemRarity::Gem => ItemCategory::Gem,
        ItemRarity::DivinationCard => ItemCategory::DivinationCard,
        _ => ItemCategory::Unknown,
    };

    if args.name.is_none() && args.item_type.is_none() {
        return Err(TradeError::Validation("either --name or --type is required".to_string()));
    }

    Ok(Item::new(ItemMetadata {
        name: args.name.clone(),
        r#type: args.item_type.clone(),
        category,
        rarity,
    }))
}

fn print_listing(item: &TradeItem) {
    let price = if item.price.is_priced() {
        format!("{} {}", item.price.amount, item.price.currency)
    } else {
        "unpriced".to_string()
    };
    println!("{} | {} | {}", item.id, price, item.price.account_name);
    for line in &item.modifier_lines {
        if let Some(text) = &line.text {
            println!("    {}", text);
        }
    }
}

async fn run(args: Args, cancel: CancellationToken) -> Result<()> {
    let settings = settings_from(&args)?;
    let item = item_from(&args)?;
    info!(league = %settings.league_id, language = settings.language.code(), "Starting trade search");

    let handler = PoeTradeHandler::new(
        Arc::new(ReqwestSender::new()?),
        Arc::new(ChallengeService::detached()),
        settings,
    );

    let modifiers: Arc<dyn ModifierProvider> = match load_stat_provider(&handler, &cancel).await {
        Ok(provider) => Arc::new(provider),
        Err(TradeError::Cancelled) => return Err(TradeError::Cancelled),
        Err(e) => {
            warn!(error = %e, "Could not load stat definitions, modifiers will not be matched");
            Arc::new(StatPatternProvider::new(Vec::new())?)
        }
    };
    let static_items = match load_static_items(&handler, &cancel).await {
        Ok(index) => index,
        Err(TradeError::Cancelled) => return Err(TradeError::Cancelled),
        Err(e) => {
            warn!(error = %e, "Could not load static trade data, bulk search is unavailable");
            StaticItemIndex::default()
        }
    };

    let client = TradeApiClient::new(handler, modifiers, static_items);

    let result = if args.bulk {
        client.search_bulk(&item, &cancel).await?
    } else {
        client.search(&item, None, None, &cancel).await?
    };

    let Some(result) = result else {
        println!("No results.");
        return Ok(());
    };
    if let Some(error) = &result.error {
        println!("Trade site rejected the query: {} (code {})", error.message, error.code);
        return Ok(());
    }
    let Some(query_id) = result.id.as_deref() else {
        println!("No results.");
        return Ok(());
    };

    println!("Found {} listings", result.total);
    println!("{}", client.trade_uri(&item, query_id)?);

    let ids: Vec<String> = result.get_result_ids().iter().take(args.limit).cloned().collect();
    match client.fetch_results(query_id, &ids, None, &cancel).await? {
        Some(items) => items.iter().for_each(print_listing),
        None => println!("Could not fetch listings."),
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,reqwest=info,hyper=info".into()))
        .init();

    let args = Args::parse();

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    if let Err(e) = run(args, cancel).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
