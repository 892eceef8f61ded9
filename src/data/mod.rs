pub mod trade_data;

pub use trade_data::{
    load_stat_provider,
    load_static_items,
    parse_stat_definitions,
    StaticEntry,
    StaticItemIndex,
};
