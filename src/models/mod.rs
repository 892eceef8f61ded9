pub mod filters;
pub mod item;
pub mod item_type;
pub mod modifier;
pub mod poe_item;
pub mod trade_item;

pub use item::{
    Influences,
    Item,
    ItemMetadata,
    ItemProperties,
    OriginalItem,
    Socket,
    SocketColour,
};

pub use item_type::{
    ItemCategory,
    ItemRarity,
};

pub use filters::{
    FilterValue,
    ItemClass,
    ModifierFilter,
    PropertyFilter,
    PropertyFilterType,
    PropertyFilters,
};

pub use modifier::{
    Modifier,
    ModifierCategory,
    ModifierLine,
};

pub use poe_item::{
    ApiError,
    FetchResponse,
    ItemResponse,
    TradeSearchResult,
};

pub use trade_item::{
    LineContent,
    LineContentType,
    LineContentValue,
    TradeItem,
    TradePrice,
};
