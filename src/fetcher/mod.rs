mod challenge;
pub mod dispatch;
mod handler;
pub mod requests;
mod trade_api;

pub use challenge::{ChallengeService, PendingChallenge};

pub use dispatch::{apply_property_filter, apply_property_filters, class_category, FilterLeaf};

pub use handler::{
    ChallengeProvider,
    HttpSend,
    PoeTradeHandler,
    ReqwestSender,
    TradeRequest,
    TradeResponse,
    MAX_REDIRECT_HOPS,
};

pub use requests::{
    BulkQueryRequest,
    SearchFilters,
    SearchRequest,
    StatFilter,
    StatFilterGroup,
    TradeQuery,
    TradeStatus,
};

pub use trade_api::TradeApiClient;
