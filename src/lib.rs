pub mod config;
pub mod data;
pub mod errors;
pub mod fetcher;
pub mod models;
pub mod reconciler;

pub use config::{GameLanguage, TradeSettings};
pub use errors::{Result, TradeError};
pub use fetcher::{ChallengeService, PoeTradeHandler, ReqwestSender, TradeApiClient};
