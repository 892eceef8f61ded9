use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::{Result, TradeError};

const DEFAULT_LEAGUE: &str = "Standard";

/// Client languages the trade site is localised for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameLanguage {
    English,
    French,
    German,
    Portuguese,
    Russian,
    Spanish,
    Thai,
    Korean,
    TraditionalChinese,
}

impl GameLanguage {
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_lowercase().as_str() {
            "en" => Some(GameLanguage::English),
            "fr" => Some(GameLanguage::French),
            "de" => Some(GameLanguage::German),
            "pt" => Some(GameLanguage::Portuguese),
            "ru" => Some(GameLanguage::Russian),
            "es" => Some(GameLanguage::Spanish),
            "th" => Some(GameLanguage::Thai),
            "ko" => Some(GameLanguage::Korean),
            "zh" | "zh-tw" => Some(GameLanguage::TraditionalChinese),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            GameLanguage::English => "en",
            GameLanguage::French => "fr",
            GameLanguage::German => "de",
            GameLanguage::Portuguese => "pt",
            GameLanguage::Russian => "ru",
            GameLanguage::Spanish => "es",
            GameLanguage::Thai => "th",
            GameLanguage::Korean => "ko",
            GameLanguage::TraditionalChinese => "zh",
        }
    }

    pub fn is_chinese(&self) -> bool {
        matches!(self, GameLanguage::TraditionalChinese)
    }

    fn host(&self) -> &'static str {
        match self {
            GameLanguage::English => "https://www.pathofexile.com/",
            GameLanguage::French => "https://fr.pathofexile.com/",
            GameLanguage::German => "https://de.pathofexile.com/",
            GameLanguage::Portuguese => "https://br.pathofexile.com/",
            GameLanguage::Russian => "https://ru.pathofexile.com/",
            GameLanguage::Spanish => "https://es.pathofexile.com/",
            GameLanguage::Thai => "https://th.pathofexile.com/",
            GameLanguage::Korean => "https://poe.game.daum.net/",
            GameLanguage::TraditionalChinese => "https://web.poe.garena.tw/",
        }
    }

    pub fn trade_api_base_url(&self) -> String {
        format!("{}api/trade/", self.host())
    }

    pub fn trade_search_base_url(&self) -> String {
        format!("{}trade/search/", self.host())
    }

    pub fn trade_exchange_base_url(&self) -> String {
        format!("{}trade/exchange/", self.host())
    }
}

/// Values the surrounding application owns and hands to the trade engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeSettings {
    pub league_id: String,
    pub language: GameLanguage,
    /// Search the English site regardless of the client language.
    pub use_invariant_trade_results: bool,
    /// Overrides every endpoint host. Only used to point the engine at a local server.
    pub api_base_override: Option<String>,
}

impl TradeSettings {
    pub fn new(league_id: impl Into<String>, language: GameLanguage) -> Self {
        Self {
            league_id: league_id.into(),
            language,
            use_invariant_trade_results: false,
            api_base_override: None,
        }
    }

    pub fn with_invariant_results(mut self, enabled: bool) -> Self {
        self.use_invariant_trade_results = enabled;
        self
    }

    pub fn from_env() -> Result<Self> {
        let league_id = std::env::var("POE_TRADE_LEAGUE")
            .unwrap_or_else(|_| DEFAULT_LEAGUE.to_string());

        let language = match std::env::var("POE_TRADE_LANGUAGE") {
            Ok(code) => GameLanguage::from_code(&code)
                .ok_or_else(|| TradeError::Config(format!("unknown game language: {}", code)))?,
            Err(_) => GameLanguage::English,
        };

        let use_invariant_trade_results = match std::env::var("POE_TRADE_INVARIANT") {
            Ok(value) => value.parse::<bool>().map_err(|_| {
                TradeError::Config(format!("POE_TRADE_INVARIANT must be true or false, got {}", value))
            })?,
            Err(_) => false,
        };

        Ok(Self {
            league_id,
            language,
            use_invariant_trade_results,
            api_base_override: std::env::var("POE_TRADE_API_BASE").ok(),
        })
    }

    /// Language whose endpoints are queried.
    pub fn trade_language(&self) -> GameLanguage {
        if self.use_invariant_trade_results {
            GameLanguage::English
        } else {
            self.language
        }
    }

    pub fn api_base_url(&self) -> Result<Url> {
        let mut base = match &self.api_base_override {
            Some(base) => base.clone(),
            None => self.trade_language().trade_api_base_url(),
        };
        // Endpoints are joined relative to the base, which needs a trailing slash.
        if !base.ends_with('/') {
            base.push('/');
        }
        Ok(Url::parse(&base)?)
    }

    pub fn search_site_url(&self) -> Result<Url> {
        Ok(Url::parse(&self.trade_language().trade_search_base_url())?)
    }

    pub fn exchange_site_url(&self) -> Result<Url> {
        Ok(Url::parse(&self.trade_language().trade_exchange_base_url())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_codes() {
        assert_eq!(GameLanguage::from_code("EN"), Some(GameLanguage::English));
        assert_eq!(GameLanguage::from_code("zh-tw"), Some(GameLanguage::TraditionalChinese));
        assert_eq!(GameLanguage::from_code("xx"), None);
        assert!(GameLanguage::TraditionalChinese.is_chinese());
        assert!(!GameLanguage::Korean.is_chinese());
    }

    #[test]
    fn test_invariant_results_use_english_endpoints() {
        let settings = TradeSettings::new("Standard", GameLanguage::German).with_invariant_results(true);
        assert_eq!(
            settings.api_base_url().unwrap().as_str(),
            "https://www.pathofexile.com/api/trade/"
        );

        let settings = TradeSettings::new("Standard", GameLanguage::German);
        assert_eq!(
            settings.api_base_url().unwrap().as_str(),
            "https://de.pathofexile.com/api/trade/"
        );
    }

    #[test]
    fn test_api_base_override_joins_below_its_path() {
        let mut settings = TradeSettings::new("Standard", GameLanguage::English);
        settings.api_base_override = Some("http://127.0.0.1:8080/api/trade".to_string());

        let search = settings.api_base_url().unwrap().join("search/Standard").unwrap();
        assert_eq!(search.as_str(), "http://127.0.0.1:8080/api/trade/search/Standard");
    }
}
