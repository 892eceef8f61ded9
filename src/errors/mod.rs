use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum TradeError {
    #[error("API Error: {status} {body}")]
    Api { status: StatusCode, body: String },
    #[error("{message} {hint}")]
    UnsupportedAuthentication { message: String, hint: String },
    #[error("Parse Error: {0}")]
    Parse(String),
    #[error("Invalid socket colour: {0}")]
    InvalidSocket(String),
    #[error("Validation Error: {0}")]
    Validation(String),
    #[error("Network Error: {0}")]
    Network(String),
    #[error("Configuration Error: {0}")]
    Config(String),
    #[error("operation cancelled")]
    Cancelled,
}

impl TradeError {
    pub fn unsupported_authentication() -> Self {
        TradeError::UnsupportedAuthentication {
            message: "The trade website requires authentication, which is not supported.".to_string(),
            hint: "Try using a different game language and/or force to search using English only in the settings.".to_string(),
        }
    }

    /// Errors the caller has to see. Everything else is turned into an empty
    /// result at the service boundary.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            TradeError::UnsupportedAuthentication { .. } | TradeError::Cancelled
        )
    }
}

impl From<reqwest::Error> for TradeError {
    fn from(err: reqwest::Error) -> Self {
        TradeError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for TradeError {
    fn from(err: serde_json::Error) -> Self {
        TradeError::Parse(err.to_string())
    }
}

impl From<base64::DecodeError> for TradeError {
    fn from(err: base64::DecodeError) -> Self {
        TradeError::Parse(format!("invalid base64 item text: {}", err))
    }
}

impl From<std::string::FromUtf8Error> for TradeError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        TradeError::Parse(format!("item text is not utf-8: {}", err))
    }
}

impl From<url::ParseError> for TradeError {
    fn from(err: url::ParseError) -> Self {
        TradeError::Config(err.to_string())
    }
}

impl From<std::io::Error> for TradeError {
    fn from(err: std::io::Error) -> Self {
        TradeError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TradeError>;
