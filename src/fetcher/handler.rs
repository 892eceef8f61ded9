//! Wraps every call to the trade site: browser headers, session cookie,
//! redirects, and the anti-bot challenge on 403.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, LOCATION, USER_AGENT};
use reqwest::{Client, Method, StatusCode};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use url::Url;

use crate::config::TradeSettings;
use crate::errors::{Result, TradeError};

pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/114.0.0.0 Safari/537.36";
pub const POWERED_BY_HEADER: &str = "X-Powered-By";
pub const POWERED_BY_VALUE: &str = "poe-trade-search";

/// Text the challenge provider puts in the body of its redirect pages.
const CHALLENGE_MARKER: &str = "<center>cloudflare</center>";

/// Upper bound on redirects followed for one request.
pub const MAX_REDIRECT_HOPS: usize = 5;

#[derive(Debug, Clone)]
pub struct TradeRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

impl TradeRequest {
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn post_json(url: Url, body: String) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Self {
            method: Method::POST,
            url,
            headers,
            body: Some(body),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TradeResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TradeResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Redirect target, resolved against the URL that produced this response.
    pub fn location(&self, base: &Url) -> Option<Url> {
        let location = self.headers.get(LOCATION)?.to_str().ok()?;
        base.join(location).ok()
    }
}

/// Sends one HTTP request without any retry or redirect handling.
#[async_trait]
pub trait HttpSend: Send + Sync {
    async fn send(&self, request: &TradeRequest) -> Result<TradeResponse>;
}

/// Session cookie and challenge collaborator. The interactive challenge
/// itself lives outside this crate.
#[async_trait]
pub trait ChallengeProvider: Send + Sync {
    async fn add_cookie_to_request(&self, request: &mut TradeRequest);

    /// Resolves to `true` once the challenge was solved and fresh cookies are stored.
    async fn start_captcha_challenge(&self, uri: &Url, cancel: &CancellationToken) -> Result<bool>;
}

pub struct ReqwestSender {
    client: Client,
}

impl ReqwestSender {
    pub fn new() -> Result<Self> {
        // Redirects are followed by the handler, not by reqwest.
        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpSend for ReqwestSender {
    async fn send(&self, request: &TradeRequest) -> Result<TradeResponse> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;

        Ok(TradeResponse {
            status,
            headers,
            body,
        })
    }
}

/// What the handler does next with a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Evaluation {
    Done,
    FollowRedirect,
    Unauthorized,
    ChallengeRequired,
    Failed,
}

fn evaluate(status: StatusCode) -> Evaluation {
    if status.is_success() {
        return Evaluation::Done;
    }

    match status {
        StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND | StatusCode::TEMPORARY_REDIRECT => {
            Evaluation::FollowRedirect
        }
        StatusCode::UNAUTHORIZED => Evaluation::Unauthorized,
        StatusCode::FORBIDDEN => Evaluation::ChallengeRequired,
        _ => Evaluation::Failed,
    }
}

#[derive(Clone)]
pub struct PoeTradeHandler {
    sender: Arc<dyn HttpSend>,
    challenges: Arc<dyn ChallengeProvider>,
    settings: TradeSettings,
}

impl PoeTradeHandler {
    pub fn new(
        sender: Arc<dyn HttpSend>,
        challenges: Arc<dyn ChallengeProvider>,
        settings: TradeSettings,
    ) -> Self {
        Self {
            sender,
            challenges,
            settings,
        }
    }

    pub fn settings(&self) -> &TradeSettings {
        &self.settings
    }

    /// Chinese clients are bounced to a login page unless English results are forced.
    fn requires_unsupported_authentication(&self) -> bool {
        self.settings.language.is_chinese() && !self.settings.use_invariant_trade_results
    }

    async fn send_once(&self, request: &TradeRequest, cancel: &CancellationToken) -> Result<TradeResponse> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(TradeError::Cancelled),
            response = self.sender.send(request) => response,
        }
    }

    pub async fn send(&self, mut request: TradeRequest, cancel: &CancellationToken) -> Result<TradeResponse> {
        request
            .headers
            .insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        request
            .headers
            .insert(POWERED_BY_HEADER, HeaderValue::from_static(POWERED_BY_VALUE));

        self.challenges.add_cookie_to_request(&mut request).await;
        let mut response = self.send_once(&request, cancel).await?;
        let mut hops = 0;

        loop {
            match evaluate(response.status) {
                Evaluation::Done => return Ok(response),
                Evaluation::FollowRedirect => {
                    if hops > 0
                        && response.body.contains(CHALLENGE_MARKER)
                        && self.requires_unsupported_authentication()
                    {
                        warn!("[PoeTradeHandler] Redirected to a challenge page that requires a login.");
                        return Err(TradeError::unsupported_authentication());
                    }

                    let target = response.location(&request.url);
                    match target {
                        Some(target) if hops < MAX_REDIRECT_HOPS => {
                            info!("[PoeTradeHandler] Redirecting to {}.", target);
                            hops += 1;
                            request.url = target;
                            response = self.send_once(&request, cancel).await?;
                        }
                        _ => {
                            warn!(hops, "[PoeTradeHandler] Received redirect response that cannot be followed.");
                            return Err(self.api_error(&request, response));
                        }
                    }
                }
                Evaluation::Unauthorized => {
                    warn!("[PoeTradeHandler] Received 401, authentication is not supported.");
                    return Err(TradeError::unsupported_authentication());
                }
                Evaluation::ChallengeRequired => {
                    return self.handle_challenge(request, response, cancel).await;
                }
                Evaluation::Failed => return Err(self.api_error(&request, response)),
            }
        }
    }

    async fn handle_challenge(
        &self,
        mut request: TradeRequest,
        response: TradeResponse,
        cancel: &CancellationToken,
    ) -> Result<TradeResponse> {
        info!("[PoeTradeHandler] Received 403 response, attempting to handle the challenge.");

        let solved = self
            .challenges
            .start_captcha_challenge(&request.url, cancel)
            .await?;
        if !solved {
            warn!("[PoeTradeHandler] Failed to complete the challenge.");
            return Ok(response);
        }

        self.challenges.add_cookie_to_request(&mut request).await;
        let retry = self.send_once(&request, cancel).await?;
        if retry.is_success() {
            info!("[PoeTradeHandler] Completed the challenge and retried the request.");
        } else {
            warn!(status = %retry.status, "[PoeTradeHandler] Request still failed after completing the challenge.");
        }

        Ok(retry)
    }

    fn api_error(&self, request: &TradeRequest, response: TradeResponse) -> TradeError {
        warn!(
            status = %response.status,
            body = %response.body,
            uri = %request.url,
            request_body = request.body.as_deref().unwrap_or_default(),
            "[PoeTradeHandler] Query failed."
        );
        TradeError::Api {
            status: response.status,
            body: response.body,
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned responses in order and records what was sent.
    #[derive(Default)]
    pub struct ScriptedSender {
        responses: Mutex<VecDeque<TradeResponse>>,
        pub sent: Mutex<Vec<TradeRequest>>,
    }

    impl ScriptedSender {
        pub fn new(responses: Vec<TradeResponse>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                sent: Mutex::new(Vec::new()),
            })
        }

        pub fn sent_count(&self) -> usize {
            self.sent.lock().unwrap().len()
        }

        pub fn sent(&self, index: usize) -> TradeRequest {
            self.sent.lock().unwrap()[index].clone()
        }
    }

    #[async_trait]
    impl HttpSend for ScriptedSender {
        async fn send(&self, request: &TradeRequest) -> Result<TradeResponse> {
            self.sent.lock().unwrap().push(request.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| TradeError::Network("no scripted response left".to_string()))
        }
    }

    /// Challenge collaborator with a fixed answer.
    pub struct FixedChallenge {
        pub solves: bool,
        pub started: Mutex<usize>,
    }

    impl FixedChallenge {
        pub fn new(solves: bool) -> Arc<Self> {
            Arc::new(Self {
                solves,
                started: Mutex::new(0),
            })
        }

        pub fn started(&self) -> usize {
            *self.started.lock().unwrap()
        }
    }

    #[async_trait]
    impl ChallengeProvider for FixedChallenge {
        async fn add_cookie_to_request(&self, request: &mut TradeRequest) {
            let cookie = if self.started() > 0 { "cf_clearance=fresh" } else { "cf_clearance=stale" };
            request
                .headers
                .insert(reqwest::header::COOKIE, HeaderValue::from_static(cookie));
        }

        async fn start_captcha_challenge(&self, _uri: &Url, _cancel: &CancellationToken) -> Result<bool> {
            *self.started.lock().unwrap() += 1;
            Ok(self.solves)
        }
    }

    pub fn redirect(location: &str, body: &str) -> TradeResponse {
        let mut response = TradeResponse::new(StatusCode::FOUND, body);
        response
            .headers
            .insert(LOCATION, HeaderValue::from_str(location).unwrap());
        response
    }
}
