//! Session cookies and the hand-off of anti-bot challenges to whoever can
//! show them to the player.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::header::{HeaderValue, COOKIE};
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use url::Url;

use crate::errors::{Result, TradeError};

use super::handler::{ChallengeProvider, TradeRequest};

type CookieJar = Arc<Mutex<BTreeMap<String, String>>>;

/// A challenge waiting for the player. Resolve it with [`completed`] or
/// [`failed`]; dropping it counts as a failure.
///
/// [`completed`]: PendingChallenge::completed
/// [`failed`]: PendingChallenge::failed
#[derive(Debug)]
pub struct PendingChallenge {
    pub uri: Url,
    responder: oneshot::Sender<bool>,
    cookies: CookieJar,
}

impl PendingChallenge {
    pub fn completed(self, cookies: HashMap<String, String>) {
        info!(count = cookies.len(), "Challenge completed, storing cookies");
        {
            let mut jar = self.cookies.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            jar.extend(cookies);
        }
        let _ = self.responder.send(true);
    }

    pub fn failed(self) {
        info!("Challenge failed or was closed");
        let _ = self.responder.send(false);
    }
}

#[derive(Clone)]
pub struct ChallengeService {
    cookies: CookieJar,
    challenges: Option<mpsc::Sender<PendingChallenge>>,
}

impl ChallengeService {
    /// Returns the service and the receiving end the UI listens on.
    pub fn new(buffer: usize) -> (Self, mpsc::Receiver<PendingChallenge>) {
        let (sender, receiver) = mpsc::channel(buffer);
        let service = Self {
            cookies: Arc::default(),
            challenges: Some(sender),
        };
        (service, receiver)
    }

    /// A service without a UI. Every challenge fails right away.
    pub fn detached() -> Self {
        Self {
            cookies: Arc::default(),
            challenges: None,
        }
    }

    pub fn set_cookies(&self, cookies: HashMap<String, String>) {
        let mut jar = self.cookies.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        jar.extend(cookies);
    }

    pub fn cookie_header(&self) -> Option<String> {
        let jar = self.cookies.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if jar.is_empty() {
            return None;
        }

        Some(
            jar.iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

#[async_trait]
impl ChallengeProvider for ChallengeService {
    async fn add_cookie_to_request(&self, request: &mut TradeRequest) {
        let Some(cookie) = self.cookie_header() else {
            return;
        };

        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                request.headers.insert(COOKIE, value);
            }
            Err(e) => warn!(error = %e, "Stored cookies are not a valid header value"),
        }
    }

    async fn start_captcha_challenge(&self, uri: &Url, cancel: &CancellationToken) -> Result<bool> {
        let Some(challenges) = &self.challenges else {
            warn!("No challenge surface available, failing the challenge");
            return Ok(false);
        };

        let (responder, answer) = oneshot::channel();
        let pending = PendingChallenge {
            uri: uri.clone(),
            responder,
            cookies: self.cookies.clone(),
        };

        let delivered = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(TradeError::Cancelled),
            delivered = challenges.send(pending) => delivered,
        };
        if delivered.is_err() {
            warn!("Challenge surface is gone, failing the challenge");
            return Ok(false);
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(TradeError::Cancelled),
            answer = answer => Ok(answer.unwrap_or(false)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri() -> Url {
        Url::parse("https://www.pathofexile.com/api/trade/search/Standard").unwrap()
    }

    #[tokio::test]
    async fn test_cancellation_while_queue_is_full() {
        let (service, _receiver) = ChallengeService::new(1);
        let (responder, _answer) = oneshot::channel();
        let waiting = PendingChallenge {
            uri: uri(),
            responder,
            cookies: service.cookies.clone(),
        };
        service.challenges.as_ref().unwrap().try_send(waiting).unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();
        let outcome = tokio::time::timeout(
            std::time::Duration::from_millis(500),
            service.start_captcha_challenge(&uri(), &cancel),
        )
        .await
        .expect("challenge did not return after cancellation");
        assert!(matches!(outcome, Err(TradeError::Cancelled)));
    }

    #[tokio::test]
    async fn test_completed_challenge_stores_cookies() {
        let (service, mut receiver) = ChallengeService::new(1);
        tokio::spawn(async move {
            if let Some(pending) = receiver.recv().await {
                pending.completed(HashMap::from([("cf_clearance".to_string(), "abc".to_string())]));
            }
        });

        let solved = service
            .start_captcha_challenge(&uri(), &CancellationToken::new())
            .await
            .unwrap();
        assert!(solved);

        let mut request = TradeRequest::get(uri());
        service.add_cookie_to_request(&mut request).await;
        assert_eq!(request.headers[COOKIE], "cf_clearance=abc");
    }

    #[tokio::test]
    async fn test_failed_and_dropped_challenges_resolve_false() {
        let (service, mut receiver) = ChallengeService::new(1);
        tokio::spawn(async move {
            if let Some(pending) = receiver.recv().await {
                pending.failed();
            }
            // The second challenge is dropped unanswered.
            let _ = receiver.recv().await;
        });

        let cancel = CancellationToken::new();
        assert!(!service.start_captcha_challenge(&uri(), &cancel).await.unwrap());
        assert!(!service.start_captcha_challenge(&uri(), &cancel).await.unwrap());
    }

    #[tokio::test]
    async fn test_detached_service_fails_immediately() {
        let service = ChallengeService::detached();
        let solved = service
            .start_captcha_challenge(&uri(), &CancellationToken::new())
            .await
            .unwrap();
        assert!(!solved);

        let mut request = TradeRequest::get(uri());
        service.add_cookie_to_request(&mut request).await;
        assert!(request.headers.get(COOKIE).is_none());
    }

    #[tokio::test]
    async fn test_cancellation_unwinds_pending_challenge() {
        let (service, mut receiver) = ChallengeService::new(1);
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            let pending = receiver.recv().await;
            trigger.cancel();
            // Keep the challenge open until the waiter has unwound.
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            drop(pending);
        });

        let error = service.start_captcha_challenge(&uri(), &cancel).await.unwrap_err();
        assert!(matches!(error, TradeError::Cancelled));
    }

    #[test]
    fn test_cookie_header_is_sorted() {
        let service = ChallengeService::detached();
        service.set_cookies(HashMap::from([
            ("b".to_string(), "2".to_string()),
            ("a".to_string(), "1".to_string()),
        ]));
        assert_eq!(service.cookie_header().as_deref(), Some("a=1; b=2"));
    }
}
