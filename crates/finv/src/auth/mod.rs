//! Cookie and crumb handshake.
//!
//! The options endpoint only answers requests that carry a session cookie and
//! the matching crumb token. Both are obtained once and cached for the
//! lifetime of the [`AuthSession`]:
//!
//! 1. GET the cookie endpoint; the first `Set-Cookie` header is the cookie.
//! 2. GET the crumb endpoint with that cookie; the first body line is the crumb.
//!
//! Each credential sits behind its own async mutex held across the network
//! call, so concurrent callers wait for the first acquisition instead of
//! starting their own. A failed acquisition leaves the cache empty and the next
//! caller tries again.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderValue, COOKIE, SET_COOKIE};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::FinvConfig;
use crate::errors::FinvError;
use crate::http::headers::session_headers;
use crate::http::{HttpRequest, HttpTransport};

/// Cookie and crumb pair attached to authenticated requests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
    pub cookie: String,
    pub crumb: String,
}

/// Lazily acquired, shared authentication state.
pub struct AuthSession {
    transport: Arc<dyn HttpTransport>,
    cookie_url: String,
    crumb_url: String,
    timeout: Duration,
    cookie: Mutex<Option<String>>,
    crumb: Mutex<Option<String>>,
}

impl AuthSession {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        cookie_url: impl Into<String>,
        crumb_url: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            transport,
            cookie_url: cookie_url.into(),
            crumb_url: crumb_url.into(),
            timeout,
            cookie: Mutex::new(None),
            crumb: Mutex::new(None),
        }
    }

    pub fn from_config(transport: Arc<dyn HttpTransport>, config: &FinvConfig) -> Self {
        Self::new(
            transport,
            config.cookie_url.clone(),
            config.crumb_url.clone(),
            config.timeout,
        )
    }

    /// The session cookie, acquiring it on first use.
    ///
    /// Returns `None` when the acquisition failed; the failure is logged.
    pub async fn cookie(&self) -> Option<String> {
        let mut cached = self.cookie.lock().await;
        if cached.is_none() {
            match self.obtain_cookie().await {
                Ok(cookie) => *cached = Some(cookie),
                Err(e) => warn!("Failed to obtain session cookie: {}", e),
            }
        } else {
            debug!("Using cached session cookie");
        }
        cached.clone()
    }

    /// The crumb token, acquiring the cookie and then the crumb on first use.
    ///
    /// Returns `None` when either acquisition failed; the failure is logged.
    pub async fn crumb(&self) -> Option<String> {
        let mut cached = self.crumb.lock().await;
        if cached.is_none() {
            let cookie = self.cookie().await?;
            match self.obtain_crumb(&cookie).await {
                Ok(crumb) => *cached = Some(crumb),
                Err(e) => warn!("Failed to obtain crumb: {}", e),
            }
        } else {
            debug!("Using cached crumb");
        }
        cached.clone()
    }

    /// Both credentials, or an [`FinvError::Auth`] naming the missing one.
    pub async fn credentials(&self) -> Result<Credentials, FinvError> {
        let crumb = self
            .crumb()
            .await
            .ok_or_else(|| FinvError::Auth("crumb is not available".to_string()))?;
        let cookie = self
            .cookie()
            .await
            .ok_or_else(|| FinvError::Auth("session cookie is not available".to_string()))?;
        Ok(Credentials { cookie, crumb })
    }

    /// Drop both cached credentials so the next call performs a fresh handshake.
    ///
    /// Nothing in the crate calls this; it is for callers that detect a rejected crumb.
    pub async fn invalidate(&self) {
        let mut crumb = self.crumb.lock().await;
        let mut cookie = self.cookie.lock().await;
        *crumb = None;
        *cookie = None;
        info!("Authentication cache cleared");
    }

    async fn obtain_cookie(&self) -> Result<String, FinvError> {
        info!("Obtaining session cookie from {}", self.cookie_url);

        let response = self
            .transport
            .execute(HttpRequest::get(
                &self.cookie_url,
                session_headers(),
                self.timeout,
            ))
            .await?;

        // The cookie endpoint usually answers 404; only the header matters.
        let cookie = response
            .headers
            .get(SET_COOKIE)
            .and_then(|h| h.to_str().ok())
            .map(cookie_pair)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| FinvError::Auth("no Set-Cookie header in response".to_string()))?;

        debug!("Session cookie obtained");
        Ok(cookie)
    }

    async fn obtain_crumb(&self, cookie: &str) -> Result<String, FinvError> {
        info!("Obtaining crumb from {}", self.crumb_url);

        let mut headers = session_headers();
        let value = HeaderValue::from_str(cookie)
            .map_err(|e| FinvError::Auth(format!("cookie is not a valid header: {}", e)))?;
        headers.insert(COOKIE, value);

        let response = self
            .transport
            .execute(HttpRequest::get(&self.crumb_url, headers, self.timeout))
            .await?;

        if response.status != 200 {
            return Err(FinvError::Status {
                status: response.status,
                url: self.crumb_url.clone(),
            });
        }

        let crumb = response.body.lines().next().unwrap_or_default().to_string();
        if crumb.is_empty() {
            return Err(FinvError::Auth("crumb response was empty".to_string()));
        }

        debug!("Crumb obtained");
        Ok(crumb)
    }
}

/// `name=value` part of a `Set-Cookie` header, without its attributes.
fn cookie_pair(header: &str) -> String {
    header
        .split_once(';')
        .map(|(pair, _)| pair)
        .unwrap_or(header)
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpResponse;
    use async_trait::async_trait;
    use reqwest::header::HeaderMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const COOKIE_URL: &str = "https://cookie.test";
    const CRUMB_URL: &str = "https://crumb.test/getcrumb";

    /// Scripted handshake endpoints that count their calls.
    struct MockAuthServer {
        cookie_calls: AtomicUsize,
        crumb_calls: AtomicUsize,
        set_cookies: Vec<&'static str>,
        crumb_status: u16,
        crumb_body: &'static str,
        delay: Duration,
        seen_cookie_header: std::sync::Mutex<Option<String>>,
    }

    impl MockAuthServer {
        fn new() -> Self {
            Self {
                cookie_calls: AtomicUsize::new(0),
                crumb_calls: AtomicUsize::new(0),
                set_cookies: vec!["A3=d=AQABBK; Expires=Fri, 13 Mar 2026 10:00:00 GMT; Domain=.test"],
                crumb_status: 200,
                crumb_body: "AbCdEfGh123\nignored",
                delay: Duration::ZERO,
                seen_cookie_header: std::sync::Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl HttpTransport for MockAuthServer {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, FinvError> {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if request.url == COOKIE_URL {
                self.cookie_calls.fetch_add(1, Ordering::SeqCst);
                let mut headers = HeaderMap::new();
                for c in &self.set_cookies {
                    headers.append(SET_COOKIE, HeaderValue::from_static(*c));
                }
                Ok(HttpResponse {
                    status: 404,
                    headers,
                    body: String::new(),
                })
            } else {
                self.crumb_calls.fetch_add(1, Ordering::SeqCst);
                *self.seen_cookie_header.lock().unwrap() = request
                    .headers
                    .get(COOKIE)
                    .and_then(|h| h.to_str().ok())
                    .map(str::to_string);
                Ok(HttpResponse {
                    status: self.crumb_status,
                    headers: HeaderMap::new(),
                    body: self.crumb_body.to_string(),
                })
            }
        }
    }

    fn session(server: Arc<MockAuthServer>) -> AuthSession {
        AuthSession::new(server, COOKIE_URL, CRUMB_URL, Duration::from_secs(1))
    }

    #[test]
    fn test_cookie_pair_strips_attributes() {
        assert_eq!(cookie_pair("A3=d=xyz; Path=/; Secure"), "A3=d=xyz");
        assert_eq!(cookie_pair("B=1"), "B=1");
    }

    #[tokio::test]
    async fn test_crumb_fetches_cookie_first_and_caches() {
        let server = Arc::new(MockAuthServer::new());
        let session = session(server.clone());

        assert_eq!(session.crumb().await.as_deref(), Some("AbCdEfGh123"));
        assert_eq!(session.crumb().await.as_deref(), Some("AbCdEfGh123"));
        assert_eq!(session.cookie().await.as_deref(), Some("A3=d=AQABBK"));

        assert_eq!(server.cookie_calls.load(Ordering::SeqCst), 1);
        assert_eq!(server.crumb_calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            server.seen_cookie_header.lock().unwrap().as_deref(),
            Some("A3=d=AQABBK")
        );
    }

    #[tokio::test]
    async fn test_first_set_cookie_wins() {
        let mut server = MockAuthServer::new();
        server.set_cookies = vec!["first=1; Path=/", "second=2; Path=/"];
        let session = session(Arc::new(server));

        assert_eq!(session.cookie().await.as_deref(), Some("first=1"));
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_handshake() {
        let mut server = MockAuthServer::new();
        server.delay = Duration::from_millis(20);
        let server = Arc::new(server);
        let session = Arc::new(session(server.clone()));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let session = session.clone();
                tokio::spawn(async move { session.crumb().await })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap().as_deref(), Some("AbCdEfGh123"));
        }

        assert_eq!(server.cookie_calls.load(Ordering::SeqCst), 1);
        assert_eq!(server.crumb_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_cookie_is_retried_on_next_call() {
        let mut server = MockAuthServer::new();
        server.set_cookies = vec![];
        let server = Arc::new(server);
        let session = session(server.clone());

        assert!(session.cookie().await.is_none());
        assert!(session.crumb().await.is_none());
        assert!(session.cookie().await.is_none());

        // Crumb endpoint is never reached without a cookie.
        assert_eq!(server.cookie_calls.load(Ordering::SeqCst), 3);
        assert_eq!(server.crumb_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_crumb_failure_keeps_cookie_and_retries() {
        let mut server = MockAuthServer::new();
        server.crumb_status = 429;
        let server = Arc::new(server);
        let session = session(server.clone());

        assert!(session.crumb().await.is_none());
        assert!(session.crumb().await.is_none());

        assert_eq!(server.cookie_calls.load(Ordering::SeqCst), 1);
        assert_eq!(server.crumb_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_empty_crumb_body_is_not_cached() {
        let mut server = MockAuthServer::new();
        server.crumb_body = "";
        let session = session(Arc::new(server));

        assert!(session.crumb().await.is_none());
        assert!(matches!(
            session.credentials().await,
            Err(FinvError::Auth(_))
        ));
    }

    #[tokio::test]
    async fn test_credentials_and_invalidate() {
        let server = Arc::new(MockAuthServer::new());
        let session = session(server.clone());

        let credentials = session.credentials().await.unwrap();
        assert_eq!(
            credentials,
            Credentials {
                cookie: "A3=d=AQABBK".to_string(),
                crumb: "AbCdEfGh123".to_string(),
            }
        );

        session.invalidate().await;
        session.credentials().await.unwrap();
        assert_eq!(server.cookie_calls.load(Ordering::SeqCst), 2);
        assert_eq!(server.crumb_calls.load(Ordering::SeqCst), 2);
    }
}
