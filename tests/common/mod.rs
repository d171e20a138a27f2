#![allow(dead_code)]

use chrono::{Duration, Utc};
use httpmock::MockServer;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::fs;
use url::Url;
use yfinance_session::auth::AuthFuture;
use yfinance_session::{AuthSession, Authenticator, BrowserCredentials, Cookie, YfError};

pub fn setup_server() -> MockServer {
    MockServer::start()
}

pub fn fixture(endpoint: &str, symbol: &str, ext: &str) -> String {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    let filename = format!("{}_{}.{}", endpoint, symbol, ext);
    let path = dir.join(&filename);
    fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read fixture {}: {}", path.display(), e))
}

pub fn chart_base(server: &MockServer) -> Url {
    Url::parse(&format!("{}/v8/finance/chart/", server.base_url())).unwrap()
}

pub fn a3_cookie() -> Cookie {
    Cookie::new("A3", "d=AQABBA", ".yahoo.com", "/")
}

pub fn session_with_crumb(crumb: &str) -> AuthSession {
    let now = Utc::now();
    AuthSession::new(crumb, vec![a3_cookie()], now, now + Duration::hours(12)).unwrap()
}

/// Authenticator double: hands out the configured crumbs in order (repeating the
/// last one) or fails every time, and counts how often it was asked.
#[derive(Clone)]
pub struct StubAuthenticator {
    crumbs: Arc<Vec<String>>,
    error: Option<String>,
    calls: Arc<AtomicUsize>,
    headless_seen: Arc<Mutex<Vec<bool>>>,
}

impl StubAuthenticator {
    pub fn ok(crumb: &str) -> Self {
        Self::sequence(&[crumb])
    }

    pub fn sequence(crumbs: &[&str]) -> Self {
        Self {
            crumbs: Arc::new(crumbs.iter().map(|c| c.to_string()).collect()),
            error: None,
            calls: Arc::new(AtomicUsize::new(0)),
            headless_seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            error: Some(msg.to_string()),
            ..Self::sequence(&[])
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn headless_seen(&self) -> Vec<bool> {
        self.headless_seen.lock().unwrap().clone()
    }
}

impl Authenticator for StubAuthenticator {
    fn authenticate(&self, headless: bool) -> AuthFuture<'_> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        self.headless_seen.lock().unwrap().push(headless);
        Box::pin(async move {
            if let Some(msg) = &self.error {
                return Err(YfError::Auth(msg.clone()));
            }
            let crumb = self
                .crumbs
                .get(n)
                .or_else(|| self.crumbs.last())
                .cloned()
                .unwrap_or_default();
            Ok(BrowserCredentials {
                cookies: vec![a3_cookie()],
                crumb,
            })
        })
    }
}
