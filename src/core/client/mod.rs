//! Public client surface + builder.
//! Internals are split into `constants` (UA + defaults) and `retry` (backoff policy).

mod constants;
mod retry;

pub use constants::DEFAULT_SESSION_TTL;
pub(crate) use constants::CHART_EVENTS;
pub use retry::{Backoff, RetryConfig};

use crate::auth::{Authenticator, HttpAuthenticator};
use crate::core::YfError;
use crate::core::models::{FetchRequest, PriceBar};
use crate::session::{AuthSession, CredentialStore, SessionManager};
use constants::{DEFAULT_BASE_CHART, DEFAULT_COOKIE_URL, DEFAULT_CRUMB_URL, USER_AGENT};
use reqwest::Client;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use url::Url;

/// Handle to the chart endpoint plus the session state shared by its clones.
///
/// Fetch sequences are serialized: a clone waiting on a fetch blocks until the
/// running one finishes, so there is never more than one request in flight.
#[derive(Debug, Clone)]
pub struct YfClient {
    http: Client,
    base_chart: Url,
    retry: RetryConfig,
    sessions: Arc<Mutex<SessionManager>>,
}

impl YfClient {
    /// Create a new builder.
    pub fn builder() -> YfClientBuilder {
        YfClientBuilder::default()
    }

    /* -------- internal getters used by other modules -------- */

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }
    pub(crate) fn base_chart(&self) -> &Url {
        &self.base_chart
    }
    pub(crate) fn sessions(&self) -> &Mutex<SessionManager> {
        &self.sessions
    }

    /// The client-wide retry policy. Per-request budgets come from [`FetchRequest`].
    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// Runs one complete fetch sequence for `req`.
    ///
    /// # Errors
    ///
    /// Returns the terminal error of the sequence: [`YfError::Auth`],
    /// [`YfError::RateLimited`], [`YfError::Status`]/[`YfError::Http`],
    /// [`YfError::DataProvider`], [`YfError::NoData`] or [`YfError::Data`].
    #[tracing::instrument(skip(self, req), err, fields(symbol = %req.symbol(), interval = %req.interval()))]
    pub async fn fetch_history(&self, req: &FetchRequest) -> Result<Vec<PriceBar>, YfError> {
        crate::history::fetch::run_fetch(self, req).await
    }

    /// Drops the in-memory session so the next fetch goes back through the cache
    /// or the authenticator.
    pub async fn invalidate_session(&self) {
        self.sessions.lock().await.invalidate();
    }

    /// A copy of the active session, if one is loaded.
    pub async fn active_session(&self) -> Option<AuthSession> {
        self.sessions.lock().await.active().cloned()
    }
}

/* ----------------------- Builder ----------------------- */

#[derive(Default)]
pub struct YfClientBuilder {
    user_agent: Option<String>,
    base_chart: Option<Url>,
    cookie_url: Option<Url>,
    crumb_url: Option<Url>,

    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,

    cache_path: Option<PathBuf>,
    use_cache: Option<bool>,
    session_ttl: Option<Duration>,
    headless: Option<bool>,
    retry: Option<RetryConfig>,
    authenticator: Option<Arc<dyn Authenticator>>,
    preauth: Option<AuthSession>,
}

impl YfClientBuilder {
    /// Override the User-Agent.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Override the chart API base (e.g., `https://query1.finance.yahoo.com/v8/finance/chart/`).
    pub fn base_chart(mut self, url: Url) -> Self {
        self.base_chart = Some(url);
        self
    }

    /// Override the cookie bootstrap URL used by the default [`HttpAuthenticator`].
    pub fn cookie_url(mut self, url: Url) -> Self {
        self.cookie_url = Some(url);
        self
    }

    /// Override the crumb URL used by the default [`HttpAuthenticator`].
    pub fn crumb_url(mut self, url: Url) -> Self {
        self.crumb_url = Some(url);
        self
    }

    /// Set a global request timeout (overall). Default: none.
    pub fn timeout(mut self, dur: Duration) -> Self {
        self.timeout = Some(dur);
        self
    }

    /// Set a connect timeout. Default: none.
    pub fn connect_timeout(mut self, dur: Duration) -> Self {
        self.connect_timeout = Some(dur);
        self
    }

    /// Location of the session cache file. If not set, sessions are kept in memory only.
    ///
    /// See [`discover_cache_path`](crate::session::discover_cache_path) for the
    /// conventional project-relative location.
    pub fn cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = Some(path.into());
        self
    }

    /// Whether a cached session may be reused. (Default: `true`)
    pub fn use_cache(mut self, yes: bool) -> Self {
        self.use_cache = Some(yes);
        self
    }

    /// Validity window for newly cached sessions. (Default: 12 hours)
    pub fn session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = Some(ttl);
        self
    }

    /// Ask the authenticator for a headless browser. (Default: `true`)
    pub fn headless(mut self, yes: bool) -> Self {
        self.headless = Some(yes);
        self
    }

    /// Replace the rate-limit retry policy.
    pub fn retry_config(mut self, cfg: RetryConfig) -> Self {
        self.retry = Some(cfg);
        self
    }

    /// Use `auth` to obtain sessions instead of the plain-HTTP handshake.
    pub fn authenticator(mut self, auth: impl Authenticator + 'static) -> Self {
        self.authenticator = Some(Arc::new(auth));
        self
    }

    /// Start with `session` already active, skipping cache and authenticator until
    /// the endpoint rejects it.
    pub fn preauth(mut self, session: AuthSession) -> Self {
        self.preauth = Some(session);
        self
    }

    pub fn build(self) -> Result<YfClient, YfError> {
        let base_chart = self.base_chart.unwrap_or(Url::parse(DEFAULT_BASE_CHART)?);
        let cookie_url = self.cookie_url.unwrap_or(Url::parse(DEFAULT_COOKIE_URL)?);
        let crumb_url = self.crumb_url.unwrap_or(Url::parse(DEFAULT_CRUMB_URL)?);

        // No cookie store: session cookies are attached explicitly per request.
        let mut httpb =
            reqwest::Client::builder().user_agent(self.user_agent.as_deref().unwrap_or(USER_AGENT));

        if let Some(t) = self.timeout {
            httpb = httpb.timeout(t);
        }
        if let Some(ct) = self.connect_timeout {
            httpb = httpb.connect_timeout(ct);
        }

        let http = httpb.build()?;

        let authenticator = self.authenticator.unwrap_or_else(|| {
            Arc::new(HttpAuthenticator::new(http.clone(), cookie_url, crumb_url))
        });

        let mut sessions = SessionManager::new(authenticator)
            .use_cache(self.use_cache.unwrap_or(true))
            .headless(self.headless.unwrap_or(true))
            .session_ttl(self.session_ttl.unwrap_or(DEFAULT_SESSION_TTL));
        if let Some(path) = self.cache_path {
            sessions = sessions.with_store(CredentialStore::new(path));
        }
        if let Some(session) = self.preauth {
            sessions.adopt(session);
        }

        Ok(YfClient {
            http,
            base_chart,
            retry: self.retry.unwrap_or_default(),
            sessions: Arc::new(Mutex::new(sessions)),
        })
    }
}
