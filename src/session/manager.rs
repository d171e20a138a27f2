use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::{Authenticator, validate_crumb};
use crate::core::YfError;
use crate::core::client::DEFAULT_SESSION_TTL;
use crate::session::model::AuthSession;
use crate::session::store::CredentialStore;

/// Owns the active session and decides when the (slow) authenticator must run.
///
/// A session loaded from the cache is trusted without a probe request; if the
/// server has already revoked it, the first data request comes back unauthorized
/// and the fetch engine asks for [`SessionManager::reauthenticate`].
pub struct SessionManager {
    authenticator: Arc<dyn Authenticator>,
    store: Option<CredentialStore>,
    use_cache: bool,
    headless: bool,
    session_ttl: Duration,
    active: Option<AuthSession>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("store", &self.store)
            .field("use_cache", &self.use_cache)
            .field("headless", &self.headless)
            .field("session_ttl", &self.session_ttl)
            .field("has_active", &self.active.is_some())
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    pub fn new(authenticator: Arc<dyn Authenticator>) -> Self {
        Self {
            authenticator,
            store: None,
            use_cache: true,
            headless: true,
            session_ttl: DEFAULT_SESSION_TTL,
            active: None,
        }
    }

    /// Persists sessions to (and, when caching is enabled, loads them from) `store`.
    pub fn with_store(mut self, store: CredentialStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Whether a cached session may be adopted. Fresh sessions are still saved.
    pub fn use_cache(mut self, yes: bool) -> Self {
        self.use_cache = yes;
        self
    }

    pub fn headless(mut self, yes: bool) -> Self {
        self.headless = yes;
        self
    }

    /// Validity window written alongside newly authenticated sessions.
    pub fn session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    pub fn store(&self) -> Option<&CredentialStore> {
        self.store.as_ref()
    }

    pub fn active(&self) -> Option<&AuthSession> {
        self.active.as_ref()
    }

    /// Installs `session` as the active one without touching the cache.
    pub fn adopt(&mut self, session: AuthSession) {
        self.active = Some(session);
    }

    /// Returns the active session, loading it from the cache or authenticating if needed.
    ///
    /// # Errors
    ///
    /// Returns [`YfError::Auth`] when the authenticator fails. No retry happens here.
    pub async fn ensure_session(&mut self) -> Result<&AuthSession, YfError> {
        if self.active.is_none() {
            let cached = if self.use_cache {
                self.store.as_ref().and_then(CredentialStore::try_load)
            } else {
                None
            };
            let session = match cached {
                Some(s) => {
                    tracing::debug!(expires_at = %s.expires_at(), "using cached session");
                    s
                }
                None => self.authenticate().await?,
            };
            self.active = Some(session);
        }
        self.active
            .as_ref()
            .ok_or_else(|| YfError::Auth("no active session".into()))
    }

    /// Runs the authenticator unconditionally, bypassing the cache, and replaces both
    /// the active session and the cached record.
    ///
    /// # Errors
    ///
    /// Returns [`YfError::Auth`] when the authenticator fails.
    pub async fn reauthenticate(&mut self) -> Result<&AuthSession, YfError> {
        self.active = None;
        let session = self.authenticate().await?;
        Ok(&*self.active.insert(session))
    }

    /// Drops the active session. The cached record stays on disk.
    pub fn invalidate(&mut self) {
        if self.active.take().is_some() {
            tracing::debug!("active session invalidated");
        }
    }

    async fn authenticate(&self) -> Result<AuthSession, YfError> {
        tracing::info!(headless = self.headless, "authenticating new session");
        let creds = self
            .authenticator
            .authenticate(self.headless)
            .await
            .map_err(|e| match e {
                YfError::Auth(_) => e,
                other => YfError::Auth(other.to_string()),
            })?;
        let crumb = validate_crumb(&creds.crumb)?;

        let now = Utc::now();
        let ttl = chrono::Duration::from_std(self.session_ttl)
            .map_err(|e| YfError::Auth(format!("session ttl out of range: {e}")))?;
        let session = AuthSession::new(crumb, creds.cookies, now, now + ttl)?;

        if let Some(store) = &self.store
            && let Err(e) = store.save(&session, self.session_ttl)
        {
            tracing::warn!(error = %e, "could not cache session; continuing without it");
        }
        Ok(session)
    }
}
