//! Session acquisition.
//!
//! The rest of the crate only sees the [`Authenticator`] capability: something that,
//! given a headless preference, yields cookies plus a crumb or fails. How it gets
//! them (a real browser, a plain cookie/crumb handshake, a test stub) is its business.

pub mod harness;
pub mod http;

use serde::Deserialize;
use std::future::Future;
use std::pin::Pin;

use crate::core::YfError;
use crate::session::Cookie;

pub use harness::HarnessAuthenticator;
pub use http::HttpAuthenticator;

/// Cookies and crumb captured from one authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BrowserCredentials {
    #[serde(default)]
    pub cookies: Vec<Cookie>,
    pub crumb: String,
}

/// Boxed future returned by [`Authenticator::authenticate`].
pub type AuthFuture<'a> =
    Pin<Box<dyn Future<Output = Result<BrowserCredentials, YfError>> + Send + 'a>>;

/// Produces a fresh authenticated session.
///
/// Implementations must release whatever they acquire (browser processes, temp
/// profiles) on every exit path, including when the returned future is dropped
/// before completion.
pub trait Authenticator: Send + Sync {
    /// Runs one authentication round trip.
    ///
    /// # Errors
    ///
    /// Any failure; the session manager reports it as [`YfError::Auth`].
    fn authenticate(&self, headless: bool) -> AuthFuture<'_>;
}

/// Checks that a crumb looks like a token and not an error page, returning it trimmed.
///
/// # Errors
///
/// Returns [`YfError::Auth`] for an empty body or one containing markup or JSON.
pub fn validate_crumb(raw: &str) -> Result<String, YfError> {
    let crumb = raw.trim();
    if crumb.is_empty() {
        return Err(YfError::Auth("Received empty crumb".into()));
    }
    if crumb.contains('{') || crumb.contains('<') {
        let preview: String = crumb.chars().take(64).collect();
        return Err(YfError::Auth(format!("Received invalid crumb: {preview}")));
    }
    Ok(crumb.to_string())
}
