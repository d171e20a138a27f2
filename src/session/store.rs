//! Durable single-record cache for an [`AuthSession`].
//!
//! Every failure here is recoverable: a missing, unreadable, malformed or expired
//! record is a cache miss, and the worst outcome is one extra re-authentication.
//! There is no cross-process locking; two processes racing on the same file may
//! overwrite each other's session.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::YfError;
use crate::session::model::{AuthSession, Cookie};

/// File name of the cache record inside the resolved project directory.
pub const CACHE_FILE_NAME: &str = ".yfinance_session.json";

/// Files or directories whose presence marks a project root.
const PROJECT_MARKERS: [&str; 4] = ["Cargo.toml", ".git", "pyproject.toml", "setup.py"];

/// Resolves the default cache location: the nearest ancestor of `start` (inclusive)
/// holding a project marker, or `start` itself when none is found.
///
/// Meant to be called once by the embedding application; the result is handed to
/// [`YfClientBuilder::cache_path`](crate::YfClientBuilder::cache_path).
pub fn discover_cache_path(start: &Path) -> PathBuf {
    let root = start
        .ancestors()
        .find(|dir| PROJECT_MARKERS.iter().any(|m| dir.join(m).exists()))
        .unwrap_or(start);
    root.join(CACHE_FILE_NAME)
}

/// On-disk form of a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedSessionRecord {
    pub crumb: String,
    #[serde(default)]
    pub cookies: Vec<Cookie>,
    /// When the record was written.
    #[serde(deserialize_with = "de_iso8601")]
    pub timestamp: DateTime<Utc>,
    #[serde(deserialize_with = "de_iso8601")]
    pub expires_at: DateTime<Utc>,
}

impl CachedSessionRecord {
    fn into_session(self) -> Result<AuthSession, YfError> {
        AuthSession::new(self.crumb, self.cookies, self.timestamp, self.expires_at)
    }
}

/// Accepts RFC 3339 timestamps and offset-less ISO 8601 ones; the latter are read as UTC.
fn de_iso8601<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    if let Ok(dt) = DateTime::parse_from_rfc3339(&s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&s, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|n| n.and_utc())
        .map_err(|e| serde::de::Error::custom(format!("invalid timestamp '{s}': {e}")))
}

/// Persists exactly one session record at a fixed path.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `session` with an expiry of `now + valid_for`, replacing any previous record.
    ///
    /// The record is written to a sibling temp file and renamed into place, so readers
    /// never observe a half-written file.
    ///
    /// # Errors
    ///
    /// Returns [`YfError::Cache`] if the record cannot be serialized or written. Callers
    /// inside this crate log it and carry on.
    pub fn save(&self, session: &AuthSession, valid_for: Duration) -> Result<(), YfError> {
        let now = Utc::now();
        let valid_for = chrono::Duration::from_std(valid_for)
            .map_err(|e| YfError::Cache(format!("validity window out of range: {e}")))?;
        let record = CachedSessionRecord {
            crumb: session.crumb().to_string(),
            cookies: session.cookies().to_vec(),
            timestamp: now,
            expires_at: now + valid_for,
        };
        let json = serde_json::to_string_pretty(&record)
            .map_err(|e| YfError::Cache(format!("serialize session: {e}")))?;

        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir)
                .map_err(|e| YfError::Cache(format!("create {}: {e}", dir.display())))?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, json)
            .map_err(|e| YfError::Cache(format!("write {}: {e}", tmp.display())))?;
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(YfError::Cache(format!(
                "replace {}: {e}",
                self.path.display()
            )));
        }

        tracing::debug!(path = %self.path.display(), expires_at = %record.expires_at, "saved session");
        Ok(())
    }

    /// Returns the cached session if present, well-formed and unexpired.
    ///
    /// An expired record is deleted as a side effect. Read and parse failures are
    /// logged at debug level and reported as `None`.
    pub fn try_load(&self) -> Option<AuthSession> {
        let record = self.read_record()?;
        if Utc::now() >= record.expires_at {
            tracing::debug!(path = %self.path.display(), expires_at = %record.expires_at, "cached session expired");
            if let Err(e) = self.delete() {
                tracing::warn!(error = %e, "failed to remove expired session cache");
            }
            return None;
        }
        match record.into_session() {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::debug!(error = %e, "ignoring unusable cached session");
                None
            }
        }
    }

    /// Removes the record. Missing files are not an error.
    ///
    /// # Errors
    ///
    /// Returns [`YfError::Cache`] when the file exists but cannot be removed.
    pub fn delete(&self) -> Result<(), YfError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(YfError::Cache(format!(
                "remove {}: {e}",
                self.path.display()
            ))),
        }
    }

    /// Whether a readable, unexpired record exists. Never modifies the file.
    pub fn is_valid(&self) -> bool {
        self.read_record()
            .is_some_and(|r| Utc::now() < r.expires_at)
    }

    fn read_record(&self) -> Option<CachedSessionRecord> {
        let text = match fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "session cache unreadable");
                return None;
            }
        };
        match serde_json::from_str::<CachedSessionRecord>(&text) {
            Ok(r) => Some(r),
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "session cache malformed");
                None
            }
        }
    }
}
