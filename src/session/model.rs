use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::YfError;

/// A browser-issued cookie.
///
/// Two cookies are the same cookie when their `(name, domain, path)` triples match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default = "root_path")]
    pub path: String,
    /// `None` for a session cookie without an explicit expiry.
    #[serde(
        default,
        rename = "expires",
        alias = "expiry",
        serialize_with = "ser_opt_unix_seconds",
        deserialize_with = "de_opt_unix_seconds",
        skip_serializing_if = "Option::is_none"
    )]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Cookie {
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        domain: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: domain.into(),
            path: path.into(),
            expires_at: None,
        }
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    fn same_identity(&self, other: &Cookie) -> bool {
        self.name == other.name && self.domain == other.domain && self.path == other.path
    }
}

fn root_path() -> String {
    "/".to_string()
}

#[allow(clippy::ref_option)]
fn ser_opt_unix_seconds<S>(v: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match v {
        Some(dt) => serializer.serialize_i64(dt.timestamp()),
        None => serializer.serialize_none(),
    }
}

/// Browser harnesses report cookie expiry as integer or fractional Unix seconds.
#[allow(clippy::cast_possible_truncation)]
fn de_opt_unix_seconds<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum AnyNumber {
        I64(i64),
        F64(f64),
    }

    // Negative values (`-1` from Playwright and CDP) mark a session cookie.
    let secs = match Option::<AnyNumber>::deserialize(deserializer)? {
        Some(AnyNumber::I64(i)) if i < 0 => return Ok(None),
        Some(AnyNumber::F64(f)) if f < 0.0 => return Ok(None),
        Some(AnyNumber::I64(i)) => i,
        Some(AnyNumber::F64(f)) if f.is_finite() => f.trunc() as i64,
        Some(AnyNumber::F64(f)) => {
            return Err(serde::de::Error::custom(format!(
                "non-finite cookie expiry {f}"
            )));
        }
        None => return Ok(None),
    };
    DateTime::from_timestamp(secs, 0)
        .map(Some)
        .ok_or_else(|| serde::de::Error::custom(format!("cookie expiry out of range: {secs}")))
}

/// Collapses cookies sharing `(name, domain, path)`, keeping the position of the first
/// and the value of the last occurrence.
pub(crate) fn dedup_cookies(cookies: Vec<Cookie>) -> Vec<Cookie> {
    let mut out: Vec<Cookie> = Vec::with_capacity(cookies.len());
    for c in cookies {
        if let Some(existing) = out.iter_mut().find(|e| e.same_identity(&c)) {
            *existing = c;
        } else {
            out.push(c);
        }
    }
    out
}

/// One authenticated browser-derived identity: a crumb plus the cookies it is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    crumb: String,
    cookies: Vec<Cookie>,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl AuthSession {
    /// Builds a session, deduplicating cookies by `(name, domain, path)`.
    ///
    /// # Errors
    ///
    /// Returns [`YfError::Auth`] for an empty crumb or when `expires_at <= issued_at`.
    pub fn new(
        crumb: impl Into<String>,
        cookies: Vec<Cookie>,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<Self, YfError> {
        let crumb = crumb.into();
        if crumb.trim().is_empty() {
            return Err(YfError::Auth("session crumb is empty".into()));
        }
        if expires_at <= issued_at {
            return Err(YfError::Auth(format!(
                "session expires ({expires_at}) before it was issued ({issued_at})"
            )));
        }
        Ok(Self {
            crumb,
            cookies: dedup_cookies(cookies),
            issued_at,
            expires_at,
        })
    }

    pub fn crumb(&self) -> &str {
        &self.crumb
    }

    pub fn cookies(&self) -> &[Cookie] {
        &self.cookies
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// The value of a `Cookie` request header carrying every session cookie, or `None`
    /// when the session holds no cookies.
    pub fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        let header = self
            .cookies
            .iter()
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>()
            .join("; ");
        Some(header)
    }
}
