//! Cookie & crumb acquisition without a browser.

use chrono::{DateTime, Utc};
use reqwest::Client;
use reqwest::header::COOKIE;
use url::Url;

use super::{AuthFuture, Authenticator, BrowserCredentials, validate_crumb};
use crate::core::YfError;
use crate::session::Cookie;

/// Plain-HTTP handshake: a cookie bootstrap request followed by a crumb request.
///
/// Works whenever the endpoint does not fingerprint the client. `headless` has no
/// meaning here and is ignored.
#[derive(Debug, Clone)]
pub struct HttpAuthenticator {
    http: Client,
    cookie_url: Url,
    crumb_url: Url,
}

impl HttpAuthenticator {
    pub fn new(http: Client, cookie_url: Url, crumb_url: Url) -> Self {
        Self {
            http,
            cookie_url,
            crumb_url,
        }
    }

    async fn fetch_cookies(&self) -> Result<Vec<Cookie>, YfError> {
        let resp = self.http.get(self.cookie_url.clone()).send().await?;
        let default_domain = self.cookie_url.host_str().unwrap_or_default().to_string();
        let now = Utc::now();

        let cookies: Vec<Cookie> = resp
            .cookies()
            .map(|c| {
                let expires_at = c
                    .max_age()
                    .and_then(|age| chrono::Duration::from_std(age).ok())
                    .map(|age| now + age)
                    .or_else(|| c.expires().map(DateTime::<Utc>::from));
                Cookie {
                    name: c.name().to_string(),
                    value: c.value().to_string(),
                    domain: c.domain().unwrap_or(&default_domain).to_string(),
                    path: c.path().unwrap_or("/").to_string(),
                    expires_at,
                }
            })
            .collect();

        if cookies.is_empty() {
            return Err(YfError::Auth(format!(
                "No cookie received from {}",
                self.cookie_url
            )));
        }
        Ok(cookies)
    }

    async fn fetch_crumb(&self, cookies: &[Cookie]) -> Result<String, YfError> {
        let header = cookies
            .iter()
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>()
            .join("; ");

        let resp = self
            .http
            .get(self.crumb_url.clone())
            .header(COOKIE, header)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(YfError::Auth(format!(
                "crumb endpoint answered {} at {}",
                resp.status().as_u16(),
                self.crumb_url
            )));
        }
        let body = resp.text().await?;
        validate_crumb(&body)
    }
}

impl Authenticator for HttpAuthenticator {
    fn authenticate(&self, _headless: bool) -> AuthFuture<'_> {
        Box::pin(async move {
            let cookies = self.fetch_cookies().await?;
            let crumb = self.fetch_crumb(&cookies).await?;
            Ok(BrowserCredentials { cookies, crumb })
        })
    }
}
