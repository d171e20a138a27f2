use reqwest::StatusCode;
use reqwest::header::COOKIE;
use url::Url;

use crate::core::client::{CHART_EVENTS, RetryConfig};
use crate::core::{FetchRequest, Interval, PriceBar, YfClient, YfError};
use crate::history::decode::decode_chart;
use crate::history::engine::{Event, FetchMachine, Step};
use crate::session::AuthSession;

/// Builds `{base}/{symbol}?period1&period2&interval&includePrePost&events&crumb`.
pub(crate) fn chart_url(base: &Url, req: &FetchRequest, crumb: &str) -> Result<Url, YfError> {
    let mut url = base.join(req.symbol())?;
    let (p1, p2) = req.period();
    url.query_pairs_mut()
        .append_pair("period1", &p1.to_string())
        .append_pair("period2", &p2.to_string())
        .append_pair("interval", req.interval().as_str())
        .append_pair("includePrePost", "false")
        .append_pair("events", CHART_EVENTS)
        .append_pair("crumb", crumb);
    Ok(url)
}

/// Drives a [`FetchMachine`] to completion. Holds the session lock for the whole
/// sequence.
pub(crate) async fn run_fetch(
    client: &YfClient,
    req: &FetchRequest,
) -> Result<Vec<PriceBar>, YfError> {
    if req.interval() == Interval::I30m {
        tracing::warn!("interval 30m is unreliable upstream; prefer 15m");
    }

    let retry = RetryConfig {
        max_retries: req.max_retries(),
        backoff: client.retry_config().backoff.clone(),
    };
    let mut sessions = client.sessions().lock().await;
    let mut machine = FetchMachine::new(sessions.active().is_some(), retry);
    let mut step = machine.start();

    loop {
        step = match step {
            Step::Authenticate { fresh } => {
                let res = if fresh {
                    sessions.reauthenticate().await.map(|_| ())
                } else {
                    sessions.ensure_session().await.map(|_| ())
                };
                match res {
                    Ok(()) => machine.advance(Event::Authenticated),
                    Err(e) => machine.advance(Event::AuthFailed(e)),
                }
            }
            Step::Request => {
                let event = match sessions.active() {
                    Some(session) => request_once(client, req, session).await,
                    None => Event::AuthFailed(YfError::Auth("no active session".into())),
                };
                if let Event::Unauthorized(status) = event {
                    tracing::info!(status, "session rejected; invalidating");
                    sessions.invalidate();
                }
                machine.advance(event)
            }
            Step::Sleep(delay) => {
                tracing::warn!(
                    attempt = machine.attempts(),
                    delay_secs = delay.as_secs_f64(),
                    "rate limited; backing off"
                );
                tokio::time::sleep(delay).await;
                machine.advance(Event::Slept)
            }
            Step::Done(result) => return result,
        };
    }
}

async fn request_once(client: &YfClient, req: &FetchRequest, session: &AuthSession) -> Event {
    let url = match chart_url(client.base_chart(), req, session.crumb()) {
        Ok(u) => u,
        Err(e) => return Event::Failed(e),
    };

    let mut rb = client.http().get(url.clone());
    if let Some(cookie) = session.cookie_header() {
        rb = rb.header(COOKIE, cookie);
    }

    let resp = match rb.send().await {
        Ok(r) => r,
        Err(e) => return Event::Failed(YfError::Http(e)),
    };

    let status = resp.status();
    match status {
        StatusCode::TOO_MANY_REQUESTS => return Event::RateLimited,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            return Event::Unauthorized(status.as_u16());
        }
        s if !s.is_success() => {
            return Event::Failed(YfError::Status {
                status: s.as_u16(),
                url: url.to_string(),
            });
        }
        _ => {}
    }

    let body = match crate::core::net::get_text(resp, "history_chart", req.symbol(), "json").await
    {
        Ok(b) => b,
        Err(e) => return Event::Failed(YfError::Http(e)),
    };

    match decode_chart(&body, req.symbol()) {
        Ok(bars) => Event::Decoded(bars),
        Err(e) => Event::Failed(e),
    }
}
