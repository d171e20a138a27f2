//! yfinance-session: Yahoo Finance chart history behind a browser-derived session.
//!
//! The chart endpoint wants a crumb plus the cookies it was issued with. This crate
//! obtains them through a pluggable [`Authenticator`], keeps them in an on-disk
//! [`CredentialStore`] between runs, and fetches history through a bounded state
//! machine that backs off on HTTP 429 and re-authenticates at most once on 401/403.
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use yfinance_session::{FetchRequest, Interval, YfClient};
//!
//! # async fn run() -> Result<(), yfinance_session::YfError> {
//! let client = YfClient::builder()
//!     .cache_path(".yfinance_session.json")
//!     .build()?;
//! let req = FetchRequest::for_dates(
//!     "AAPL",
//!     NaiveDate::from_ymd_opt(2024, 12, 20).unwrap(),
//!     NaiveDate::from_ymd_opt(2024, 12, 30).unwrap(),
//!     Interval::D1,
//!     3,
//! )?;
//! let bars = client.fetch_history(&req).await?;
//! println!("{} bars", bars.len());
//! # Ok(()) }
//! ```

pub mod auth;
pub mod core;
pub mod history;
pub mod session;

pub use auth::{Authenticator, BrowserCredentials, HarnessAuthenticator, HttpAuthenticator};
pub use crate::core::client::{Backoff, RetryConfig};
pub use crate::core::{FetchRequest, Interval, PriceBar, YfClient, YfClientBuilder, YfError};
pub use history::HistoryBuilder;
pub use session::{AuthSession, Cookie, CredentialStore, SessionManager};
