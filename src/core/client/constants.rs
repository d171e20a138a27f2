//! Centralized constants for default endpoints and UA.

use std::time::Duration;

/// Default desktop UA to avoid trivial bot blocking.
pub(crate) const USER_AGENT: &str = concat!(
    "Mozilla/5.0 (X11; Linux x86_64) ",
    "AppleWebKit/537.36 (KHTML, like Gecko) ",
    "Chrome/122.0.0.0 Safari/537.36"
);

/// Yahoo chart API base (symbol is appended).
pub(crate) const DEFAULT_BASE_CHART: &str = "https://query1.finance.yahoo.com/v8/finance/chart/";

/// A URL that returns a Set-Cookie header for Yahoo domains.
pub(crate) const DEFAULT_COOKIE_URL: &str = "https://fc.yahoo.com/consent";

/// URL to fetch a crumb (requires cookie from `DEFAULT_COOKIE_URL`).
pub(crate) const DEFAULT_CRUMB_URL: &str = "https://query1.finance.yahoo.com/v1/test/getcrumb";

/// How long a freshly authenticated session is trusted once written to the cache.
///
/// Fixed on purpose; per-cookie expiries reported by the browser are not consulted.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(12 * 60 * 60);

/// Corporate-action events requested alongside prices.
pub(crate) const CHART_EVENTS: &str = "div,splits,capitalGains";
