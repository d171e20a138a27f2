use thiserror::Error;

/// The primary error type for all fallible operations in this crate.
#[derive(Debug, Error)]
pub enum YfError {
    /// Obtaining a session failed: the authenticator errored, produced an invalid crumb,
    /// or the endpoint rejected a freshly re-authenticated session.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The endpoint kept answering HTTP 429 after the retry budget was spent.
    #[error("rate limited: gave up after {attempts} rate-limited responses")]
    RateLimited {
        /// How many rate-limited responses were observed in the sequence.
        attempts: u32,
    },

    /// A transport-level error occurred during an HTTP request.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server returned an unexpected or unsuccessful HTTP status code.
    #[error("Unexpected response status: {status} at {url}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The URL that returned the error.
        url: String,
    },

    /// The endpoint answered with an explicit error payload.
    #[error("data provider error: {0}")]
    DataProvider(String),

    /// The endpoint answered successfully but the result set was empty.
    #[error("no data returned for {symbol}")]
    NoData {
        /// The ticker that was requested.
        symbol: String,
    },

    /// Reading or writing the credential cache failed.
    ///
    /// Only surfaced by direct [`CredentialStore`](crate::session::CredentialStore) calls;
    /// fetches downgrade it to a warning.
    #[error("credential cache error: {0}")]
    Cache(String),

    /// The data received from the API was in an unexpected format or was missing a required field.
    #[error("Data format unexpected or missing field: {0}")]
    Data(String),

    /// A provided URL could not be parsed.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// An invalid date range was provided for a historical data request (start must be before end).
    #[error("invalid date range: start must be before end")]
    InvalidDates,

    /// The interval token is not one the chart endpoint accepts.
    #[error("invalid interval: {0}")]
    InvalidInterval(String),
}
