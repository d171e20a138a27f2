use std::time::Duration;

/// Specifies the backoff strategy for retrying rate-limited requests.
#[derive(Clone, Debug, PartialEq)]
pub enum Backoff {
    /// Uses a fixed delay between retries.
    Fixed(Duration),
    /// Uses an exponential delay between retries.
    /// The delay before retry `n` (1-based) is `base * factor^n`. No jitter is applied.
    Exponential {
        /// The delay unit multiplied by the growth term.
        base: Duration,
        /// The multiplicative factor for each subsequent retry.
        factor: u32,
    },
}

impl Backoff {
    /// Delay to wait before retry number `attempt` (1-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        match self {
            Backoff::Fixed(d) => *d,
            Backoff::Exponential { base, factor } => {
                let growth = factor.saturating_pow(attempt);
                base.saturating_mul(growth)
            }
        }
    }
}

/// Configuration for the rate-limit retry loop.
#[derive(Clone, Debug, PartialEq)]
pub struct RetryConfig {
    /// How many rate-limited responses are retried. The total number of requests in a
    /// sequence without re-authentication is at most `max_retries + 1`.
    pub max_retries: u32,
    /// The backoff strategy to use between retries.
    pub backoff: Backoff,
}

impl Default for RetryConfig {
    /// Three retries at 60s, 120s and 240s.
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: Backoff::Exponential {
                base: Duration::from_secs(30),
                factor: 2,
            },
        }
    }
}
