//! The retry/re-authentication state machine behind one fetch sequence.
//!
//! [`FetchMachine`] performs no I/O. The driver asks it what to do next
//! ([`Step`]), does it, and reports what happened ([`Event`]). This keeps the
//! bounds (retry budget, at most one re-authentication) checkable without a network
//! or a clock.

use std::time::Duration;

use crate::core::client::RetryConfig;
use crate::core::{PriceBar, YfError};

/// Where a fetch sequence currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    NeedAuth,
    Requesting,
    Backoff,
    Success,
    Failed,
}

/// Work the driver must perform next.
#[derive(Debug)]
pub enum Step {
    /// Obtain a session. `fresh` means the cache must not be consulted.
    Authenticate { fresh: bool },
    /// Issue the data request with the active session.
    Request,
    /// Wait before requesting again.
    Sleep(Duration),
    /// Terminal: the sequence is over.
    Done(Result<Vec<PriceBar>, YfError>),
}

/// Outcome of the work requested by the previous [`Step`].
#[derive(Debug)]
pub enum Event {
    Authenticated,
    AuthFailed(YfError),
    /// HTTP 429.
    RateLimited,
    /// HTTP 401 or 403.
    Unauthorized(u16),
    /// The response decoded into a series.
    Decoded(Vec<PriceBar>),
    /// Anything else that ends the sequence: transport errors, other statuses,
    /// provider/no-data/decode errors.
    Failed(YfError),
    Slept,
}

/// Transition table for one fetch sequence.
#[derive(Debug, Clone)]
pub struct FetchMachine {
    state: FetchState,
    retry: RetryConfig,
    rate_limited: u32,
    reauthenticated: bool,
}

impl FetchMachine {
    /// Starts in `Requesting` when a session is already active, `NeedAuth` otherwise.
    pub fn new(has_session: bool, retry: RetryConfig) -> Self {
        Self {
            state: if has_session {
                FetchState::Requesting
            } else {
                FetchState::NeedAuth
            },
            retry,
            rate_limited: 0,
            reauthenticated: false,
        }
    }

    pub fn state(&self) -> FetchState {
        self.state
    }

    /// Rate-limited responses seen so far.
    pub fn attempts(&self) -> u32 {
        self.rate_limited
    }

    /// The first step of the sequence.
    pub fn start(&self) -> Step {
        match self.state {
            FetchState::NeedAuth => Step::Authenticate { fresh: false },
            _ => Step::Request,
        }
    }

    /// Applies `event` and returns the next step.
    pub fn advance(&mut self, event: Event) -> Step {
        let step = match event {
            Event::Authenticated => {
                self.state = FetchState::Requesting;
                Step::Request
            }
            Event::AuthFailed(e) => self.fail(e),
            Event::RateLimited => {
                self.rate_limited += 1;
                if self.rate_limited > self.retry.max_retries {
                    self.fail(YfError::RateLimited {
                        attempts: self.rate_limited,
                    })
                } else {
                    self.state = FetchState::Backoff;
                    Step::Sleep(self.retry.backoff.delay(self.rate_limited))
                }
            }
            Event::Slept => {
                self.state = FetchState::Requesting;
                Step::Request
            }
            Event::Unauthorized(status) => {
                if self.reauthenticated {
                    self.fail(YfError::Auth(format!(
                        "session rejected with HTTP {status} after re-authentication"
                    )))
                } else {
                    self.reauthenticated = true;
                    self.state = FetchState::NeedAuth;
                    Step::Authenticate { fresh: true }
                }
            }
            Event::Decoded(bars) => {
                self.state = FetchState::Success;
                Step::Done(Ok(bars))
            }
            Event::Failed(e) => self.fail(e),
        };
        tracing::debug!(state = ?self.state, "fetch state");
        step
    }

    fn fail(&mut self, e: YfError) -> Step {
        self.state = FetchState::Failed;
        Step::Done(Err(e))
    }
}
