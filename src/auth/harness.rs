//! Adapter for an external browser-automation program.
//!
//! The harness is any executable that drives a real browser to the site, dismisses
//! consent walls, loads the crumb endpoint and prints one JSON document on stdout:
//!
//! ```json
//! { "crumb": "AbC.dEf", "cookies": [ { "name": "A3", "value": "...", "domain": ".yahoo.com", "path": "/", "expires": 1767225600 } ] }
//! ```
//!
//! A non-zero exit status is an authentication failure.
//!
//! On unix the harness runs in its own process group. When a run ends (timeout,
//! dropped future, or normal exit) the group gets SIGTERM so the harness can close
//! its browser and profile, and SIGKILL once the grace period has passed.

use std::ffi::OsString;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use super::{AuthFuture, Authenticator, BrowserCredentials, validate_crumb};
use crate::core::YfError;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);
const DEFAULT_KILL_GRACE: Duration = Duration::from_secs(5);

/// Runs a browser-automation harness as a child process.
///
/// The harness and everything it launched are terminated when the authentication
/// future is dropped or times out, so an aborted fetch never leaks a browser.
#[derive(Debug, Clone)]
pub struct HarnessAuthenticator {
    program: OsString,
    args: Vec<OsString>,
    headless_flag: Option<OsString>,
    timeout: Duration,
    kill_grace: Duration,
}

impl HarnessAuthenticator {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            headless_flag: Some("--headless".into()),
            timeout: DEFAULT_TIMEOUT,
            kill_grace: DEFAULT_KILL_GRACE,
        }
    }

    /// Appends an argument passed before the headless flag.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// The flag appended when a headless session is requested. `None` never passes one.
    pub fn headless_flag(mut self, flag: Option<OsString>) -> Self {
        self.headless_flag = flag;
        self
    }

    /// Upper bound on one harness run. Default: 120s.
    pub fn timeout(mut self, dur: Duration) -> Self {
        self.timeout = dur;
        self
    }

    /// Time between SIGTERM and SIGKILL when the harness is torn down. Default: 5s.
    pub fn kill_grace(mut self, dur: Duration) -> Self {
        self.kill_grace = dur;
        self
    }

    async fn run(&self, headless: bool) -> Result<BrowserCredentials, YfError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if headless && let Some(flag) = &self.headless_flag {
            cmd.arg(flag);
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        #[cfg(unix)]
        cmd.process_group(0);
        #[cfg(not(unix))]
        cmd.kill_on_drop(true);

        let child = cmd.spawn().map_err(|e| {
            YfError::Auth(format!(
                "failed to start browser harness {}: {e}",
                self.program.to_string_lossy()
            ))
        })?;
        tracing::debug!(program = %self.program.to_string_lossy(), headless, "browser harness started");
        let _group = ProcessGroupGuard::new(child.id(), self.kill_grace);

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                YfError::Auth(format!(
                    "browser harness timed out after {}s",
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| YfError::Auth(format!("browser harness I/O error: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(YfError::Auth(format!(
                "browser harness exited with {}: {}",
                output.status,
                last_line(&stderr)
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_harness_output(&stdout)
    }
}

impl Authenticator for HarnessAuthenticator {
    fn authenticate(&self, headless: bool) -> AuthFuture<'_> {
        Box::pin(self.run(headless))
    }
}

fn last_line(s: &str) -> &str {
    s.lines().rev().find(|l| !l.trim().is_empty()).unwrap_or("").trim()
}

/// Parses harness stdout. Progress lines may precede the JSON document, which may
/// itself span several lines; the first line opening an object that parses as
/// credentials starts it.
pub(crate) fn parse_harness_output(stdout: &str) -> Result<BrowserCredentials, YfError> {
    let creds = find_credentials(stdout)
        .map_err(|e| YfError::Auth(format!("browser harness output is not valid JSON: {e}")))?;

    let crumb = validate_crumb(&creds.crumb)?;
    if creds.cookies.is_empty() {
        return Err(YfError::Auth("browser harness returned no cookies".into()));
    }
    Ok(BrowserCredentials {
        cookies: creds.cookies,
        crumb,
    })
}

fn find_credentials(stdout: &str) -> Result<BrowserCredentials, serde_json::Error> {
    let whole = match serde_json::from_str::<BrowserCredentials>(stdout.trim()) {
        Ok(creds) => return Ok(creds),
        Err(e) => e,
    };

    let mut offset = 0;
    for line in stdout.split_inclusive('\n') {
        if line.trim_start().starts_with('{')
            && let Some(Ok(creds)) = serde_json::Deserializer::from_str(&stdout[offset..])
                .into_iter::<BrowserCredentials>()
                .next()
        {
            return Ok(creds);
        }
        offset += line.len();
    }
    Err(whole)
}

/// Signals the harness process group when a run ends, however it ends.
#[cfg(unix)]
struct ProcessGroupGuard {
    pgid: Option<libc::pid_t>,
    grace: Duration,
}

#[cfg(unix)]
impl ProcessGroupGuard {
    fn new(pid: Option<u32>, grace: Duration) -> Self {
        Self {
            pgid: pid
                .and_then(|p| libc::pid_t::try_from(p).ok())
                .filter(|&p| p > 1),
            grace,
        }
    }
}

#[cfg(unix)]
impl Drop for ProcessGroupGuard {
    fn drop(&mut self) {
        let Some(pgid) = self.pgid.take() else {
            return;
        };
        // Fails with ESRCH once every member has exited.
        if !signal_group(pgid, libc::SIGTERM) {
            return;
        }
        tracing::debug!(pgid, "sent SIGTERM to browser harness process group");

        let grace = self.grace;
        std::thread::spawn(move || {
            std::thread::sleep(grace);
            if signal_group(pgid, libc::SIGKILL) {
                tracing::debug!(pgid, "sent SIGKILL to browser harness process group");
            }
        });
    }
}

#[cfg(unix)]
fn signal_group(pgid: libc::pid_t, signal: libc::c_int) -> bool {
    // SAFETY: killpg has no memory-safety preconditions; pgid names the group
    // created for this harness by `process_group(0)`.
    unsafe { libc::killpg(pgid, signal) == 0 }
}

#[cfg(not(unix))]
struct ProcessGroupGuard;

#[cfg(not(unix))]
impl ProcessGroupGuard {
    fn new(_pid: Option<u32>, _grace: Duration) -> Self {
        Self
    }
}
