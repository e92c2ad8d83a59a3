// src/ports/mod.rs
//! Asynchronous operations that stand in for network calls.
//!
//! Each port has a fixed-delay implementation used by the demo binary and the
//! tests. A real implementation only needs to return the same `PortError`
//! variants for the retry helper to do the right thing.

use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;

use crate::app_log;

pub mod resume_parser;
pub mod submitter;

pub use resume_parser::{FixedDelayResumeParser, ResumeParser};
pub use submitter::{ApplicationSubmitter, FixedDelaySubmitter};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PortError {
    /// The request itself is unacceptable; retrying will not help.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Temporary failure (timeout, connection reset, 5xx).
    #[error("Transient failure: {0}")]
    Transient(String),

    /// The remote side refused the request.
    #[error("Rejected: {0}")]
    Rejected(String),
}

impl PortError {
    pub fn should_retry(&self) -> bool {
        matches!(self, PortError::Transient(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub attempts: u32,
    /// Waited `backoff * n` before the n-th retry.
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, backoff: Duration) -> Self {
        Self { attempts, backoff }
    }

    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(2, Duration::from_millis(250))
    }
}

/// Run `action` until it succeeds, fails with a non-transient error, or the
/// policy's attempts are used up.
pub async fn with_retry<T, F, Fut>(policy: RetryPolicy, op: &str, mut action: F) -> Result<T, PortError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, PortError>>,
{
    let mut attempt = 0;
    loop {
        match action().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt == policy.attempts || !err.should_retry() {
                    app_log!(error, "{} failed after {} attempts: {}", op, attempt + 1, err);
                    return Err(err);
                }
                attempt += 1;
                let backoff = policy.backoff * attempt;
                app_log!(
                    warn,
                    "{} failed (attempt {}): {}. retrying in {:?}",
                    op,
                    attempt,
                    err,
                    backoff
                );
                sleep(backoff).await;
            }
        }
    }
}
