//! Bounded exponential backoff for translation backend calls.

use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// How many times a backend call is attempted and how long to wait between
/// attempts.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Attempts including the first; 0 behaves like 1
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Three attempts, waiting 250ms then 500ms.
    ///
    /// Fill runs inside the write request, so the total wait stays under a
    /// second.
    pub fn translation() -> Self {
        Self::new(3, Duration::from_millis(250)).with_max_delay(Duration::from_secs(2))
    }

    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO)
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Wait before the `retry`-th retry (1-based), capped at `max_delay`.
    fn backoff(&self, retry: u32) -> Duration {
        let factor = self.backoff_multiplier.powi(retry.saturating_sub(1) as i32);
        self.initial_delay.mul_f64(factor).min(self.max_delay)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::translation()
    }
}

/// Run `operation` until it succeeds, fails with an error `should_retry`
/// rejects, or the attempts run out. Returns the last error on failure.
pub async fn with_retry_if<T, E, F, Fut, P>(
    config: &RetryConfig,
    operation_name: &str,
    mut operation: F,
    should_retry: P,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    let attempts = config.attempts();
    let mut attempt = 1;

    loop {
        let err = match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!("{}: succeeded on attempt {}/{}", operation_name, attempt, attempts);
                }
                return Ok(value);
            }
            Err(e) => e,
        };

        if !should_retry(&err) {
            debug!("{}: not retrying: {}", operation_name, err);
            return Err(err);
        }
        if attempt >= attempts {
            warn!("{}: giving up after {} attempt(s): {}", operation_name, attempts, err);
            return Err(err);
        }

        let wait = config.backoff(attempt);
        warn!(
            "{}: attempt {}/{} failed ({}), retrying in {:?}",
            operation_name, attempt, attempts, err, wait
        );
        tokio::time::sleep(wait).await;
        attempt += 1;
    }
}
