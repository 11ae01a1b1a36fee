//! Bounded retry with exponential backoff.

use std::fmt::Display;
use std::time::Duration;

use backoff::backoff::Backoff;
use backoff::future::retry_notify;

use crate::Error;

/// Configuration for retrying failed executions.
///
/// Before attempt `k` (`k >= 2`) the retrier waits
/// `delay * backoff_factor^(k - 2)`. The default makes a single attempt.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RetryConfig {
    /// Total attempts, including the first one. Must be at least 1.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub delay: Duration,
    /// Multiplier applied to the delay after each retry. Must be at
    /// least 1.
    pub backoff_factor: f64,
}

impl Default for RetryConfig {
    #[inline]
    fn default() -> Self {
        Self {
            max_attempts: 1,
            delay: Duration::ZERO,
            backoff_factor: 1.0,
        }
    }
}

impl RetryConfig {
    /// Creates a config that makes up to `max_attempts` attempts without
    /// waiting in between.
    #[inline]
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Default::default()
        }
    }

    /// Sets the delay before the second attempt.
    #[inline]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Sets the backoff factor.
    #[inline]
    pub fn with_backoff_factor(mut self, backoff_factor: f64) -> Self {
        self.backoff_factor = backoff_factor;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), Error> {
        if self.max_attempts == 0 {
            return Err(Error::Validation(
                "retry config needs at least one attempt".to_owned(),
            ));
        }
        if !self.backoff_factor.is_finite() || self.backoff_factor < 1.0 {
            return Err(Error::Validation(format!(
                "retry backoff factor must be a finite number >= 1, got {}",
                self.backoff_factor
            )));
        }
        Ok(())
    }

    /// Returns how long to wait before the given 1-based attempt, or
    /// `None` if that attempt is not allowed.
    pub fn delay_before(&self, attempt: u32) -> Option<Duration> {
        if attempt > self.max_attempts {
            return None;
        }
        if attempt <= 1 {
            return Some(Duration::ZERO);
        }
        let exp = i32::try_from(attempt - 2).unwrap_or(i32::MAX);
        let secs = self.delay.as_secs_f64() * self.backoff_factor.powi(exp);
        Some(Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX))
    }
}

/// A [`Backoff`] that follows a [`RetryConfig`] and gives up after the
/// last allowed attempt.
#[derive(Clone, Debug)]
pub struct RetryBackoff {
    config: RetryConfig,
    // The attempt that just failed.
    attempt: u32,
}

impl RetryBackoff {
    /// Creates a backoff positioned before the first attempt.
    #[inline]
    pub fn new(config: RetryConfig) -> Self {
        Self { config, attempt: 1 }
    }
}

impl Backoff for RetryBackoff {
    fn reset(&mut self) {
        self.attempt = 1;
    }

    fn next_backoff(&mut self) -> Option<Duration> {
        let delay = self.config.delay_before(self.attempt + 1)?;
        self.attempt += 1;
        Some(delay)
    }
}

/// Runs `operation` until it succeeds or the attempts run out.
///
/// Only the error of the last attempt is returned, earlier ones are
/// logged and dropped.
pub async fn with_retry<T, E, F, Fut>(
    config: &RetryConfig,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt = 1;
    retry_notify(
        RetryBackoff::new(*config),
        || {
            let fut = operation();
            async move { fut.await.map_err(backoff::Error::transient) }
        },
        |err: E, delay: Duration| {
            warn!("attempt {attempt} failed, retrying in {delay:?}: {err}");
            attempt += 1;
        },
    )
    .await
}
