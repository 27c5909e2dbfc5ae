//! Retry logic for dashboard API calls
//!
//! This module provides:
//! - Exponential backoff between attempts
//! - Fail-fast for failures that a later attempt cannot fix
//! - Optional cancellation of the whole retry loop

use profitwise_core::{classify, DashboardError, ErrorCategory, ErrorContext, RawFailure, Result};
use profitwise_monitor::ErrorLogger;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first
    pub max_attempts: usize,
    /// Wait before the second attempt
    pub base_delay: Duration,
    /// Ceiling for a single wait; uncapped when `None`
    pub max_delay: Option<Duration>,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
    /// Whether to add jitter to delays
    pub jitter: bool,
    /// Timeout for individual attempts
    pub attempt_timeout: Option<Duration>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: None,
            backoff_multiplier: 2.0,
            jitter: false,
            attempt_timeout: None,
        }
    }
}

/// Exponential backoff that classifies every failure and logs the final one
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
    logger: Arc<ErrorLogger>,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig, logger: Arc<ErrorLogger>) -> Self {
        Self { config, logger }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Run `operation` until it succeeds, fails with a non-retryable
    /// category, or runs out of attempts.
    pub async fn execute<F, Fut, T, E>(&self, operation: F, context: ErrorContext) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: Into<RawFailure>,
    {
        self.run(operation, &context, None).await
    }

    /// Like [`execute`](Self::execute), but `cancel` interrupts both the
    /// running attempt and the backoff wait. Cancellation yields a
    /// `CANCELLED` error that is not logged.
    pub async fn execute_with_cancel<F, Fut, T, E>(
        &self,
        operation: F,
        context: ErrorContext,
        cancel: &CancellationToken,
    ) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: Into<RawFailure>,
    {
        self.run(operation, &context, Some(cancel)).await
    }

    async fn run<F, Fut, T, E>(
        &self,
        operation: F,
        context: &ErrorContext,
        cancel: Option<&CancellationToken>,
    ) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: Into<RawFailure>,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            if attempt > 1 {
                let delay = self.calculate_delay(attempt);
                debug!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    action = %context,
                    "Waiting before retry"
                );
                if !wait(delay, cancel).await {
                    return Err(cancelled(context));
                }
            }

            debug!(attempt, max_attempts, action = %context, "Executing operation with retry");

            let outcome = match cancel {
                Some(token) => tokio::select! {
                    biased;
                    _ = token.cancelled() => return Err(cancelled(context)),
                    outcome = run_attempt(&operation, self.config.attempt_timeout) => outcome,
                },
                None => run_attempt(&operation, self.config.attempt_timeout).await,
            };

            let error = match outcome {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(attempt, action = %context, "Operation succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(raw) => classify(raw, context),
            };

            warn!(
                attempt,
                max_attempts,
                category = %error.category(),
                status = error.status_code(),
                error = %error.message(),
                "Operation failed"
            );

            if !error.is_retryable() || attempt >= max_attempts {
                if error.category() != ErrorCategory::Cancelled {
                    self.logger.log(error.clone());
                }
                return Err(error);
            }

            attempt += 1;
        }
    }

    /// Wait before `attempt` (2-based): `base * multiplier^(attempt - 2)`
    pub(crate) fn calculate_delay(&self, attempt: usize) -> Duration {
        let exponent = attempt.saturating_sub(2) as i32;
        let delay_ms = (self.config.base_delay.as_millis() as f64
            * self.config.backoff_multiplier.powi(exponent)) as u64;

        let mut delay = Duration::from_millis(delay_ms);

        if let Some(max_delay) = self.config.max_delay {
            delay = delay.min(max_delay);
        }

        if self.config.jitter {
            let jitter_range = delay.as_millis() as f64 * 0.1; // ±10% jitter
            let jitter = (rand::random::<f64>() - 0.5) * 2.0 * jitter_range;
            let jittered_ms = (delay.as_millis() as f64 + jitter).max(0.0) as u64;
            delay = Duration::from_millis(jittered_ms);
        }

        delay
    }
}

async fn run_attempt<F, Fut, T, E>(
    operation: &F,
    timeout: Option<Duration>,
) -> std::result::Result<T, RawFailure>
where
    F: Fn() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    E: Into<RawFailure>,
{
    match timeout {
        Some(limit) => match tokio::time::timeout(limit, operation()).await {
            Ok(result) => result.map_err(Into::into),
            Err(_) => Err(RawFailure::timeout(format!(
                "Attempt timed out after {}ms",
                limit.as_millis()
            ))),
        },
        None => operation().await.map_err(Into::into),
    }
}

/// Sleep for `delay`; false if cancelled first
async fn wait(delay: Duration, cancel: Option<&CancellationToken>) -> bool {
    match cancel {
        Some(token) => tokio::select! {
            biased;
            _ = token.cancelled() => false,
            _ = sleep(delay) => true,
        },
        None => {
            sleep(delay).await;
            true
        }
    }
}

fn cancelled(context: &ErrorContext) -> DashboardError {
    debug!(action = %context, "Operation cancelled");
    DashboardError::cancelled(context.clone())
}
