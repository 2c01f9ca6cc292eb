use crate::error::{AppError, AppResult};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Bounded retry with a fixed delay between attempts.
///
/// Each attempt is capped by `attempt_timeout`, and the whole loop by
/// `total_budget`: no new attempt starts once the budget cannot cover the
/// delay before it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
    pub attempt_timeout: Duration,
    pub total_budget: Duration,
}

impl RetryPolicy {
    /// Runs `call` until it succeeds, fails with a non-transient error, or
    /// the retry bound or time budget is exhausted.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut call: F) -> AppResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        let deadline = Instant::now() + self.total_budget;
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            let remaining = deadline.saturating_duration_since(Instant::now());
            let result = match tokio::time::timeout(remaining.min(self.attempt_timeout), call()).await
            {
                Ok(result) => result,
                Err(_) => Err(AppError::TransientFetch(format!(
                    "{} timed out on attempt {}",
                    operation, attempt
                ))),
            };

            let error = match result {
                Ok(value) => {
                    if attempt > 1 {
                        tracing::info!(operation = %operation, attempt, "Succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(e) if !e.is_transient() => return Err(e),
                Err(e) => e,
            };

            // status separates a rejected key (401) from an outage (5xx)
            let status = error.upstream_status();

            if attempt > self.max_retries {
                tracing::warn!(
                    operation = %operation,
                    attempts = attempt,
                    status = ?status,
                    error = %error,
                    "Retries exhausted"
                );
                return Err(error);
            }

            if Instant::now() + self.delay >= deadline {
                tracing::warn!(
                    operation = %operation,
                    attempts = attempt,
                    status = ?status,
                    error = %error,
                    "Retry budget exhausted"
                );
                return Err(error);
            }

            tracing::warn!(
                operation = %operation,
                attempt,
                max_retries = self.max_retries,
                status = ?status,
                error = %error,
                "Transient failure, retrying"
            );
            tokio::time::sleep(self.delay).await;
        }
    }
}
