#[cfg(test)]
#[path = "retry_test.rs"]
mod tests;

use std::future::Future;
use std::time::Duration;

use anyhow::anyhow;
use anyhow::Result;

/// Bounded attempts with exponential backoff. The pause after failed attempt
/// `n` (0-based) is `backoff_base * 2^n`, and there is no pause after the
/// final attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> RetryPolicy {
        return RetryPolicy {
            max_attempts: 3,
            backoff_base: Duration::from_secs(1),
        };
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff_base: Duration) -> RetryPolicy {
        return RetryPolicy {
            max_attempts,
            backoff_base,
        };
    }

    pub fn backoff(&self, attempt: u32) -> Duration {
        return self
            .backoff_base
            .saturating_mul(2_u32.saturating_pow(attempt));
    }

    /// Runs `op` until it succeeds or attempts run out, handing it the current
    /// 0-based attempt index. Returns the last error once exhausted.
    #[allow(clippy::implicit_return)]
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut last_err = anyhow!("{label} was never attempted");

        for attempt in 0..self.max_attempts {
            match op(attempt).await {
                Ok(res) => return Ok(res),
                Err(err) => {
                    tracing::error!(
                        error = ?err,
                        attempt = attempt + 1,
                        max_attempts = self.max_attempts,
                        "{label} attempt failed"
                    );
                    last_err = err;
                }
            }

            if attempt + 1 < self.max_attempts {
                let wait = self.backoff(attempt);
                tracing::info!(wait_ms = wait.as_millis() as u64, "Retrying {label}");
                tokio::time::sleep(wait).await;
            }
        }

        return Err(last_err);
    }
}
