//! Rate-limit retry around a whole pipeline attempt.
//!
//! Only [`LlmError::RateLimited`] is retried, with a fixed delay between
//! attempts. Any other error, including an empty completion, is returned
//! immediately. Running out of attempts yields
//! [`AnalyzerError::RetryExhausted`].

use crate::config::AnalyzerConfig;
use crate::error::{AnalyzerError, LlmError};
use std::future::Future;
use tokio::time::{sleep, Duration};
use tracing::warn;

/// Attempt count and fixed delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &AnalyzerConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            delay: Duration::from_millis(config.retry_delay_ms),
        }
    }
}

/// Run `attempt` until it succeeds, fails with a non-rate-limit error, or
/// the policy's attempts are used up.
pub async fn retry_on_rate_limit<T, F, Fut>(
    policy: RetryPolicy,
    mut attempt: F,
) -> Result<T, AnalyzerError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, LlmError>>,
{
    let mut last_error = String::new();

    for n in 1..=policy.max_attempts {
        match attempt(n).await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_rate_limit() => {
                warn!(
                    "Attempt {}/{} rate limited: {}",
                    n, policy.max_attempts, e
                );
                last_error = e.to_string();
                if n < policy.max_attempts {
                    sleep(policy.delay).await;
                }
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(AnalyzerError::RetryExhausted {
        attempts: policy.max_attempts,
        last_error,
    })
}
