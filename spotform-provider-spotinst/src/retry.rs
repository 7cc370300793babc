//! Retry of vendor API calls rejected with a transient error code
//!
//! The API refuses to touch a group while another operation holds its lock
//! and answers with a dedicated error code. Such calls are retried at a
//! fixed interval until a time budget runs out.

use std::future::Future;
use std::time::Duration;

use log::warn;
use tokio::time::{Instant, sleep};

use crate::api::ApiResult;

pub const DEFAULT_RETRYABLE_CODE: &str = "CANT_LOCK_GROUP";
pub const DEFAULT_BUDGET: Duration = Duration::from_secs(60);
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// API error code that marks a call as retryable
    pub retryable_code: String,
    /// Total time after which the last error is returned
    pub budget: Duration,
    pub interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retryable_code: DEFAULT_RETRYABLE_CODE.to_string(),
            budget: DEFAULT_BUDGET,
            interval: DEFAULT_INTERVAL,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries
    pub fn none() -> Self {
        Self {
            budget: Duration::ZERO,
            ..Self::default()
        }
    }
}

/// Run `call` until it succeeds, fails with a non-retryable error, or the
/// next attempt would start after the budget is spent
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, operation: &str, mut call: F) -> ApiResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ApiResult<T>>,
{
    let deadline = Instant::now() + policy.budget;
    let mut attempt = 1;

    loop {
        match call().await {
            Err(err)
                if err.code() == Some(policy.retryable_code.as_str())
                    && Instant::now() + policy.interval <= deadline =>
            {
                warn!(
                    "{} failed (attempt {}): {}; retrying in {:?}",
                    operation, attempt, err, policy.interval
                );
                sleep(policy.interval).await;
                attempt += 1;
            }
            result => return result,
        }
    }
}
