//! Provider-level configuration

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use thiserror::Error;

use crate::retry::RetryPolicy;

static ACCOUNT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^act-[0-9a-f]+$").expect("valid account pattern"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderConfigError {
    #[error("Invalid account ID '{0}': expected act-<hex>")]
    InvalidAccount(String),

    #[error("Retry budget must be greater than zero")]
    ZeroRetryBudget,

    #[error("Retry interval {interval:?} exceeds the retry budget {budget:?}")]
    IntervalExceedsBudget { interval: Duration, budget: Duration },

    #[error("Retryable error code must not be empty")]
    EmptyRetryableCode,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Spotinst account the resources belong to; the API's default account when unset
    pub account: Option<String>,
    pub retry: RetryPolicy,
}

impl ProviderConfig {
    pub fn new(account: Option<String>, retry: RetryPolicy) -> Self {
        Self { account, retry }
    }

    pub fn validate(&self) -> Result<(), ProviderConfigError> {
        if let Some(account) = &self.account
            && !ACCOUNT_ID.is_match(account)
        {
            return Err(ProviderConfigError::InvalidAccount(account.clone()));
        }
        if self.retry.budget.is_zero() {
            return Err(ProviderConfigError::ZeroRetryBudget);
        }
        if self.retry.interval > self.retry.budget {
            return Err(ProviderConfigError::IntervalExceedsBudget {
                interval: self.retry.interval,
                budget: self.retry.budget,
            });
        }
        if self.retry.retryable_code.trim().is_empty() {
            return Err(ProviderConfigError::EmptyRetryableCode);
        }
        Ok(())
    }
}
