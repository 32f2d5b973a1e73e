use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::shared::ValidationError;

/// Retry budget applied to the interval source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RetryConfig {
    /// Number of resubscriptions allowed after the first attempt fails.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Pause before every resubscription, in milliseconds.
    #[serde(default)]
    pub retry_delay_ms: u64,
}

impl RetryConfig {
    pub const DEFAULT_MAX_RETRIES: u32 = 2;

    /// Upper bound for [`RetryConfig::retry_delay_ms`].
    pub const MAX_RETRY_DELAY_MS: u64 = 60_000;

    /// Returns the pause before every resubscription.
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Validates the retry settings.
    ///
    /// A zero budget is allowed and disables resubscription.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.retry_delay_ms > Self::MAX_RETRY_DELAY_MS {
            return Err(ValidationError::InvalidFieldValue {
                field: "retry.retry_delay_ms".to_string(),
                constraint: format!("must be at most {}", Self::MAX_RETRY_DELAY_MS),
            });
        }

        Ok(())
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_delay_ms: 0,
        }
    }
}

fn default_max_retries() -> u32 {
    RetryConfig::DEFAULT_MAX_RETRIES
}
