use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::shared::ValidationError;

/// Configuration of the timer-driven counter source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct IntervalConfig {
    /// Time between two emitted values, in milliseconds.
    #[serde(default = "default_period_ms")]
    pub period_ms: u64,
    /// Value at which the source completes.
    #[serde(default = "default_limit")]
    pub limit: u64,
    /// Value right after which a simulated fault is raised. `None` disables the fault.
    #[serde(default = "default_fault_at")]
    pub fault_at: Option<u64>,
}

impl IntervalConfig {
    pub const DEFAULT_PERIOD_MS: u64 = 1000;

    pub const DEFAULT_LIMIT: u64 = 10;

    pub const DEFAULT_FAULT_AT: Option<u64> = Some(5);

    /// Returns the tick period.
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }

    /// Validates the interval configuration.
    ///
    /// A fault point at or beyond `limit` is accepted and simply never fires.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.period_ms == 0 {
            return Err(ValidationError::must_be_positive("interval.period_ms"));
        }

        if self.limit == 0 {
            return Err(ValidationError::must_be_positive("interval.limit"));
        }

        if self.fault_at == Some(0) {
            return Err(ValidationError::must_be_positive("interval.fault_at"));
        }

        Ok(())
    }
}

impl Default for IntervalConfig {
    fn default() -> Self {
        Self {
            period_ms: default_period_ms(),
            limit: default_limit(),
            fault_at: default_fault_at(),
        }
    }
}

fn default_period_ms() -> u64 {
    IntervalConfig::DEFAULT_PERIOD_MS
}

fn default_limit() -> u64 {
    IntervalConfig::DEFAULT_LIMIT
}

fn default_fault_at() -> Option<u64> {
    IntervalConfig::DEFAULT_FAULT_AT
}
