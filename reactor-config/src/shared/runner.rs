use serde::{Deserialize, Serialize};

use crate::shared::{
    BoundedConsumerConfig, CatalogConfig, IntervalConfig, RetryConfig, ValidationError,
};

/// Top-level configuration of the runner binary.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RunnerConfig {
    #[serde(default)]
    pub consumer: BoundedConsumerConfig,
    #[serde(default)]
    pub interval: IntervalConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

impl RunnerConfig {
    /// Validates every section of the configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.consumer.validate()?;
        self.interval.validate()?;
        self.retry.validate()?;
        self.catalog.validate()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = RunnerConfig::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.consumer.batch_size, 5);
        assert_eq!(config.interval.fault_at, Some(5));
        assert_eq!(config.retry.max_retries, 2);
        assert_eq!(config.catalog.stream_batch_size, 2);
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let mut config = RunnerConfig::default();
        config.consumer.batch_size = 0;

        let err = config.validate().unwrap_err();

        assert_eq!(
            err,
            ValidationError::InvalidFieldValue {
                field: "consumer.batch_size".to_string(),
                constraint: "must be greater than 0".to_string(),
            }
        );
    }

    #[test]
    fn zero_period_and_limit_are_rejected() {
        let mut config = RunnerConfig::default();
        config.interval.period_ms = 0;
        assert!(config.validate().is_err());

        let mut config = RunnerConfig::default();
        config.interval.limit = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn retry_section_is_validated() {
        let mut config = RunnerConfig::default();
        config.retry.retry_delay_ms = RetryConfig::MAX_RETRY_DELAY_MS + 1;

        assert!(config.validate().is_err());
    }

    #[test]
    fn fault_beyond_limit_is_accepted() {
        let mut config = RunnerConfig::default();
        config.interval.fault_at = Some(config.interval.limit + 5);

        assert!(config.validate().is_ok());
    }
}
