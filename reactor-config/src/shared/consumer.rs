use serde::{Deserialize, Serialize};

use crate::shared::ValidationError;

/// Configuration of the batch-bounded pull consumer demo.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BoundedConsumerConfig {
    /// Number of items requested per demand grant.
    #[serde(default = "default_batch_size")]
    pub batch_size: u64,
    /// Number of items produced by the demo source.
    #[serde(default = "default_source_len")]
    pub source_len: u64,
}

impl BoundedConsumerConfig {
    pub const DEFAULT_BATCH_SIZE: u64 = 5;

    pub const DEFAULT_SOURCE_LEN: u64 = 10;

    /// Validates the consumer configuration.
    ///
    /// Ensures `batch_size` is non-zero.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.batch_size == 0 {
            return Err(ValidationError::must_be_positive("consumer.batch_size"));
        }

        Ok(())
    }
}

impl Default for BoundedConsumerConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            source_len: default_source_len(),
        }
    }
}

fn default_batch_size() -> u64 {
    BoundedConsumerConfig::DEFAULT_BATCH_SIZE
}

fn default_source_len() -> u64 {
    BoundedConsumerConfig::DEFAULT_SOURCE_LEN
}
