use serde::{Deserialize, Serialize};

use crate::shared::ValidationError;

/// Configuration of the catalog demo.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CatalogConfig {
    /// Batch size used when streaming the product listing.
    #[serde(default = "default_stream_batch_size")]
    pub stream_batch_size: u64,
    /// Whether the catalog is filled with sample data at startup.
    #[serde(default = "default_seed")]
    pub seed: bool,
}

impl CatalogConfig {
    pub const DEFAULT_STREAM_BATCH_SIZE: u64 = 2;

    /// Validates the catalog configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.stream_batch_size == 0 {
            return Err(ValidationError::must_be_positive(
                "catalog.stream_batch_size",
            ));
        }

        Ok(())
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            stream_batch_size: default_stream_batch_size(),
            seed: default_seed(),
        }
    }
}

fn default_stream_batch_size() -> u64 {
    CatalogConfig::DEFAULT_STREAM_BATCH_SIZE
}

fn default_seed() -> bool {
    true
}
