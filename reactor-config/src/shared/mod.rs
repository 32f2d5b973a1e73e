//! Configuration types shared by the runner and the tests.

mod base;
mod catalog;
mod consumer;
mod interval;
mod retry;
mod runner;

pub use base::ValidationError;
pub use catalog::CatalogConfig;
pub use consumer::BoundedConsumerConfig;
pub use interval::IntervalConfig;
pub use retry::RetryConfig;
pub use runner::RunnerConfig;
