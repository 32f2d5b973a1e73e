use clap::Subcommand;
use reactor::catalog::{MemoryStore, ProductService};
use reactor::error::ErrorKind;
use reactor::stream::{
    ForEach, IntervalPublisher, IterPublisher, StreamOutcome, subscribe, subscribe_bounded,
    with_retry,
};
use reactor_config::shared::{
    BoundedConsumerConfig, CatalogConfig, IntervalConfig, RetryConfig, RunnerConfig,
};
use tracing::{error, info};

use crate::error::RunnerResult;

/// Demonstrations the runner can execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Subcommand)]
pub enum Demo {
    /// Consume a finite range with batch-bounded demand.
    Pull,
    /// Consume the timer-driven counter through the retry wrapper.
    Interval,
    /// Seed the catalog and stream its products with bounded demand.
    Catalog,
    /// Run every demonstration in sequence.
    #[default]
    All,
}

/// Runs the selected demonstration with the provided configuration.
pub async fn run_demo(demo: Demo, config: &RunnerConfig) -> RunnerResult<()> {
    info!(?demo, "starting demonstration");

    match demo {
        Demo::Pull => run_bounded_pull(&config.consumer).await,
        Demo::Interval => run_interval(&config.interval, &config.retry).await,
        Demo::Catalog => run_catalog(&config.catalog).await,
        Demo::All => {
            run_bounded_pull(&config.consumer).await?;
            run_catalog(&config.catalog).await?;
            run_interval(&config.interval, &config.retry).await
        }
    }
}

async fn run_bounded_pull(config: &BoundedConsumerConfig) -> RunnerResult<()> {
    let source = IterPublisher::new(1..=config.source_len);
    let report = subscribe_bounded(source, config.batch_size).await?;

    info!(
        state = ?report.state,
        consumed = report.consumed,
        grants = report.grants,
        peak_in_flight = report.peak_in_flight,
        "bounded pull finished"
    );

    Ok(())
}

/// Runs the interval source under the retry wrapper.
///
/// Exhausting the retry budget is an expected outcome of the fault configuration, so it is
/// logged and does not fail the runner.
async fn run_interval(config: &IntervalConfig, retry: &RetryConfig) -> RunnerResult<()> {
    let mut publisher = IntervalPublisher::new(config.period(), config.limit)?;
    if let Some(fault_at) = config.fault_at {
        publisher = publisher.with_fault_at(fault_at);
    }

    let source = with_retry(move || publisher, retry.max_retries).with_delay(retry.retry_delay());
    let mut subscriber = ForEach::new(|value: u64| {
        let item = format!("tick {value}");
        info!(%item, "interval item");
    });

    match subscribe(source, &mut subscriber).await {
        StreamOutcome::Completed => info!("interval stream completed"),
        StreamOutcome::Cancelled => info!("interval stream cancelled"),
        StreamOutcome::Errored(err) if err.kind() == ErrorKind::RetryExhausted => {
            error!(error = %err, "interval stream gave up after exhausting its retries");
        }
        StreamOutcome::Errored(err) => return Err(err.into()),
    }

    Ok(())
}

async fn run_catalog(config: &CatalogConfig) -> RunnerResult<()> {
    let service = ProductService::new(MemoryStore::new(), MemoryStore::new());

    if config.seed {
        let seeded = service.seed().await?;
        info!(products = seeded, "catalog seeded");
    }

    let report = subscribe_bounded(service.stream_all().await?, config.stream_batch_size).await?;
    info!(
        consumed = report.consumed,
        grants = report.grants,
        "catalog listing streamed"
    );

    for product in service.find_all_with_name_upper_case().await? {
        info!(id = ?product.id, name = %product.name, "upper case listing");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> RunnerConfig {
        let mut config = RunnerConfig::default();
        config.interval.period_ms = 10;
        config
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_interval_retries_do_not_fail_the_runner() {
        let config = test_config();

        assert!(run_demo(Demo::Interval, &config).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn every_demo_runs_to_completion() {
        let mut config = test_config();
        config.interval.fault_at = None;

        assert!(run_demo(Demo::All, &config).await.is_ok());
    }

    #[tokio::test]
    async fn invalid_batch_size_fails_the_pull_demo() {
        let mut config = test_config();
        config.consumer.batch_size = 0;

        assert!(run_demo(Demo::Pull, &config).await.is_err());
    }
}
