use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use reactor::concurrency::timer::IntervalTimer;
use reactor::error::{ErrorKind, ReactorError};
use reactor::stream::{
    BoundedPullConsumer, Collect, ConsumerState, IntervalPublisher, Signal, StreamOutcome,
    Subscription, subscribe, with_retry,
};
use reactor_telemetry::tracing::init_test_tracing;
use tokio::time::Instant;

const PERIOD: Duration = Duration::from_millis(100);

#[tokio::test(start_paused = true)]
async fn fault_repeats_on_every_attempt_until_retries_run_out() {
    init_test_tracing();

    let attempts = Arc::new(AtomicU32::new(0));
    let counter = attempts.clone();
    let source = with_retry(
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            IntervalPublisher::new(PERIOD, 10).unwrap().with_fault_at(5)
        },
        2,
    );
    let mut subscriber = Collect::new();

    let outcome = subscribe(source, &mut subscriber).await;

    let err = outcome.error().cloned().unwrap();
    assert_eq!(err.kind(), ErrorKind::RetryExhausted);
    let last_fault = std::error::Error::source(&err)
        .and_then(|source| source.downcast_ref::<ReactorError>())
        .map(|source| source.kind());
    assert_eq!(last_fault, Some(ErrorKind::SimulatedFault));

    assert_eq!(attempts.load(Ordering::SeqCst), 3);
    assert_eq!(subscriber.terminal_count(), 1);

    let expected: Vec<u64> = (1..=5).cycle().take(15).collect();
    assert_eq!(subscriber.into_items(), expected);
}

#[tokio::test(start_paused = true)]
async fn source_without_fault_completes_without_retries() {
    init_test_tracing();

    let attempts = Arc::new(AtomicU32::new(0));
    let counter = attempts.clone();
    let source = with_retry(
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            IntervalPublisher::new(PERIOD, 10).unwrap()
        },
        2,
    );
    let mut subscriber = Collect::new();
    let start = Instant::now();

    let outcome = subscribe(source, &mut subscriber).await;

    assert_eq!(outcome, StreamOutcome::Completed);
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
    assert_eq!(subscriber.into_items(), (1..=10).collect::<Vec<u64>>());
    assert!(start.elapsed() >= PERIOD * 10);
}

#[tokio::test(start_paused = true)]
async fn fault_at_limit_completes_normally() {
    init_test_tracing();

    let source = with_retry(
        || IntervalPublisher::new(PERIOD, 10).unwrap().with_fault_at(10),
        2,
    );
    let mut subscriber = Collect::new();

    let outcome = subscribe(source, &mut subscriber).await;

    assert_eq!(outcome, StreamOutcome::Completed);
    assert!(matches!(subscriber.signals().last(), Some(Signal::Complete)));
}

#[tokio::test(start_paused = true)]
async fn cancelling_twice_is_a_no_op() {
    let mut timer = IntervalTimer::start(PERIOD);
    assert_eq!(timer.tick().await, Some(1));

    assert!(timer.cancel());
    assert!(!timer.cancel());
    assert_eq!(timer.tick().await, None);

    let subscription = Subscription::new();
    assert!(subscription.cancel());
    assert!(!subscription.cancel());
    assert!(subscription.is_cancelled());
}

#[tokio::test(start_paused = true)]
async fn abandoned_subscription_only_sees_elapsed_ticks() {
    init_test_tracing();

    let source = IntervalPublisher::new(PERIOD, 1_000).unwrap();
    let mut subscriber = Collect::new();

    let deadline = PERIOD * 3 + PERIOD / 2;
    let result = tokio::time::timeout(deadline, subscribe(source, &mut subscriber)).await;

    assert!(result.is_err());
    assert_eq!(subscriber.into_items(), vec![1, 2, 3]);
}

#[tokio::test(start_paused = true)]
async fn bounded_consumer_keeps_demand_bounded_across_retries() {
    init_test_tracing();

    let source = with_retry(
        || IntervalPublisher::new(PERIOD, 10).unwrap().with_fault_at(5),
        2,
    );
    let mut items = Vec::new();
    let consumer = BoundedPullConsumer::with_handler(3, |item: u64| items.push(item)).unwrap();

    let report = consumer.run(source).await;

    assert_eq!(report.state, ConsumerState::Errored);
    assert_eq!(
        report.outcome.error().map(|err| err.kind()),
        Some(ErrorKind::RetryExhausted)
    );
    assert_eq!(report.consumed, 15);
    assert!(report.peak_in_flight <= 3);
    // One grant on subscribe and one after each of the four full batches.
    assert_eq!(report.grants, 5);

    let expected: Vec<u64> = (1..=5).cycle().take(15).collect();
    assert_eq!(items, expected);
}
