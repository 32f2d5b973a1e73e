use futures::stream;
use reactor::error::ErrorKind;
use reactor::stream::{
    BoundedPullConsumer, ConsumerState, IterPublisher, StreamOutcome, StreamPublisher,
};
use reactor_telemetry::tracing::init_test_tracing;

#[tokio::test]
async fn demand_never_exceeds_one_batch() {
    init_test_tracing();

    for batch_size in 1..=6u64 {
        for len in 0..=17u64 {
            let mut seen = Vec::new();
            let consumer =
                BoundedPullConsumer::with_handler(batch_size, |item: u64| seen.push(item)).unwrap();

            let report = consumer.run(IterPublisher::new(1..=len)).await;

            assert_eq!(report.outcome, StreamOutcome::Completed);
            assert_eq!(report.consumed, len);
            assert!(
                report.peak_in_flight <= batch_size,
                "batch {batch_size}, len {len}: {} in flight",
                report.peak_in_flight
            );
            assert_eq!(seen, (1..=len).collect::<Vec<_>>());
        }
    }
}

#[tokio::test]
async fn grants_follow_batch_boundaries() {
    init_test_tracing();

    let cases = [(5, 10, 2), (5, 3, 1), (5, 11, 3), (1, 4, 4), (4, 0, 1)];

    for (batch_size, len, expected_grants) in cases {
        let consumer = BoundedPullConsumer::with_handler(batch_size, |_: u64| {}).unwrap();

        let report = consumer.run(IterPublisher::new(1..=len)).await;

        assert_eq!(
            report.grants, expected_grants,
            "batch {batch_size}, len {len}"
        );
    }
}

#[tokio::test]
async fn async_sources_are_bounded_too() {
    init_test_tracing();

    let mut seen = Vec::new();
    let consumer =
        BoundedPullConsumer::with_handler(3, |item: String| seen.push(item)).unwrap();
    let source = StreamPublisher::new(stream::iter(
        ["a", "b", "c", "d", "e"].map(str::to_string),
    ));

    let report = consumer.run(source).await;

    assert_eq!(report.state, ConsumerState::Completed);
    assert_eq!(report.grants, 2);
    assert!(report.peak_in_flight <= 3);
    assert_eq!(seen, vec!["a", "b", "c", "d", "e"]);
}

#[test]
fn zero_batch_size_is_invalid_demand() {
    let err = BoundedPullConsumer::with_handler(0, |_: u64| {})
        .err()
        .unwrap();

    assert_eq!(err.kind(), ErrorKind::InvalidDemand);
}
