use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use crate::error::{ErrorKind, ReactorError};
use crate::reactor_error;
use crate::stream::emitter::Emitter;
use crate::stream::publisher::Publisher;
use crate::stream::signal::{Signal, StreamOutcome};
use crate::stream::subscriber::Subscriber;
use crate::stream::subscription::Subscription;

/// Capacity of the signal channel between a producer and its consumer.
///
/// Items only enter the channel once demand has been drawn for them, so this is an upper bound
/// on buffering for unbounded demand and has no effect on bounded consumers.
const SIGNAL_CHANNEL_CAPACITY: usize = 64;

/// How long a cancelled producer may take to return before its task is aborted.
const PRODUCER_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Subscribes `subscriber` to `publisher` and drives the subscription to a terminal state.
///
/// The publisher runs on its own tokio task while the subscriber callbacks run on the calling
/// task, one signal at a time. Once a terminal state is reached the subscription is cancelled,
/// the channel is closed and the producer task is joined, so no producer outlives this call. A
/// producer that ignores the cancellation for longer than [`PRODUCER_SHUTDOWN_TIMEOUT`] is
/// aborted.
///
/// Every delivered item is checked against outstanding demand. A delivery without demand ends the
/// stream with [`ErrorKind::BackpressureViolation`], and a panicking producer ends it with
/// [`ErrorKind::ProducerPanic`]. In both cases the subscriber receives the error through
/// [`Subscriber::on_error`].
pub async fn subscribe<T, P, S>(publisher: P, subscriber: &mut S) -> StreamOutcome
where
    T: Send + 'static,
    P: Publisher<T> + 'static,
    S: Subscriber<T> + ?Sized,
{
    let (tx, mut rx) = mpsc::channel(SIGNAL_CHANNEL_CAPACITY);
    let subscription = Subscription::new();

    let mut emitter = Emitter::new(tx, subscription.clone());
    let mut producer = tokio::spawn(async move {
        publisher.publish(&mut emitter).await;
        emitter.finish().await;
    });

    let _guard = CancelOnDrop(subscription.clone());

    debug!("subscription started");
    let outcome = drive(&mut rx, &subscription, subscriber).await;

    // Stop the producer before joining it, it may be waiting for demand or for channel space.
    subscription.cancel();
    drop(rx);

    let join_result = match tokio::time::timeout(PRODUCER_SHUTDOWN_TIMEOUT, &mut producer).await {
        Ok(join_result) => join_result,
        Err(_) => {
            warn!(
                timeout = ?PRODUCER_SHUTDOWN_TIMEOUT,
                "producer did not stop after cancellation, aborting it"
            );
            producer.abort();
            producer.await
        }
    };

    let outcome = match (outcome, join_result) {
        (Some(outcome), Ok(())) => outcome,
        (Some(outcome), Err(err)) if err.is_cancelled() => outcome,
        (Some(outcome), Err(err)) => {
            // The stream already reached a terminal state, the failure can only be reported.
            error!(error = %ReactorError::from(err), "producer failed after the stream terminated");
            outcome
        }
        (None, Err(err)) => {
            let err = ReactorError::from(err);
            error!(error = %err, "producer failed before emitting a terminal signal");
            subscriber.on_error(&err);
            StreamOutcome::Errored(err)
        }
        (None, Ok(())) => {
            let err = reactor_error!(
                ErrorKind::InvalidState,
                "Producer ended without a terminal signal"
            );
            subscriber.on_error(&err);
            StreamOutcome::Errored(err)
        }
    };

    debug!(%outcome, grants = subscription.grants(), "subscription terminated");

    outcome
}

/// Cancels the subscription when the driving future is dropped before reaching a terminal state.
struct CancelOnDrop(Subscription);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

/// Dispatches signals to the subscriber until a terminal state is reached.
///
/// Returns `None` when the channel closed without a terminal signal, which means the producer
/// task died.
async fn drive<T, S>(
    rx: &mut mpsc::Receiver<Signal<T>>,
    subscription: &Subscription,
    subscriber: &mut S,
) -> Option<StreamOutcome>
where
    S: Subscriber<T> + ?Sized,
{
    if let Err(err) = subscriber.on_subscribe(subscription) {
        subscriber.on_error(&err);
        return Some(StreamOutcome::Errored(err));
    }

    loop {
        let signal = tokio::select! {
            biased;

            _ = subscription.cancelled() => return Some(StreamOutcome::Cancelled),
            signal = rx.recv() => signal,
        };

        match signal? {
            Signal::Next(item) => {
                if let Err(err) = subscription.acknowledge() {
                    error!(error = %err, "backpressure violation, cancelling the stream");
                    subscriber.on_error(&err);
                    return Some(StreamOutcome::Errored(err));
                }

                if let Err(err) = subscriber.on_next(item, subscription) {
                    let err = if err.kind() == ErrorKind::ConsumerError {
                        err
                    } else {
                        reactor_error!(
                            ErrorKind::ConsumerError,
                            "Subscriber failed to process an item",
                            source: err
                        )
                    };
                    subscriber.on_error(&err);
                    return Some(StreamOutcome::Errored(err));
                }
            }
            Signal::Error(err) => {
                subscriber.on_error(&err);
                return Some(StreamOutcome::Errored(err));
            }
            Signal::Complete => {
                subscriber.on_complete();
                return Some(StreamOutcome::Completed);
            }
        }
    }
}
