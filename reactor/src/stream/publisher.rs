use futures::{Stream, StreamExt};
use std::future::Future;
use std::pin::pin;
use tracing::debug;

use crate::stream::emitter::Emitter;

/// A cold source of items.
///
/// Every call to [`Publisher::publish`] runs one complete emission for one subscription, from the
/// initial state onwards. Implementations push items through the [`Emitter`], which waits for
/// demand, and finish with a terminal signal. A publisher that returns without emitting a
/// terminal signal is treated as completed.
///
/// Implementations should stop promptly once [`Emitter::emit_next`] fails or the subscription is
/// cancelled, since the caller of [`crate::stream::subscribe`] waits for the producer to finish.
pub trait Publisher<T>: Send {
    /// Runs the emission for one subscription.
    fn publish(self, emitter: &mut Emitter<T>) -> impl Future<Output = ()> + Send;
}

/// Publishes the items of an iterator in order and then completes.
#[derive(Debug, Clone)]
pub struct IterPublisher<I> {
    items: I,
}

impl<I> IterPublisher<I>
where
    I: Iterator,
{
    /// Creates a new [`IterPublisher`] over anything that can be turned into an iterator.
    pub fn new<C>(items: C) -> Self
    where
        C: IntoIterator<IntoIter = I>,
    {
        Self {
            items: items.into_iter(),
        }
    }
}

impl<I, T> Publisher<T> for IterPublisher<I>
where
    I: Iterator<Item = T> + Send,
    T: Send,
{
    async fn publish(self, emitter: &mut Emitter<T>) {
        for item in self.items {
            if let Err(err) = emitter.emit_next(item).await {
                debug!(error = %err, "iterator publisher stopped before exhausting its items");
                return;
            }
        }

        emitter.emit_complete().await;
    }
}

/// Publishes the items of an asynchronous [`Stream`] and completes when the stream ends.
#[derive(Debug)]
pub struct StreamPublisher<S> {
    stream: S,
}

impl<S> StreamPublisher<S> {
    /// Wraps `stream` into a publisher.
    pub fn new(stream: S) -> Self {
        Self { stream }
    }
}

impl<S, T> Publisher<T> for StreamPublisher<S>
where
    S: Stream<Item = T> + Send,
    T: Send,
{
    async fn publish(self, emitter: &mut Emitter<T>) {
        let mut stream = pin!(self.stream);
        let subscription = emitter.subscription().clone();

        loop {
            let next = tokio::select! {
                biased;

                _ = subscription.cancelled() => {
                    debug!("stream publisher cancelled while waiting for the next item");
                    return;
                }
                next = stream.next() => next,
            };

            let Some(item) = next else {
                break;
            };

            if let Err(err) = emitter.emit_next(item).await {
                debug!(error = %err, "stream publisher stopped before the stream ended");
                return;
            }
        }

        emitter.emit_complete().await;
    }
}
