//! Consumer that bounds the producer with fixed-size demand batches.
//!
//! [`BoundedPullConsumer`] grants `batch_size` units of demand when it subscribes and
//! re-requests another `batch_size` every time it has processed that many items. The producer
//! can therefore never have more than `batch_size` items in flight towards it.
//!
//! The re-request is queued with [`Subscription::replenish`], so it is only granted when the
//! producer actually asks for more. A source whose length is a multiple of the batch size
//! finishes without a trailing, unused grant.
//!
//! Errors reaching the consumer are logged and end the run in [`ConsumerState::Errored`]. No
//! recovery is attempted at this level.

use std::fmt;
use std::num::NonZeroU64;
use tracing::{error, info};

use crate::bail;
use crate::error::{ErrorKind, ReactorError, ReactorResult};
use crate::stream::driver::subscribe;
use crate::stream::publisher::Publisher;
use crate::stream::signal::StreamOutcome;
use crate::stream::subscriber::Subscriber;
use crate::stream::subscription::Subscription;

/// Lifecycle of a [`BoundedPullConsumer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumerState {
    /// Not subscribed yet.
    Idle,
    /// Subscribed and waiting for items of the current batch.
    AwaitingItems,
    /// The source completed.
    Completed,
    /// The source failed.
    Errored,
}

/// Summary of a finished [`BoundedPullConsumer`] run.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsumerReport {
    /// Final consumer state.
    pub state: ConsumerState,
    /// Outcome of the underlying subscription.
    pub outcome: StreamOutcome,
    /// Total number of items processed.
    pub consumed: u64,
    /// Number of demand grants that reached the producer.
    pub grants: u64,
    /// Highest number of items in flight towards the consumer at any time.
    pub peak_in_flight: u64,
}

/// Consumer that requests items in fixed-size batches.
pub struct BoundedPullConsumer<F> {
    batch_size: NonZeroU64,
    consumed_in_batch: u64,
    consumed: u64,
    state: ConsumerState,
    subscription: Option<Subscription>,
    on_item: F,
}

impl<F> BoundedPullConsumer<F> {
    /// Creates a consumer that hands every item to `on_item`.
    ///
    /// Fails with [`ErrorKind::InvalidDemand`] when `batch_size` is zero.
    pub fn with_handler(batch_size: u64, on_item: F) -> ReactorResult<Self> {
        let Some(batch_size) = NonZeroU64::new(batch_size) else {
            bail!(
                ErrorKind::InvalidDemand,
                "Batch size must be at least 1",
                "batch size was 0"
            );
        };

        Ok(Self {
            batch_size,
            consumed_in_batch: 0,
            consumed: 0,
            state: ConsumerState::Idle,
            subscription: None,
            on_item,
        })
    }

    /// Returns the configured batch size.
    pub fn batch_size(&self) -> u64 {
        self.batch_size.get()
    }

    /// Returns the current state.
    pub fn state(&self) -> ConsumerState {
        self.state
    }

    /// Returns the number of items processed so far.
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    /// Subscribes to `source` and processes it until a terminal state.
    pub async fn run<T, P>(mut self, source: P) -> ConsumerReport
    where
        T: Send + 'static,
        P: Publisher<T> + 'static,
        F: FnMut(T),
    {
        let outcome = subscribe(source, &mut self).await;
        let (grants, peak_in_flight) = self
            .subscription
            .as_ref()
            .map(|subscription| (subscription.grants(), subscription.peak_in_flight()))
            .unwrap_or_default();

        ConsumerReport {
            state: self.state,
            outcome,
            consumed: self.consumed,
            grants,
            peak_in_flight,
        }
    }
}

/// Subscribes a logging [`BoundedPullConsumer`] to `source`.
///
/// Items are rendered with their [`fmt::Display`] implementation before being logged.
pub async fn subscribe_bounded<T, P>(source: P, batch_size: u64) -> ReactorResult<ConsumerReport>
where
    T: fmt::Display + Send + 'static,
    P: Publisher<T> + 'static,
{
    let consumer =
        BoundedPullConsumer::with_handler(batch_size, |item: T| info!(%item, "item consumed"))?;

    Ok(consumer.run(source).await)
}

impl<T, F> Subscriber<T> for BoundedPullConsumer<F>
where
    F: FnMut(T),
{
    fn on_subscribe(&mut self, subscription: &Subscription) -> ReactorResult<()> {
        subscription.request(self.batch_size.get())?;
        self.subscription = Some(subscription.clone());
        self.state = ConsumerState::AwaitingItems;

        Ok(())
    }

    fn on_next(&mut self, item: T, subscription: &Subscription) -> ReactorResult<()> {
        (self.on_item)(item);
        self.consumed += 1;
        self.consumed_in_batch += 1;

        if self.consumed_in_batch == self.batch_size.get() {
            self.consumed_in_batch = 0;
            subscription.replenish(self.batch_size.get())?;
        }

        Ok(())
    }

    fn on_error(&mut self, error: &ReactorError) {
        error!(error = %error, consumed = self.consumed, "bounded consumer received an error");
        self.state = ConsumerState::Errored;
    }

    fn on_complete(&mut self) {
        info!(consumed = self.consumed, "bounded consumer completed");
        self.state = ConsumerState::Completed;
    }
}
