use tracing::{error, info};

use crate::error::{ReactorError, ReactorResult};
use crate::stream::signal::Signal;
use crate::stream::subscription::Subscription;

/// Consumer-side callbacks of a subscription.
///
/// Callbacks are invoked sequentially on the task that called [`crate::stream::subscribe`]:
/// first [`Subscriber::on_subscribe`], then any number of [`Subscriber::on_next`], then at most
/// one of [`Subscriber::on_error`] or [`Subscriber::on_complete`]. Demand is granted through the
/// [`Subscription`]; without it the producer delivers nothing.
pub trait Subscriber<T> {
    /// Called once before any item is delivered.
    fn on_subscribe(&mut self, subscription: &Subscription) -> ReactorResult<()>;

    /// Called for every delivered item.
    ///
    /// Returning an error cancels the subscription and ends the stream with that error.
    fn on_next(&mut self, item: T, subscription: &Subscription) -> ReactorResult<()>;

    /// Called when the stream ends with an error.
    fn on_error(&mut self, error: &ReactorError);

    /// Called when the stream completes normally.
    fn on_complete(&mut self);
}

/// Subscriber with unbounded demand that hands every item to a closure.
///
/// Errors are logged and otherwise ignored.
pub struct ForEach<F> {
    on_item: F,
}

impl<F> ForEach<F> {
    /// Creates a new [`ForEach`] subscriber.
    pub fn new(on_item: F) -> Self {
        Self { on_item }
    }
}

impl<T, F> Subscriber<T> for ForEach<F>
where
    F: FnMut(T),
{
    fn on_subscribe(&mut self, subscription: &Subscription) -> ReactorResult<()> {
        subscription.request(u64::MAX)
    }

    fn on_next(&mut self, item: T, _subscription: &Subscription) -> ReactorResult<()> {
        (self.on_item)(item);

        Ok(())
    }

    fn on_error(&mut self, error: &ReactorError) {
        error!(error = %error, "stream ended with an error");
    }

    fn on_complete(&mut self) {
        info!("stream completed");
    }
}

/// Subscriber that records every signal it receives.
///
/// Requests unbounded demand unless a fixed initial request is configured with
/// [`Collect::with_initial_request`].
#[derive(Debug)]
pub struct Collect<T> {
    signals: Vec<Signal<T>>,
    initial_request: u64,
}

impl<T> Collect<T> {
    /// Creates a new [`Collect`] subscriber with unbounded demand.
    pub fn new() -> Self {
        Self::with_initial_request(u64::MAX)
    }

    /// Creates a new [`Collect`] subscriber that requests `amount` items on subscription and
    /// never requests more.
    pub fn with_initial_request(amount: u64) -> Self {
        Self {
            signals: Vec::new(),
            initial_request: amount,
        }
    }

    /// Returns all recorded signals in arrival order.
    pub fn signals(&self) -> &[Signal<T>] {
        &self.signals
    }

    /// Returns the recorded items in arrival order.
    pub fn items(&self) -> Vec<&T> {
        self.signals
            .iter()
            .filter_map(|signal| match signal {
                Signal::Next(item) => Some(item),
                _ => None,
            })
            .collect()
    }

    /// Consumes the subscriber and returns the recorded items in arrival order.
    pub fn into_items(self) -> Vec<T> {
        self.signals
            .into_iter()
            .filter_map(|signal| match signal {
                Signal::Next(item) => Some(item),
                _ => None,
            })
            .collect()
    }

    /// Returns the number of terminal signals received.
    pub fn terminal_count(&self) -> usize {
        self.signals
            .iter()
            .filter(|signal| signal.is_terminal())
            .count()
    }
}

impl<T> Default for Collect<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Subscriber<T> for Collect<T> {
    fn on_subscribe(&mut self, subscription: &Subscription) -> ReactorResult<()> {
        subscription.request(self.initial_request)
    }

    fn on_next(&mut self, item: T, _subscription: &Subscription) -> ReactorResult<()> {
        self.signals.push(Signal::Next(item));

        Ok(())
    }

    fn on_error(&mut self, error: &ReactorError) {
        self.signals.push(Signal::Error(error.clone()));
    }

    fn on_complete(&mut self) {
        self.signals.push(Signal::Complete);
    }
}
