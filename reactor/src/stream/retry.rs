//! Bounded resubscription of a failing cold source.
//!
//! [`with_retry`] wraps a factory producing a fresh [`Publisher`] per attempt. When an attempt
//! fails with an error whose [`ErrorHandlingPolicy`] allows resubscription, the factory is
//! invoked again and the new publisher starts from its initial state. Items of every attempt are
//! delivered downstream as they arrive, so a consumer observes the replayed prefix once per
//! attempt.
//!
//! Once the retry budget is spent the stream fails with [`ErrorKind::RetryExhausted`], carrying
//! the last fault as its source.

use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::ErrorKind;
use crate::reactor_error;
use crate::stream::emitter::{Emitter, Termination};
use crate::stream::policy::{RetryDirective, build_error_handling_policy};
use crate::stream::publisher::Publisher;

/// Retry budget of one subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryState {
    attempts_remaining: u32,
    retries: u32,
}

impl RetryState {
    /// Creates a budget allowing `max_retries` resubscriptions.
    pub fn new(max_retries: u32) -> Self {
        Self {
            attempts_remaining: max_retries,
            retries: 0,
        }
    }

    /// Returns the number of resubscriptions still allowed.
    pub fn attempts_remaining(&self) -> u32 {
        self.attempts_remaining
    }

    /// Returns the number of resubscriptions performed so far.
    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// Consumes one retry, returning `false` when the budget is already spent.
    pub fn consume(&mut self) -> bool {
        if self.attempts_remaining == 0 {
            return false;
        }

        self.attempts_remaining -= 1;
        self.retries += 1;

        true
    }
}

/// Publisher that resubscribes to a freshly built source after retriable failures.
#[derive(Debug, Clone)]
pub struct Retry<F> {
    factory: F,
    max_retries: u32,
    delay: Duration,
}

/// Wraps `factory` so that a failing source is rebuilt and resubscribed up to `max_retries`
/// times.
pub fn with_retry<F>(factory: F, max_retries: u32) -> Retry<F> {
    Retry {
        factory,
        max_retries,
        delay: Duration::ZERO,
    }
}

impl<F> Retry<F> {
    /// Waits `delay` before every resubscription.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Returns the configured retry budget.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }
}

impl<T, F, P> Publisher<T> for Retry<F>
where
    T: Send,
    F: FnMut() -> P + Send,
    P: Publisher<T>,
{
    async fn publish(mut self, emitter: &mut Emitter<T>) {
        let mut state = RetryState::new(self.max_retries);

        loop {
            let mut attempt = emitter.attempt();
            (self.factory)().publish(&mut attempt).await;

            let err = match attempt.take_termination() {
                Some(Termination::Failed(err)) => err,
                Some(Termination::Completed) => {
                    debug!(retries = state.retries(), "retried source completed");
                    emitter.emit_complete().await;
                    return;
                }
                None => {
                    // The attempt stopped without a terminal signal, either because it was
                    // cancelled or because it simply returned.
                    if !emitter.is_cancelled() {
                        emitter.emit_complete().await;
                    }
                    return;
                }
            };

            if emitter.is_cancelled() {
                debug!(error = %err, "source failed after cancellation, not retrying");
                return;
            }

            let policy = build_error_handling_policy(&err);
            if policy.retry_directive() == RetryDirective::NoRetry {
                info!(
                    error = %err,
                    solution = policy.solution(),
                    "source failed with a non retriable error"
                );
                emitter.emit_error(err).await;
                return;
            }

            if !state.consume() {
                let exhausted = reactor_error!(
                    ErrorKind::RetryExhausted,
                    "Source kept failing after all retries",
                    format!("gave up after {} retries", state.retries()),
                    source: err
                );
                let policy = build_error_handling_policy(&exhausted);
                warn!(
                    retries = state.retries(),
                    solution = policy.solution(),
                    "retry budget exhausted"
                );
                emitter.emit_error(exhausted).await;
                return;
            }

            warn!(
                error = %err,
                retry = state.retries(),
                attempts_remaining = state.attempts_remaining(),
                "source failed, resubscribing"
            );

            if !self.delay.is_zero() {
                let subscription = emitter.subscription().clone();
                tokio::select! {
                    _ = subscription.cancelled() => return,
                    _ = tokio::time::sleep(self.delay) => {}
                }
            }
        }
    }
}
