//! Timer-driven counter source with an optional injected fault.
//!
//! [`IntervalPublisher`] emits `1, 2, 3, ...` on a fixed schedule. Each subscription starts a
//! fresh [`IntervalTimer`] and a fresh counter, so resubscribing always replays the sequence from
//! the beginning.
//!
//! After emitting a value the publisher checks it against the configured limit and then against
//! the fault point. Reaching the limit completes the stream, reaching the fault point fails it
//! with [`ErrorKind::SimulatedFault`]. In both cases the timer is cancelled exactly once before
//! the terminal signal is emitted.

use std::time::Duration;
use tracing::{debug, info};

use crate::bail;
use crate::concurrency::timer::IntervalTimer;
use crate::error::{ErrorKind, ReactorResult};
use crate::reactor_error;
use crate::stream::emitter::Emitter;
use crate::stream::publisher::Publisher;

/// Producer-side state of one emission run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmissionState {
    /// Last emitted value, `0` before the first tick.
    pub counter: u64,
    /// Value at which the stream completes.
    pub limit: u64,
    /// Value at which the stream fails, if any.
    pub fault_at: Option<u64>,
}

/// Transition taken after a value has been emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Continue,
    Complete,
    Fault,
}

impl EmissionState {
    fn new(limit: u64, fault_at: Option<u64>) -> Self {
        Self {
            counter: 0,
            limit,
            fault_at,
        }
    }

    /// Advances the counter and returns the value to emit.
    fn advance(&mut self) -> u64 {
        self.counter += 1;
        self.counter
    }

    fn step(&self) -> Step {
        if self.counter >= self.limit {
            Step::Complete
        } else if self.fault_at == Some(self.counter) {
            Step::Fault
        } else {
            Step::Continue
        }
    }
}

/// Cold source emitting an increasing counter on a fixed schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalPublisher {
    period: Duration,
    limit: u64,
    fault_at: Option<u64>,
}

impl IntervalPublisher {
    /// Creates a publisher that ticks every `period` and completes after emitting `limit`.
    ///
    /// Fails with [`ErrorKind::ValidationError`] when `period` is zero or `limit` is zero.
    pub fn new(period: Duration, limit: u64) -> ReactorResult<Self> {
        if period.is_zero() {
            bail!(
                ErrorKind::ValidationError,
                "Interval period must be positive",
                "period was 0"
            );
        }

        if limit == 0 {
            bail!(
                ErrorKind::ValidationError,
                "Interval limit must be at least 1",
                "limit was 0"
            );
        }

        Ok(Self {
            period,
            limit,
            fault_at: None,
        })
    }

    /// Injects a [`ErrorKind::SimulatedFault`] right after `fault_at` has been emitted.
    ///
    /// A fault point at or beyond the limit is never reached.
    pub fn with_fault_at(mut self, fault_at: u64) -> Self {
        self.fault_at = Some(fault_at);
        self
    }

    /// Returns the tick period.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Returns the value at which the stream completes.
    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Returns the value at which a fault is injected, if any.
    pub fn fault_at(&self) -> Option<u64> {
        self.fault_at
    }
}

impl Publisher<u64> for IntervalPublisher {
    async fn publish(self, emitter: &mut Emitter<u64>) {
        let mut state = EmissionState::new(self.limit, self.fault_at);
        let mut timer = IntervalTimer::start(self.period);
        let subscription = emitter.subscription().clone();

        debug!(
            period = ?self.period,
            limit = self.limit,
            fault_at = ?self.fault_at,
            "interval emission started"
        );

        loop {
            let tick = tokio::select! {
                biased;

                _ = subscription.cancelled() => None,
                tick = timer.tick() => tick,
            };

            if tick.is_none() {
                timer.cancel();
                debug!(counter = state.counter, "interval emission cancelled");
                return;
            }

            let value = state.advance();
            if let Err(err) = emitter.emit_next(value).await {
                timer.cancel();
                debug!(error = %err, counter = value, "interval emission stopped");
                return;
            }

            match state.step() {
                Step::Continue => {}
                Step::Complete => {
                    timer.cancel();
                    info!(counter = value, "interval emission reached its limit");
                    emitter.emit_complete().await;
                    return;
                }
                Step::Fault => {
                    timer.cancel();
                    info!(counter = value, "injecting simulated fault");
                    emitter
                        .emit_error(reactor_error!(
                            ErrorKind::SimulatedFault,
                            "Simulated fault injected into interval emission",
                            format!("fault at counter {value}")
                        ))
                        .await;
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::driver::subscribe;
    use crate::stream::signal::StreamOutcome;
    use crate::stream::subscriber::Collect;
    use tokio::time::Instant;

    #[test]
    fn invalid_parameters_are_rejected() {
        let zero_period = IntervalPublisher::new(Duration::ZERO, 10).err();
        let zero_limit = IntervalPublisher::new(Duration::from_millis(10), 0).err();

        assert_eq!(
            zero_period.map(|err| err.kind()),
            Some(ErrorKind::ValidationError)
        );
        assert_eq!(
            zero_limit.map(|err| err.kind()),
            Some(ErrorKind::ValidationError)
        );
    }

    #[test]
    fn limit_takes_precedence_over_fault() {
        let mut state = EmissionState::new(3, Some(3));
        state.advance();
        state.advance();
        assert_eq!(state.step(), Step::Continue);
        state.advance();
        assert_eq!(state.step(), Step::Complete);
    }

    #[tokio::test(start_paused = true)]
    async fn emits_counter_until_limit() {
        let start = Instant::now();
        let publisher = IntervalPublisher::new(Duration::from_millis(100), 10).unwrap();
        let mut subscriber = Collect::new();

        let outcome = subscribe(publisher, &mut subscriber).await;

        assert_eq!(outcome, StreamOutcome::Completed);
        assert_eq!(subscriber.into_items(), (1..=10).collect::<Vec<u64>>());
        assert!(start.elapsed() >= Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn fault_follows_the_faulting_value() {
        let publisher = IntervalPublisher::new(Duration::from_millis(100), 10)
            .unwrap()
            .with_fault_at(5);
        let mut subscriber = Collect::new();

        let outcome = subscribe(publisher, &mut subscriber).await;

        assert_eq!(
            outcome.error().map(|err| err.kind()),
            Some(ErrorKind::SimulatedFault)
        );
        assert_eq!(subscriber.terminal_count(), 1);
        assert_eq!(subscriber.into_items(), vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test(start_paused = true)]
    async fn fault_beyond_limit_is_never_reached() {
        let publisher = IntervalPublisher::new(Duration::from_millis(100), 4)
            .unwrap()
            .with_fault_at(7);
        let mut subscriber = Collect::new();

        let outcome = subscribe(publisher, &mut subscriber).await;

        assert_eq!(outcome, StreamOutcome::Completed);
        assert_eq!(subscriber.into_items(), vec![1, 2, 3, 4]);
    }
}
