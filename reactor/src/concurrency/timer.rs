//! Repeating timer used to drive scheduled emission.
//!
//! [`IntervalTimer`] wraps a tokio [`Interval`] whose first tick fires one period after the
//! timer is started, matching a fixed-rate schedule with an initial delay equal to the period.
//! Cancellation is idempotent: only the first call to [`IntervalTimer::cancel`] has an effect,
//! and a cancelled timer never ticks again.
//!
//! No panics are expected from this module as long as the period is non-zero, which callers
//! validate through configuration.

use std::time::Duration;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};

/// A repeating timer with idempotent cancellation.
#[derive(Debug)]
pub struct IntervalTimer {
    /// The active schedule, or `None` once cancelled.
    interval: Option<Interval>,
    /// Number of ticks delivered since the timer was started.
    ticks: u64,
}

impl IntervalTimer {
    /// Starts a timer that ticks every `period`, the first tick firing after one `period`.
    ///
    /// Missed ticks are delayed rather than bursted, so a slow consumer never receives a backlog
    /// of ticks at once.
    pub fn start(period: Duration) -> Self {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        Self {
            interval: Some(interval),
            ticks: 0,
        }
    }

    /// Waits for the next tick.
    ///
    /// Returns the tick number (starting at 1), or `None` when the timer has been cancelled.
    pub async fn tick(&mut self) -> Option<u64> {
        let interval = self.interval.as_mut()?;
        interval.tick().await;
        self.ticks += 1;

        Some(self.ticks)
    }

    /// Cancels the timer.
    ///
    /// Returns `true` if this call cancelled the timer and `false` if it was already cancelled.
    pub fn cancel(&mut self) -> bool {
        self.interval.take().is_some()
    }

    /// Returns `true` once the timer has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.interval.is_none()
    }

    /// Returns the number of ticks delivered so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
