use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::bail;
use crate::concurrency::demand::{Demand, DemandTracker};
use crate::error::{ErrorKind, ReactorResult};

/// Demand bookkeeping shared by the producer and the consumer of one subscription.
#[derive(Debug)]
struct DemandState {
    /// Demand the producer may still draw from before it has to wait.
    available: DemandTracker,
    /// Demand granted to the producer but not yet delivered to the consumer.
    outstanding: DemandTracker,
    /// Replenishment queued by the consumer, granted once `available` runs dry.
    pending: Option<u64>,
    /// Number of grants that reached the producer.
    grants: u64,
    /// Items drawn by the producer and not yet acknowledged by the consumer.
    in_flight: u64,
    /// Highest value `in_flight` ever reached.
    peak_in_flight: u64,
    /// Whether [`Subscription::cancel`] has been called.
    cancelled: bool,
}

impl DemandState {
    fn grant(&mut self, amount: u64) -> ReactorResult<()> {
        self.available.request(amount)?;
        self.outstanding.request(amount)?;
        self.grants += 1;

        Ok(())
    }
}

#[derive(Debug)]
struct Inner {
    state: Mutex<DemandState>,
    demand_available: Notify,
    cancellation: CancellationToken,
}

/// Demand handle shared by exactly one producer and one consumer.
///
/// The consumer grants demand with [`Subscription::request`] or queues it with
/// [`Subscription::replenish`]. The producer draws one unit per item before delivering it, so an
/// item is never sent unless the consumer has outstanding demand for it. Cloning the handle is
/// cheap and every clone refers to the same subscription.
#[derive(Debug, Clone)]
pub struct Subscription {
    inner: Arc<Inner>,
}

impl Subscription {
    /// Creates a new subscription with no demand.
    pub fn new() -> Self {
        let state = DemandState {
            available: DemandTracker::new(),
            outstanding: DemandTracker::new(),
            pending: None,
            grants: 0,
            in_flight: 0,
            peak_in_flight: 0,
            cancelled: false,
        };

        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(state),
                demand_available: Notify::new(),
                cancellation: CancellationToken::new(),
            }),
        }
    }

    /// Grants `amount` units of demand to the producer immediately.
    ///
    /// Requesting [`u64::MAX`] switches the subscription to unbounded demand. A request of zero
    /// fails with [`ErrorKind::InvalidDemand`]. Requests after cancellation are ignored.
    pub fn request(&self, amount: u64) -> ReactorResult<()> {
        {
            let mut state = self.lock_state();
            if state.cancelled {
                return Ok(());
            }

            state.grant(amount)?;
        }

        self.inner.demand_available.notify_one();

        Ok(())
    }

    /// Queues `amount` units of demand that are granted only when the producer has used up its
    /// current demand and needs more.
    ///
    /// If the source terminates before it needs the queued demand, the grant never happens.
    /// Several replenishments queued before the producer needs them are merged into one grant.
    pub fn replenish(&self, amount: u64) -> ReactorResult<()> {
        if amount == 0 {
            bail!(
                ErrorKind::InvalidDemand,
                "Demand requests must be positive",
                "replenished 0 items"
            );
        }

        {
            let mut state = self.lock_state();
            if state.cancelled {
                return Ok(());
            }

            state.pending = Some(state.pending.unwrap_or(0).saturating_add(amount));
        }

        self.inner.demand_available.notify_one();

        Ok(())
    }

    /// Cancels the subscription.
    ///
    /// Returns `true` if this call performed the cancellation and `false` if the subscription
    /// was already cancelled. A producer waiting for demand is woken up and fails with
    /// [`ErrorKind::StreamCancelled`].
    pub fn cancel(&self) -> bool {
        {
            let mut state = self.lock_state();
            if state.cancelled {
                return false;
            }
            state.cancelled = true;
            state.pending = None;
        }

        self.inner.cancellation.cancel();
        debug!("subscription cancelled");

        true
    }

    /// Returns `true` once the subscription has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancellation.is_cancelled()
    }

    /// Resolves once the subscription has been cancelled.
    pub async fn cancelled(&self) {
        self.inner.cancellation.cancelled().await;
    }

    /// Returns the number of demand grants that reached the producer.
    pub fn grants(&self) -> u64 {
        self.lock_state().grants
    }

    /// Returns the demand granted to the producer that has not been delivered yet.
    pub fn outstanding(&self) -> Demand {
        self.lock_state().outstanding.current()
    }

    /// Returns the highest number of items that were drawn by the producer but not yet
    /// acknowledged by the consumer at the same time.
    pub fn peak_in_flight(&self) -> u64 {
        self.lock_state().peak_in_flight
    }

    /// Waits until one unit of demand is available and draws it.
    ///
    /// Fails with [`ErrorKind::StreamCancelled`] if the subscription is cancelled first.
    pub(crate) async fn acquire(&self) -> ReactorResult<()> {
        loop {
            if self.is_cancelled() {
                bail!(
                    ErrorKind::StreamCancelled,
                    "Subscription was cancelled while waiting for demand"
                );
            }

            if self.try_acquire()? {
                return Ok(());
            }

            tokio::select! {
                _ = self.inner.demand_available.notified() => {}
                _ = self.inner.cancellation.cancelled() => {}
            }
        }
    }

    /// Draws one unit of demand without waiting, granting queued replenishment if needed.
    fn try_acquire(&self) -> ReactorResult<bool> {
        let mut state = self.lock_state();

        if !state.available.consume_one() {
            let Some(amount) = state.pending.take() else {
                return Ok(false);
            };

            state.grant(amount)?;
            if !state.available.consume_one() {
                return Ok(false);
            }
        }

        state.in_flight += 1;
        state.peak_in_flight = state.peak_in_flight.max(state.in_flight);

        Ok(true)
    }

    /// Records the delivery of one item to the consumer.
    ///
    /// Fails with [`ErrorKind::BackpressureViolation`] if the item was delivered without
    /// outstanding demand.
    pub(crate) fn acknowledge(&self) -> ReactorResult<()> {
        let mut state = self.lock_state();

        if !state.outstanding.consume_one() {
            bail!(
                ErrorKind::BackpressureViolation,
                "Item delivered without outstanding demand",
                format!("{} grants issued so far", state.grants)
            );
        }
        state.in_flight = state.in_flight.saturating_sub(1);

        Ok(())
    }

    fn lock_state(&self) -> MutexGuard<'_, DemandState> {
        // The state is only mutated by short non-panicking sections, so a poisoned lock still
        // holds consistent data.
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Subscription {
    fn default() -> Self {
        Self::new()
    }
}
