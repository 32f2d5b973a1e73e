use crate::bail;
use crate::error::{ErrorKind, ReactorResult};

/// Demand signal used for backpressure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Demand {
    /// Finite demand with remaining count.
    Finite(u64),
    /// Unbounded demand.
    Unbounded,
}

impl Demand {
    /// Returns `true` if the demand is unbounded.
    pub const fn is_unbounded(&self) -> bool {
        matches!(self, Self::Unbounded)
    }

    /// Returns `true` if there is remaining demand.
    pub const fn has_demand(&self) -> bool {
        matches!(self, Self::Unbounded) || matches!(self, Self::Finite(remaining) if *remaining > 0)
    }

    /// Returns the remaining finite demand, if any.
    pub const fn remaining(&self) -> Option<u64> {
        match self {
            Self::Finite(value) => Some(*value),
            Self::Unbounded => None,
        }
    }
}

/// Tracks a running demand balance.
///
/// Requests add to the balance and every delivered item consumes one unit. A request of
/// [`u64::MAX`], or any request that would overflow the balance, switches the tracker to
/// [`Demand::Unbounded`] for the rest of its life.
#[derive(Debug, Clone)]
pub struct DemandTracker {
    current: Demand,
}

impl DemandTracker {
    /// Creates a new demand tracker with zero demand.
    pub const fn new() -> Self {
        Self {
            current: Demand::Finite(0),
        }
    }

    /// Returns the current demand value.
    pub const fn current(&self) -> Demand {
        self.current
    }

    /// Adds demand to the tracker.
    ///
    /// Returns [`ErrorKind::InvalidDemand`] when `amount` is zero.
    pub fn request(&mut self, amount: u64) -> ReactorResult<Demand> {
        if amount == 0 {
            bail!(
                ErrorKind::InvalidDemand,
                "Demand requests must be positive",
                "requested 0 items"
            );
        }

        self.current = match self.current {
            Demand::Unbounded => Demand::Unbounded,
            Demand::Finite(_) if amount == u64::MAX => Demand::Unbounded,
            Demand::Finite(current) => match current.checked_add(amount) {
                Some(total) => Demand::Finite(total),
                None => Demand::Unbounded,
            },
        };

        Ok(self.current)
    }

    /// Consumes a single unit of demand when available.
    #[must_use]
    pub fn consume_one(&mut self) -> bool {
        match self.current {
            Demand::Unbounded => true,
            Demand::Finite(value) if value > 0 => {
                self.current = Demand::Finite(value - 1);
                true
            }
            Demand::Finite(_) => false,
        }
    }
}

impl Default for DemandTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_without_demand() {
        let mut tracker = DemandTracker::new();

        assert_eq!(tracker.current(), Demand::Finite(0));
        assert!(!tracker.current().has_demand());
        assert!(!tracker.consume_one());
    }

    #[test]
    fn request_accumulates_and_consume_decrements() {
        let mut tracker = DemandTracker::new();
        tracker.request(2).unwrap();
        tracker.request(3).unwrap();

        assert_eq!(tracker.current().remaining(), Some(5));
        for _ in 0..5 {
            assert!(tracker.consume_one());
        }
        assert!(!tracker.consume_one());
    }

    #[test]
    fn zero_request_is_rejected() {
        let mut tracker = DemandTracker::new();
        let err = tracker.request(0).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidDemand);
        assert_eq!(tracker.current(), Demand::Finite(0));
    }

    #[test]
    fn max_request_and_overflow_become_unbounded() {
        let mut tracker = DemandTracker::new();
        assert_eq!(tracker.request(u64::MAX).unwrap(), Demand::Unbounded);

        let mut tracker = DemandTracker::new();
        tracker.request(u64::MAX - 1).unwrap();
        assert_eq!(tracker.request(2).unwrap(), Demand::Unbounded);
        assert!(tracker.consume_one());
        assert!(tracker.current().is_unbounded());
    }
}
