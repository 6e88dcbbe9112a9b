//! Capacity bookkeeping.
//!
//! The ledger has no synchronization of its own; the queue mutates it only
//! while holding its state lock.

use serde::{Deserialize, Serialize};

/// Total and currently available resource units.
///
/// Invariant: `0 <= available_units <= total_units`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceLedger {
    total_units: f64,
    available_units: f64,
}

impl ResourceLedger {
    /// Create a ledger with all units available.
    #[must_use]
    pub const fn new(total_units: f64) -> Self {
        Self {
            total_units,
            available_units: total_units,
        }
    }

    /// Maximum capacity.
    #[must_use]
    pub const fn total_units(&self) -> f64 {
        self.total_units
    }

    /// Units not reserved by running jobs.
    #[must_use]
    pub const fn available_units(&self) -> f64 {
        self.available_units
    }

    /// Units reserved by running jobs.
    #[must_use]
    pub fn used_units(&self) -> f64 {
        self.total_units - self.available_units
    }

    /// Reserve `units` if they are available right now.
    pub fn try_reserve(&mut self, units: f64) -> bool {
        if units > self.available_units {
            return false;
        }
        self.available_units = (self.available_units - units).max(0.0);
        true
    }

    /// Return `units` to the pool, never exceeding the total.
    pub fn release(&mut self, units: f64) {
        self.available_units = (self.available_units + units).min(self.total_units);
    }

    /// Mark every unit available again.
    ///
    /// Called once nothing is running, which also discards any float drift
    /// accumulated by fractional reservations.
    pub fn reset(&mut self) {
        self.available_units = self.total_units;
    }
}
