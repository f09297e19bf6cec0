//! Monotonic slot numbers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Monotonic clock value used for vote window comparisons.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Slot(pub u64);

impl Slot {
    /// Slot `n` slots after this one, clamped at `u64::MAX`.
    pub fn saturating_add(self, n: u64) -> Slot {
        Slot(self.0.saturating_add(n))
    }

    /// Raw slot number.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for Slot {
    fn from(value: u64) -> Self {
        Slot(value)
    }
}

impl From<Slot> for u64 {
    fn from(slot: Slot) -> Self {
        slot.0
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
