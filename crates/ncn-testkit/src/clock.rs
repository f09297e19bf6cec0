//! Manually advanced clock.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use ncn_core::{ClockEffects, Result, Slot};

/// Clock that only moves when a test moves it.
#[derive(Debug, Default)]
pub struct ManualClock {
    slot: AtomicU64,
}

impl ManualClock {
    /// Clock starting at slot `start`.
    pub fn new(start: u64) -> Self {
        Self {
            slot: AtomicU64::new(start),
        }
    }

    /// Jump to `slot`.
    pub fn set(&self, slot: u64) {
        self.slot.store(slot, Ordering::SeqCst);
    }

    /// Move forward by `slots`.
    pub fn advance(&self, slots: u64) {
        self.slot.fetch_add(slots, Ordering::SeqCst);
    }

    /// Slot without going through the effect trait.
    pub fn current(&self) -> Slot {
        Slot(self.slot.load(Ordering::SeqCst))
    }
}

#[async_trait]
impl ClockEffects for ManualClock {
    async fn now(&self) -> Result<Slot> {
        Ok(self.current())
    }
}
