//! Clock interface.
//!
//! Vote window expiry is an explicit comparison against `now()`; nothing in
//! the core sleeps or waits.

use async_trait::async_trait;

use crate::errors::Result;
use crate::types::Slot;

/// Source of the current slot.
#[async_trait]
pub trait ClockEffects: Send + Sync {
    /// Current monotonic slot.
    async fn now(&self) -> Result<Slot>;
}

/// Blanket implementation for Arc<T> where T: ClockEffects
#[async_trait]
impl<T: ClockEffects + ?Sized> ClockEffects for std::sync::Arc<T> {
    async fn now(&self) -> Result<Slot> {
        (**self).now().await
    }
}
