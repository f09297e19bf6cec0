//! Primitive domain types.

pub mod identifiers;
pub mod time;

pub use identifiers::{AccountId, BeneficiaryId, Hash32, OperatorId};
pub use time::Slot;
