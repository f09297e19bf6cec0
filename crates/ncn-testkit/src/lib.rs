//! Test utilities for the NCN workspace.
//!
//! In-memory handlers for every effect trait plus deterministic fixtures.
//! Handlers use interior mutability so tests can reshape the world (advance
//! the clock, change delegations, break the ledger) while a coordinator or
//! distributor holds them behind an `Arc`.

pub mod clock;
pub mod fixtures;
pub mod ledger;
pub mod registry;

pub use clock::ManualClock;
pub use fixtures::{account, root};
pub use ledger::{InMemoryTokenLedger, TransferRecord};
pub use registry::InMemoryStakeRegistry;
