//! Effect interfaces for external collaborators.
//!
//! - `StakeRegistryEffects`: operator stake weights and authority identity
//! - `TokenLedgerEffects`: token transfers out of the rewards reserve
//! - `ClockEffects`: monotonic slot source for vote window expiry
//!
//! Only signatures live here; in-memory handlers are in `ncn-testkit` and
//! the CLI.

pub mod ledger;
pub mod registry;
pub mod time;

pub use ledger::{LedgerError, TokenLedgerEffects};
pub use registry::{StakeRegistryEffects, StakeSnapshot};
pub use time::ClockEffects;
