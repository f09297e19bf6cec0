//! NCN Core - foundation types for the ballot box and reward engine
//!
//! Pure building blocks shared by the consensus and rewards crates:
//!
//! - **types**: `AccountId`, `Hash32`, `Slot`
//! - **crypto**: global hash algorithm and the Merkle engine
//! - **config**: deployment configuration and quorum arithmetic
//! - **effects**: async interfaces to the stake registry, token ledger and clock
//! - **errors**: the unified `NcnError`
//!
//! Nothing in this crate performs I/O except configuration file loading.

#![forbid(unsafe_code)]

pub mod config;
pub mod crypto;
pub mod effects;
pub mod errors;
pub mod types;

pub use config::{NcnConfig, QuorumThreshold};
pub use crypto::{MerkleProof, MerkleTree};
pub use effects::{ClockEffects, LedgerError, StakeRegistryEffects, StakeSnapshot, TokenLedgerEffects};
pub use errors::{NcnError, Result};
pub use types::{AccountId, BeneficiaryId, Hash32, OperatorId, Slot};
