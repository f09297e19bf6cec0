//! NCN Rewards - cumulative reward claims against a finalized Merkle root
//!
//! Leaves commit to the *total* amount ever owed to a beneficiary. A claim
//! pays the difference between that total and what was already paid, so a
//! beneficiary can skip rounds and never be paid twice.
//!
//! - **leaf**: `RewardLeaf` hashing and `RewardsTree` proof lookup
//! - **ledger**: pure claim records and the prepare/commit split
//! - **distributor**: effectful claims through the token ledger

#![deny(clippy::dbg_macro)]
#![deny(clippy::todo)]

pub mod distributor;
pub mod leaf;
pub mod ledger;

pub use crate::distributor::RewardDistributor;
pub use crate::leaf::{reward_leaf_hash, RewardLeaf, RewardsTree};
pub use crate::ledger::{ClaimPlan, ClaimRequest, RewardClaimRecord, RewardLedger};
