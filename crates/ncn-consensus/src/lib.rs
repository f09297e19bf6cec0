//! # NCN Consensus - Stake-Weighted Ballot Box
//!
//! An authority proposes a 32-byte reward root, eligible operators cast one
//! weighted vote each, and anyone may trigger evaluation. Approval by at
//! least the quorum fraction of total eligible stake finalizes the root;
//! otherwise the round expires once its vote window passes and the previous
//! finalized root stays in force.
//!
//! ## Architecture
//!
//! - **core**: pure state machine (`BallotBox`, `propose`, `vote`,
//!   `check_consensus`) and its invariants
//! - **coordinator**: `BallotCoordinator`, which serializes entry points and
//!   resolves the stake registry and clock
//!
//! ## Weight snapshotting
//!
//! Per-operator weights and their total are copied into the box when a round
//! opens. Votes are weighted from that copy, never from a live registry read,
//! so delegation changes mid-round cannot alter a round in progress.

#![deny(clippy::dbg_macro)]
#![deny(clippy::todo)]

pub mod coordinator;
pub mod core;

pub use crate::coordinator::{BallotCoordinator, BallotState};
pub use crate::core::{
    check_invariants, BallotBox, BallotPhase, ConsensusOutcome, RoundOutcome, RoundResolution,
    VoteReceipt,
};
