//! Pure, effect-free ballot box core.
//!
//! 1. Pure functions over `&mut BallotBox`; time and stake are arguments
//! 2. All preconditions are checked before the first write
//! 3. Deterministic: same inputs always produce the same box

pub mod state;
pub mod transitions;
pub mod validation;

pub use state::{BallotBox, BallotPhase, RoundOutcome, RoundResolution};
pub use transitions::{check_consensus, initialize, propose, vote, ConsensusOutcome, VoteReceipt};
pub use validation::check_invariants;
