//! Pure ballot box state.
//!
//! The box is either `Idle` or `Voting`; the phase is derived from whether a
//! proposed root is present, so the two can never disagree.

use std::collections::BTreeSet;

use ncn_core::{Hash32, OperatorId, Slot, StakeSnapshot};
use serde::{Deserialize, Serialize};

/// Phase of the ballot box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BallotPhase {
    /// No open proposal
    Idle,
    /// A proposal is open for votes
    Voting,
}

/// How a round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundOutcome {
    /// Quorum reached; the root became the finalized root
    Finalized,
    /// Window passed without quorum; the root was discarded
    Expired,
}

/// Record of the most recently resolved round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResolution {
    /// Round number
    pub round: u64,
    /// Root that was voted on
    pub root: Hash32,
    /// Finalized or expired
    pub outcome: RoundOutcome,
    /// Approved weight at resolution
    pub approved_weight: u64,
    /// Snapshot total for the round
    pub total_eligible_weight: u64,
    /// Slot of the evaluation that resolved the round
    pub resolved_at: Slot,
}

/// Singleton ballot box with rotating per-round state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallotBox {
    /// Number of proposals ever opened; the current or last round's number
    pub round: u64,
    /// Candidate root, present only while voting
    pub proposed_root: Option<Hash32>,
    /// Last root that reached quorum; the source of truth for claims
    pub finalized_root: Option<Hash32>,
    /// Round in which `finalized_root` was finalized
    pub finalized_round: Option<u64>,
    /// Operators that voted this round, yes or no
    pub voted_operators: BTreeSet<OperatorId>,
    /// Per-operator weights frozen when the round opened
    pub stake_snapshot: StakeSnapshot,
    /// Snapshot weight of "yes" votes
    pub approved_weight: u64,
    /// Snapshot weight of "no" votes
    pub rejected_weight: u64,
    /// Sum of `stake_snapshot`, frozen when the round opened
    pub total_eligible_weight: u64,
    /// Slot the current round opened
    pub opened_at: Slot,
    /// Outcome of the most recently resolved round
    pub last_resolution: Option<RoundResolution>,
}

impl BallotBox {
    /// Fresh idle box with nothing finalized.
    pub fn new() -> Self {
        Self::default()
    }

    /// Voting while a root is proposed, idle otherwise.
    pub fn phase(&self) -> BallotPhase {
        if self.proposed_root.is_some() {
            BallotPhase::Voting
        } else {
            BallotPhase::Idle
        }
    }

    /// Shorthand for `phase() == Voting`.
    pub fn is_voting(&self) -> bool {
        self.phase() == BallotPhase::Voting
    }

    /// Last slot at which votes are still accepted.
    pub fn vote_deadline(&self, vote_window: u64) -> Slot {
        self.opened_at.saturating_add(vote_window)
    }

    /// True once `now` is past the deadline.
    pub fn window_expired(&self, vote_window: u64, now: Slot) -> bool {
        now > self.vote_deadline(vote_window)
    }

    /// Whether `operator` already voted this round.
    pub fn has_voted(&self, operator: &OperatorId) -> bool {
        self.voted_operators.contains(operator)
    }

    /// Weight `operator` carries in the current round.
    pub fn snapshot_weight(&self, operator: &OperatorId) -> u64 {
        self.stake_snapshot.weight_of(operator)
    }

    /// Reset per-round fields and open voting on `root`.
    pub(crate) fn open_round(&mut self, root: Hash32, snapshot: StakeSnapshot, total: u64, now: Slot) {
        self.round += 1;
        self.proposed_root = Some(root);
        self.voted_operators.clear();
        self.stake_snapshot = snapshot;
        self.approved_weight = 0;
        self.rejected_weight = 0;
        self.total_eligible_weight = total;
        self.opened_at = now;
    }
}
