//! Pure ballot box transitions.
//!
//! Every transition validates all preconditions before touching the box, so
//! a rejected call leaves it bit-for-bit unchanged. Time and stake arrive as
//! arguments; nothing here reads a clock or a registry.
//!
//! ```text
//!            propose                 check_consensus (quorum | expiry)
//!   Idle ─────────────▶ Voting ───────────────────────────────────────▶ Idle
//!                         │ ▲
//!                         └─┘ vote
//! ```

use ncn_core::{AccountId, Hash32, NcnConfig, NcnError, OperatorId, Result, Slot, StakeSnapshot};
use serde::{Deserialize, Serialize};

use super::state::{BallotBox, RoundOutcome, RoundResolution};
use super::validation::debug_assert_invariants;

/// Result of a `check_consensus` evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConsensusOutcome {
    /// No round was open; nothing changed
    Idle,
    /// Quorum not reached and window still open; nothing changed
    Pending {
        /// Approved weight so far
        approved_weight: u64,
        /// Snapshot total for the round
        total_eligible_weight: u64,
    },
    /// Quorum reached; `root` is now the finalized root
    Finalized {
        /// Round that finalized
        round: u64,
        /// Newly finalized root
        root: Hash32,
    },
    /// Window passed without quorum; the proposal was discarded
    Expired {
        /// Round that expired
        round: u64,
        /// Discarded candidate root
        root: Hash32,
        /// Approved weight when the window closed
        approved_weight: u64,
        /// Snapshot total for the round
        total_eligible_weight: u64,
    },
}

impl ConsensusOutcome {
    /// Surface non-finalizing outcomes as errors.
    pub fn require_finalized(self) -> Result<Hash32> {
        match self {
            ConsensusOutcome::Finalized { root, .. } => Ok(root),
            ConsensusOutcome::Idle => Err(NcnError::NoOpenRound),
            ConsensusOutcome::Pending {
                approved_weight,
                total_eligible_weight,
            } => Err(NcnError::QuorumNotReached {
                approved: approved_weight,
                total: total_eligible_weight,
            }),
            ConsensusOutcome::Expired {
                approved_weight,
                total_eligible_weight,
                ..
            } => Err(NcnError::QuorumNotReached {
                approved: approved_weight,
                total: total_eligible_weight,
            }),
        }
    }

    /// Whether this evaluation moved the box back to idle.
    pub fn resolved_round(&self) -> bool {
        matches!(
            self,
            ConsensusOutcome::Finalized { .. } | ConsensusOutcome::Expired { .. }
        )
    }
}

/// Accepted vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteReceipt {
    /// Round the vote counted in
    pub round: u64,
    /// Voting operator
    pub operator: OperatorId,
    /// Approve or reject
    pub approve: bool,
    /// Snapshot weight of the voter
    pub weight: u64,
    /// Running approved weight after this vote
    pub approved_weight: u64,
}

/// Validate `config` and create an idle ballot box.
pub fn initialize(config: NcnConfig) -> Result<(NcnConfig, BallotBox)> {
    config.validate()?;
    Ok((config, BallotBox::new()))
}

/// Open a round on `candidate_root`.
///
/// Preconditions:
/// - `caller` is the configured authority
/// - the box is idle
/// - `snapshot` carries non-zero total stake
///
/// Effects: clears the voter set, zeroes tallies, freezes `snapshot` and its
/// total, records `now` as the opening slot.
pub fn propose(
    config: &NcnConfig,
    ballot: &mut BallotBox,
    caller: &AccountId,
    candidate_root: Hash32,
    snapshot: StakeSnapshot,
    now: Slot,
) -> Result<u64> {
    if caller != &config.authority {
        return Err(NcnError::unauthorized("only the authority may propose"));
    }
    if ballot.is_voting() {
        return Err(NcnError::RoundAlreadyOpen);
    }
    let total = snapshot.total_weight()?;
    if total == 0 {
        return Err(NcnError::NoEligibleStake);
    }

    ballot.open_round(candidate_root, snapshot, total, now);
    debug_assert_invariants(ballot);
    Ok(ballot.round)
}

/// Record one operator's vote.
///
/// Preconditions, checked in order:
/// - a round is open (`NoOpenRound`)
/// - `now <= opened_at + vote_window` (`VoteWindowExpired`)
/// - the operator has non-zero snapshot weight (`NotEligible`)
/// - the operator has not voted this round (`DuplicateVote`)
///
/// A "no" vote still uses up the operator's vote but adds no approval.
pub fn vote(
    config: &NcnConfig,
    ballot: &mut BallotBox,
    operator: &OperatorId,
    approve: bool,
    now: Slot,
) -> Result<VoteReceipt> {
    if !ballot.is_voting() {
        return Err(NcnError::NoOpenRound);
    }
    if ballot.window_expired(config.vote_window, now) {
        return Err(NcnError::VoteWindowExpired {
            expired_at: ballot.vote_deadline(config.vote_window).get(),
            now: now.get(),
        });
    }
    let weight = ballot.snapshot_weight(operator);
    if weight == 0 {
        return Err(NcnError::not_eligible(format!(
            "operator {operator} has no stake in round {}",
            ballot.round
        )));
    }
    if ballot.has_voted(operator) {
        return Err(NcnError::DuplicateVote {
            round: ballot.round,
        });
    }

    let (approved, rejected) = if approve {
        let approved = ballot
            .approved_weight
            .checked_add(weight)
            .ok_or_else(|| NcnError::overflow("approved weight"))?;
        (approved, ballot.rejected_weight)
    } else {
        let rejected = ballot
            .rejected_weight
            .checked_add(weight)
            .ok_or_else(|| NcnError::overflow("rejected weight"))?;
        (ballot.approved_weight, rejected)
    };

    ballot.approved_weight = approved;
    ballot.rejected_weight = rejected;
    ballot.voted_operators.insert(*operator);
    debug_assert_invariants(ballot);

    Ok(VoteReceipt {
        round: ballot.round,
        operator: *operator,
        approve,
        weight,
        approved_weight: approved,
    })
}

/// Evaluate the open round. Callable by anyone.
///
/// Quorum finalizes even before the window closes. Without quorum, a round
/// past its window expires and the previous finalized root stays in force.
pub fn check_consensus(config: &NcnConfig, ballot: &mut BallotBox, now: Slot) -> ConsensusOutcome {
    let Some(root) = ballot.proposed_root else {
        return ConsensusOutcome::Idle;
    };

    let outcome = if config
        .quorum_threshold
        .is_met(ballot.approved_weight, ballot.total_eligible_weight)
    {
        ballot.finalized_root = Some(root);
        ballot.finalized_round = Some(ballot.round);
        RoundOutcome::Finalized
    } else if ballot.window_expired(config.vote_window, now) {
        RoundOutcome::Expired
    } else {
        return ConsensusOutcome::Pending {
            approved_weight: ballot.approved_weight,
            total_eligible_weight: ballot.total_eligible_weight,
        };
    };

    ballot.proposed_root = None;
    ballot.last_resolution = Some(RoundResolution {
        round: ballot.round,
        root,
        outcome,
        approved_weight: ballot.approved_weight,
        total_eligible_weight: ballot.total_eligible_weight,
        resolved_at: now,
    });
    debug_assert_invariants(ballot);

    match outcome {
        RoundOutcome::Finalized => ConsensusOutcome::Finalized {
            round: ballot.round,
            root,
        },
        RoundOutcome::Expired => ConsensusOutcome::Expired {
            round: ballot.round,
            root,
            approved_weight: ballot.approved_weight,
            total_eligible_weight: ballot.total_eligible_weight,
        },
    }
}
