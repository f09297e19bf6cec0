//! Effectful ballot box coordinator.
//!
//! Wraps the pure core with the stake registry and the clock. Config and box
//! live behind one async mutex, so `propose`, `vote`, `check_consensus` and
//! `rotate_authority` are serialized critical sections and never interleave
//! their read-modify-write.

use ncn_core::{
    AccountId, ClockEffects, Hash32, NcnConfig, NcnError, OperatorId, Result,
    StakeRegistryEffects,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::core::state::BallotBox;
use crate::core::transitions::{self, ConsensusOutcome, VoteReceipt};
use crate::core::validation::check_invariants;

/// Persisted state surfaces owned by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallotState {
    /// Live configuration, including the current authority
    pub config: NcnConfig,
    /// The singleton ballot box
    pub ballot: BallotBox,
}

/// Serializes ballot box entry points and resolves their effects.
#[derive(Debug)]
pub struct BallotCoordinator<R, C> {
    registry: R,
    clock: C,
    state: Mutex<BallotState>,
}

impl<R, C> BallotCoordinator<R, C>
where
    R: StakeRegistryEffects,
    C: ClockEffects,
{
    /// Validate `config` and start with an idle box.
    pub fn initialize(config: NcnConfig, registry: R, clock: C) -> Result<Self> {
        let (config, ballot) = transitions::initialize(config)?;
        let quorum = format!(
            "{}/{}",
            config.quorum_threshold.numerator, config.quorum_threshold.denominator
        );
        info!(
            authority = %config.authority,
            vote_window = config.vote_window,
            quorum = %quorum,
            "Ballot box initialized"
        );
        Self::from_state(BallotState { config, ballot }, registry, clock)
    }

    /// Resume from previously persisted state.
    ///
    /// The config must validate and the box must satisfy every invariant;
    /// a stored 0/1 threshold would otherwise finalize rounds with no votes.
    pub fn from_state(state: BallotState, registry: R, clock: C) -> Result<Self> {
        state.config.validate()?;
        check_invariants(&state.ballot)?;
        Ok(Self {
            registry,
            clock,
            state: Mutex::new(state),
        })
    }

    /// Open a round on `candidate_root`, snapshotting stake from the registry.
    pub async fn propose(&self, caller: &AccountId, candidate_root: Hash32) -> Result<u64> {
        let mut state = self.state.lock().await;

        if !self.registry.is_authority(caller).await? {
            warn!(caller = %caller, "Propose rejected: registry does not recognise authority");
            return Err(NcnError::unauthorized("caller is not the registry authority"));
        }

        let snapshot = self.registry.stake_snapshot().await?;
        let now = self.clock.now().await?;
        let BallotState { config, ballot } = &mut *state;

        match transitions::propose(config, ballot, caller, candidate_root, snapshot, now) {
            Ok(round) => {
                info!(
                    round,
                    root = %candidate_root,
                    opened_at = %now,
                    total_weight = ballot.total_eligible_weight,
                    operators = ballot.stake_snapshot.weights.len(),
                    "Round opened"
                );
                Ok(round)
            }
            Err(err) => {
                warn!(caller = %caller, error = %err, "Propose rejected");
                Err(err)
            }
        }
    }

    /// Cast `operator`'s single vote for the open round.
    pub async fn vote(&self, operator: &OperatorId, approve: bool) -> Result<VoteReceipt> {
        let mut state = self.state.lock().await;
        let now = self.clock.now().await?;
        let BallotState { config, ballot } = &mut *state;

        match transitions::vote(config, ballot, operator, approve, now) {
            Ok(receipt) => {
                debug!(
                    round = receipt.round,
                    operator = %operator,
                    approve,
                    weight = receipt.weight,
                    approved_weight = receipt.approved_weight,
                    "Vote recorded"
                );
                Ok(receipt)
            }
            Err(err) => {
                warn!(operator = %operator, error = %err, "Vote rejected");
                Err(err)
            }
        }
    }

    /// Evaluate quorum or expiry. Any caller may trigger this.
    pub async fn check_consensus(&self) -> Result<ConsensusOutcome> {
        let mut state = self.state.lock().await;
        let now = self.clock.now().await?;
        let BallotState { config, ballot } = &mut *state;

        let outcome = transitions::check_consensus(config, ballot, now);
        match outcome {
            ConsensusOutcome::Finalized { round, root } => {
                info!(round, root = %root, "Consensus reached, root finalized");
            }
            ConsensusOutcome::Expired {
                round,
                root,
                approved_weight,
                total_eligible_weight,
            } => {
                warn!(
                    round,
                    root = %root,
                    approved_weight,
                    total_eligible_weight,
                    "Round expired without quorum"
                );
            }
            ConsensusOutcome::Pending {
                approved_weight,
                total_eligible_weight,
            } => {
                debug!(approved_weight, total_eligible_weight, "Quorum not yet reached");
            }
            ConsensusOutcome::Idle => debug!("Consensus check on idle ballot box"),
        }
        Ok(outcome)
    }

    /// Hand the authority role to `new_authority`.
    pub async fn rotate_authority(&self, caller: &AccountId, new_authority: AccountId) -> Result<()> {
        let mut state = self.state.lock().await;
        match state.config.rotate_authority(caller, new_authority) {
            Ok(()) => {
                info!(from = %caller, to = %new_authority, "Authority rotated");
                Ok(())
            }
            Err(err) => {
                warn!(caller = %caller, error = %err, "Authority rotation rejected");
                Err(err)
            }
        }
    }

    /// Root currently authoritative for reward claims.
    pub async fn finalized_root(&self) -> Option<Hash32> {
        self.state.lock().await.ballot.finalized_root
    }

    /// Copy of the full state for persistence or inspection.
    pub async fn snapshot(&self) -> BallotState {
        self.state.lock().await.clone()
    }
}
