//! `ncn simulate`: drive ballot rounds and claims through the real
//! coordinator and distributor over local effect handlers.
//!
//! Rejected steps are recorded in the report by error code and do not stop
//! the run; only malformed input aborts it.

use std::sync::Arc;

use anyhow::Result;
use ncn_consensus::{BallotCoordinator, ConsensusOutcome};
use ncn_core::{AccountId, BeneficiaryId, Hash32, NcnConfig, OperatorId};
use ncn_rewards::{RewardClaimRecord, RewardDistributor, RewardsTree};
use serde::Serialize;
use tracing::info;

use crate::effects::{LocalClock, LocalStakeRegistry, LocalTokenLedger};
use crate::scenario::Scenario;

/// One vote step and what the coordinator made of it.
#[derive(Debug, Clone, Serialize)]
pub struct VoteReport {
    /// Voting operator
    pub operator: OperatorId,
    /// Approve or reject
    pub approve: bool,
    /// Slot the vote was cast at
    pub slot: u64,
    /// Stake counted for the vote when accepted
    pub weight: Option<u64>,
    /// Error code when rejected
    pub error: Option<&'static str>,
}

/// One claim attempt.
#[derive(Debug, Clone, Serialize)]
pub struct ClaimReport {
    /// Claiming beneficiary
    pub beneficiary: BeneficiaryId,
    /// Amount transferred on success
    pub paid: Option<u64>,
    /// Error code when rejected
    pub error: Option<&'static str>,
}

/// Everything that happened in one scenario round.
#[derive(Debug, Clone, Serialize)]
pub struct RoundReport {
    /// Root of the tree built from the round's leaves
    pub candidate_root: Hash32,
    /// Round number assigned on a successful proposal
    pub round: Option<u64>,
    /// Error code when the proposal was rejected
    pub propose_error: Option<&'static str>,
    /// Vote steps in scenario order
    pub votes: Vec<VoteReport>,
    /// Result of the consensus check at `check_at`
    pub outcome: ConsensusOutcome,
    /// Finalized root after the check
    pub finalized_root: Option<Hash32>,
    /// Claim steps in scenario order
    pub claims: Vec<ClaimReport>,
}

/// Output of `ncn simulate`.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    /// Effective configuration
    pub config: NcnConfig,
    /// Reward reserve account
    pub reserve: AccountId,
    /// Per-round results
    pub rounds: Vec<RoundReport>,
    /// Finalized root at the end of the run
    pub finalized_root: Option<Hash32>,
    /// Final claim records
    pub claims: Vec<RewardClaimRecord>,
    /// Reserve balance at the end of the run
    pub reserve_balance: u64,
}

/// Run `scenario` under `config` and collect the report.
pub async fn run(scenario: &Scenario, config: NcnConfig) -> Result<SimulationReport> {
    let authority = config.authority;
    let clock = Arc::new(LocalClock::default());
    let registry = LocalStakeRegistry::new(authority, scenario.stake_snapshot());
    let ballot = BallotCoordinator::initialize(config.clone(), registry, clock.clone())?;

    let ledger = Arc::new(LocalTokenLedger::default());
    let distributor = RewardDistributor::new(ledger.clone(), scenario.reserve);
    if let Some(funding) = &scenario.funding {
        ledger.mint(funding.funder, funding.amount);
        distributor
            .fund_rewards(&funding.funder, funding.amount)
            .await?;
    }

    let mut rounds = Vec::with_capacity(scenario.rounds.len());
    for step in &scenario.rounds {
        let tree = RewardsTree::build(step.leaves.clone())?;
        let candidate_root = tree.root();

        clock.set(step.propose_at);
        let (round, propose_error) = match ballot.propose(&authority, candidate_root).await {
            Ok(round) => (Some(round), None),
            Err(err) => (None, Some(err.code())),
        };

        let mut votes = Vec::with_capacity(step.votes.len());
        for vote in &step.votes {
            clock.set(vote.slot);
            let (weight, error) = match ballot.vote(&vote.operator, vote.approve).await {
                Ok(receipt) => (Some(receipt.weight), None),
                Err(err) => (None, Some(err.code())),
            };
            votes.push(VoteReport {
                operator: vote.operator,
                approve: vote.approve,
                slot: vote.slot,
                weight,
                error,
            });
        }

        clock.set(step.check_at);
        let outcome = ballot.check_consensus().await?;
        let finalized_root = ballot.finalized_root().await;

        let mut claims = Vec::with_capacity(step.claims.len());
        for beneficiary in &step.claims {
            let result = match tree.claim_request(beneficiary) {
                Ok(request) => distributor.claim(beneficiary, &request, finalized_root).await,
                Err(err) => Err(err),
            };
            let (paid, error) = match result {
                Ok(plan) => (Some(plan.payable), None),
                Err(err) => (None, Some(err.code())),
            };
            claims.push(ClaimReport {
                beneficiary: *beneficiary,
                paid,
                error,
            });
        }

        rounds.push(RoundReport {
            candidate_root,
            round,
            propose_error,
            votes,
            outcome,
            finalized_root,
            claims,
        });
    }

    let finalized_root = ballot.finalized_root().await;
    let claims: Vec<_> = distributor.records().records().copied().collect();
    let reserve_balance = distributor.reserve_balance().await?;
    info!(
        rounds = rounds.len(),
        claims = claims.len(),
        reserve_balance,
        "Simulation complete"
    );

    Ok(SimulationReport {
        config,
        reserve: distributor.reserve(),
        rounds,
        finalized_root,
        claims,
        reserve_balance,
    })
}
