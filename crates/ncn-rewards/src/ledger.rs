//! Pure cumulative-claim bookkeeping.
//!
//! A claim is split in two: [`RewardLedger::prepare_claim`] runs every check
//! and computes the payout without touching state, and
//! [`RewardLedger::commit`] applies it once the tokens have moved. The split
//! lets the caller put the external transfer between the two.

use std::collections::BTreeMap;

use ncn_core::crypto::verify_proof;
use ncn_core::{AccountId, BeneficiaryId, Hash32, NcnError, Result};
use serde::{Deserialize, Serialize};

use crate::leaf::reward_leaf_hash;

/// A beneficiary's claim against the finalized root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRequest {
    /// Leaf owner, who must also be the caller
    pub beneficiary: BeneficiaryId,
    /// Position of the leaf in the reward tree
    pub leaf_index: u32,
    /// Cumulative amount committed in the leaf
    pub total_rewards: u64,
    /// Sibling hashes from leaf to root
    pub proof: Vec<Hash32>,
}

/// Cumulative payout to one beneficiary across every finalized root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardClaimRecord {
    /// Record key
    pub beneficiary: BeneficiaryId,
    /// Never decreases
    pub claimed_amount: u64,
}

/// Validated claim ready to be paid and committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimPlan {
    /// Recipient of the payout
    pub beneficiary: BeneficiaryId,
    /// Amount to transfer now
    pub payable: u64,
    /// Claimed amount to record once the transfer succeeds
    pub new_claimed: u64,
}

/// Claim records keyed by beneficiary. Records are created on the first
/// successful claim and never removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardLedger {
    records: BTreeMap<BeneficiaryId, RewardClaimRecord>,
}

impl RewardLedger {
    /// Empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Amount already paid to `beneficiary` (zero before the first claim).
    pub fn claimed_amount(&self, beneficiary: &BeneficiaryId) -> u64 {
        self.records
            .get(beneficiary)
            .map_or(0, |record| record.claimed_amount)
    }

    /// Records in beneficiary order.
    pub fn records(&self) -> impl Iterator<Item = &RewardClaimRecord> {
        self.records.values()
    }

    /// Number of beneficiaries that have claimed.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True before the first successful claim.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Check `request` from `caller` against `finalized_root`.
    ///
    /// Order: caller is the beneficiary, a root exists, the proof verifies,
    /// the leaf total exceeds what was already paid.
    pub fn prepare_claim(
        &self,
        caller: &AccountId,
        request: &ClaimRequest,
        finalized_root: Option<Hash32>,
    ) -> Result<ClaimPlan> {
        if caller != &request.beneficiary {
            return Err(NcnError::unauthorized(
                "only the beneficiary may claim its rewards",
            ));
        }

        let root = finalized_root.ok_or(NcnError::NoFinalizedRoot)?;

        let leaf = reward_leaf_hash(&request.beneficiary, request.total_rewards);
        if !verify_proof(&leaf, request.leaf_index, &request.proof, &root) {
            return Err(NcnError::ProofInvalid);
        }

        let claimed = self.claimed_amount(&request.beneficiary);
        if request.total_rewards <= claimed {
            return Err(NcnError::NothingToClaim {
                total: request.total_rewards,
                claimed,
            });
        }

        Ok(ClaimPlan {
            beneficiary: request.beneficiary,
            payable: request.total_rewards - claimed,
            new_claimed: request.total_rewards,
        })
    }

    /// Record a paid claim. The claimed amount is set to the leaf total,
    /// not incremented.
    ///
    /// Rejects a plan prepared against an older record, which would move the
    /// claimed amount backwards or pay the same range twice.
    pub fn commit(&mut self, plan: &ClaimPlan) -> Result<()> {
        let claimed = self.claimed_amount(&plan.beneficiary);
        if plan.new_claimed <= claimed || plan.new_claimed - claimed != plan.payable {
            return Err(NcnError::invariant(format!(
                "stale claim plan for {}: claimed {claimed}, plan pays {} up to {}",
                plan.beneficiary, plan.payable, plan.new_claimed
            )));
        }

        self.records
            .entry(plan.beneficiary)
            .and_modify(|record| record.claimed_amount = plan.new_claimed)
            .or_insert(RewardClaimRecord {
                beneficiary: plan.beneficiary,
                claimed_amount: plan.new_claimed,
            });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaf::{RewardLeaf, RewardsTree};
    use assert_matches::assert_matches;

    fn beneficiary(seed: u8) -> BeneficiaryId {
        BeneficiaryId::new([seed; 32])
    }

    fn tree(amount: u64) -> RewardsTree {
        RewardsTree::build(vec![
            RewardLeaf::new(beneficiary(1), amount),
            RewardLeaf::new(beneficiary(2), 500),
            RewardLeaf::new(beneficiary(3), 700),
        ])
        .unwrap()
    }

    #[test]
    fn test_cumulative_claims() {
        let mut ledger = RewardLedger::new();
        let first = tree(123_456_789);
        let request = first.claim_request(&beneficiary(1)).unwrap();

        let plan = ledger
            .prepare_claim(&beneficiary(1), &request, Some(first.root()))
            .unwrap();
        assert_eq!(plan.payable, 123_456_789);
        ledger.commit(&plan).unwrap();

        assert_matches!(
            ledger.prepare_claim(&beneficiary(1), &request, Some(first.root())),
            Err(NcnError::NothingToClaim {
                total: 123_456_789,
                claimed: 123_456_789
            })
        );

        let second = tree(200_000_000);
        let request = second.claim_request(&beneficiary(1)).unwrap();
        let plan = ledger
            .prepare_claim(&beneficiary(1), &request, Some(second.root()))
            .unwrap();
        assert_eq!(plan.payable, 76_543_211);
        ledger.commit(&plan).unwrap();
        assert_eq!(ledger.claimed_amount(&beneficiary(1)), 200_000_000);
    }

    #[test]
    fn test_prepare_does_not_mutate() {
        let ledger = RewardLedger::new();
        let t = tree(10);
        let request = t.claim_request(&beneficiary(2)).unwrap();
        ledger
            .prepare_claim(&beneficiary(2), &request, Some(t.root()))
            .unwrap();
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_rejections() {
        let ledger = RewardLedger::new();
        let t = tree(10);
        let request = t.claim_request(&beneficiary(2)).unwrap();

        assert_matches!(
            ledger.prepare_claim(&beneficiary(3), &request, Some(t.root())),
            Err(NcnError::Unauthorized { .. })
        );
        assert_matches!(
            ledger.prepare_claim(&beneficiary(2), &request, None),
            Err(NcnError::NoFinalizedRoot)
        );

        let mut inflated = request.clone();
        inflated.total_rewards += 1;
        assert_matches!(
            ledger.prepare_claim(&beneficiary(2), &inflated, Some(t.root())),
            Err(NcnError::ProofInvalid)
        );

        let mut moved = request.clone();
        moved.leaf_index ^= 1;
        assert_matches!(
            ledger.prepare_claim(&beneficiary(2), &moved, Some(t.root())),
            Err(NcnError::ProofInvalid)
        );

        let mut tampered = request;
        tampered.proof[0].0[0] ^= 0xff;
        assert_matches!(
            ledger.prepare_claim(&beneficiary(2), &tampered, Some(t.root())),
            Err(NcnError::ProofInvalid)
        );
    }

    #[test]
    fn test_lower_later_leaf_is_nothing_to_claim() {
        let mut ledger = RewardLedger::new();
        let high = tree(1_000);
        let request = high.claim_request(&beneficiary(1)).unwrap();
        let plan = ledger
            .prepare_claim(&beneficiary(1), &request, Some(high.root()))
            .unwrap();
        ledger.commit(&plan).unwrap();

        let low = tree(900);
        let request = low.claim_request(&beneficiary(1)).unwrap();
        assert_matches!(
            ledger.prepare_claim(&beneficiary(1), &request, Some(low.root())),
            Err(NcnError::NothingToClaim { total: 900, claimed: 1_000 })
        );
    }

    #[test]
    fn test_padded_index_cannot_pay_twice() {
        let mut ledger = RewardLedger::new();
        let t = tree(10);
        let honest = t.claim_request(&beneficiary(3)).unwrap();
        assert_eq!(honest.leaf_index, 2);

        // Leaf 2 of 3 is duplicated, so index 3 reconstructs the same root.
        let mut padded = honest.clone();
        padded.leaf_index = 3;
        let plan = ledger
            .prepare_claim(&beneficiary(3), &padded, Some(t.root()))
            .unwrap();
        ledger.commit(&plan).unwrap();

        assert_matches!(
            ledger.prepare_claim(&beneficiary(3), &honest, Some(t.root())),
            Err(NcnError::NothingToClaim { total: 700, claimed: 700 })
        );
    }

    #[test]
    fn test_stale_plan_rejected() {
        let mut ledger = RewardLedger::new();
        let t = tree(10);
        let request = t.claim_request(&beneficiary(1)).unwrap();
        let plan = ledger
            .prepare_claim(&beneficiary(1), &request, Some(t.root()))
            .unwrap();

        ledger.commit(&plan).unwrap();
        assert_matches!(ledger.commit(&plan), Err(NcnError::InvariantViolation { .. }));
        assert_eq!(ledger.claimed_amount(&beneficiary(1)), 10);
        assert_eq!(ledger.len(), 1);
    }
}
