//! Reward leaves and the tree built over them.
//!
//! A leaf hash is `H(beneficiary ‖ amount_le8)`: the 32 raw beneficiary
//! bytes followed by the cumulative amount as eight little-endian bytes.

use std::collections::BTreeMap;

use ncn_core::crypto::hash::hasher;
use ncn_core::{BeneficiaryId, Hash32, MerkleProof, MerkleTree, NcnError, Result};
use serde::{Deserialize, Serialize};

use crate::ledger::ClaimRequest;

/// Hash a `(beneficiary, cumulative amount)` pair into a tree leaf.
pub fn reward_leaf_hash(beneficiary: &BeneficiaryId, amount: u64) -> Hash32 {
    let mut h = hasher();
    h.update(beneficiary.as_bytes());
    h.update(&amount.to_le_bytes());
    Hash32(h.finalize())
}

/// Total amount ever owed to one beneficiary as of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardLeaf {
    /// Account that may claim the leaf
    pub beneficiary: BeneficiaryId,
    /// Cumulative total, not a per-round delta
    pub amount: u64,
}

impl RewardLeaf {
    /// Leaf owing `amount` in total to `beneficiary`.
    pub fn new(beneficiary: BeneficiaryId, amount: u64) -> Self {
        Self {
            beneficiary,
            amount,
        }
    }

    /// Commitment hashed into the tree.
    pub fn leaf_hash(&self) -> Hash32 {
        reward_leaf_hash(&self.beneficiary, self.amount)
    }
}

/// Merkle tree over reward leaves with lookup by beneficiary.
#[derive(Debug, Clone)]
pub struct RewardsTree {
    leaves: Vec<RewardLeaf>,
    positions: BTreeMap<BeneficiaryId, usize>,
    tree: MerkleTree,
}

impl RewardsTree {
    /// Build over `leaves` in the given order.
    ///
    /// Each beneficiary may appear once; a second leaf would make claims
    /// depend on which proof the beneficiary chose to submit.
    pub fn build(leaves: Vec<RewardLeaf>) -> Result<Self> {
        let mut positions = BTreeMap::new();
        for (index, leaf) in leaves.iter().enumerate() {
            if positions.insert(leaf.beneficiary, index).is_some() {
                return Err(NcnError::invalid(format!(
                    "duplicate reward leaf for beneficiary {}",
                    leaf.beneficiary
                )));
            }
        }

        let tree = MerkleTree::build(leaves.iter().map(RewardLeaf::leaf_hash).collect())?;
        Ok(Self {
            leaves,
            positions,
            tree,
        })
    }

    /// Root to propose for this distribution.
    pub fn root(&self) -> Hash32 {
        self.tree.root()
    }

    /// Leaves in tree order.
    pub fn leaves(&self) -> &[RewardLeaf] {
        &self.leaves
    }

    /// Leaf owned by `beneficiary`, if present.
    pub fn leaf_for(&self, beneficiary: &BeneficiaryId) -> Option<&RewardLeaf> {
        self.positions
            .get(beneficiary)
            .and_then(|index| self.leaves.get(*index))
    }

    /// Inclusion proof for `beneficiary`'s leaf.
    pub fn proof_for(&self, beneficiary: &BeneficiaryId) -> Result<MerkleProof> {
        let index = self.positions.get(beneficiary).ok_or_else(|| {
            NcnError::invalid(format!("no reward leaf for beneficiary {beneficiary}"))
        })?;
        self.tree.prove(*index)
    }

    /// Ready-to-submit claim for `beneficiary`'s full cumulative amount.
    pub fn claim_request(&self, beneficiary: &BeneficiaryId) -> Result<ClaimRequest> {
        let proof = self.proof_for(beneficiary)?;
        let leaf = self.leaf_for(beneficiary).ok_or_else(|| {
            NcnError::invariant(format!("leaf position for {beneficiary} out of range"))
        })?;
        Ok(ClaimRequest {
            beneficiary: leaf.beneficiary,
            leaf_index: proof.leaf_index,
            total_rewards: leaf.amount,
            proof: proof.siblings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ncn_core::crypto::verify_proof;

    fn beneficiary(seed: u8) -> BeneficiaryId {
        BeneficiaryId::new([seed; 32])
    }

    #[test]
    fn test_leaf_hash_layout() {
        let b = beneficiary(9);
        let mut bytes = b.as_bytes().to_vec();
        bytes.extend_from_slice(&123_456_789u64.to_le_bytes());
        let expected = Hash32(ncn_core::crypto::hash(&bytes));

        assert_eq!(RewardLeaf::new(b, 123_456_789).leaf_hash(), expected);
        assert_ne!(reward_leaf_hash(&b, 123_456_788), expected);
    }

    #[test]
    fn test_single_leaf_root_is_leaf() {
        let leaf = RewardLeaf::new(beneficiary(1), 50);
        let tree = RewardsTree::build(vec![leaf]).unwrap();
        assert_eq!(tree.root(), leaf.leaf_hash());
        assert!(tree.proof_for(&beneficiary(1)).unwrap().siblings.is_empty());
    }

    #[test]
    fn test_proofs_by_beneficiary_verify() {
        let leaves: Vec<_> = (1..=5).map(|i| RewardLeaf::new(beneficiary(i), u64::from(i) * 10)).collect();
        let tree = RewardsTree::build(leaves.clone()).unwrap();

        for leaf in &leaves {
            let request = tree.claim_request(&leaf.beneficiary).unwrap();
            assert_eq!(request.total_rewards, leaf.amount);
            assert!(verify_proof(
                &leaf.leaf_hash(),
                request.leaf_index,
                &request.proof,
                &tree.root()
            ));
        }
    }

    #[test]
    fn test_duplicate_beneficiary_rejected() {
        let result = RewardsTree::build(vec![
            RewardLeaf::new(beneficiary(1), 10),
            RewardLeaf::new(beneficiary(1), 20),
        ]);
        assert!(matches!(result, Err(NcnError::InvalidInput { .. })));
    }

    #[test]
    fn test_empty_and_unknown() {
        assert!(matches!(
            RewardsTree::build(Vec::new()),
            Err(NcnError::InvalidInput { .. })
        ));

        let tree = RewardsTree::build(vec![RewardLeaf::new(beneficiary(1), 10)]).unwrap();
        assert!(tree.proof_for(&beneficiary(2)).is_err());
        assert!(tree.leaf_for(&beneficiary(2)).is_none());
    }
}
