//! `ncn tree`: root and per-leaf proofs for a rewards file.

use anyhow::Result;
use ncn_core::{BeneficiaryId, Hash32};
use ncn_rewards::RewardsTree;
use serde::Serialize;

/// One leaf with everything needed to claim it.
#[derive(Debug, Clone, Serialize)]
pub struct LeafReport {
    /// Leaf owner
    pub beneficiary: BeneficiaryId,
    /// Cumulative amount
    pub amount: u64,
    /// Hash committed in the tree
    pub leaf_hash: Hash32,
    /// Position in the tree after sorting
    pub leaf_index: u32,
    /// Sibling hashes from leaf to root
    pub proof: Vec<Hash32>,
}

/// Output of `ncn tree`.
#[derive(Debug, Clone, Serialize)]
pub struct TreeReport {
    /// Root to propose for this distribution
    pub root: Hash32,
    /// Leaves in tree order
    pub leaves: Vec<LeafReport>,
}

/// Build the report for every leaf of `tree`.
pub fn run(tree: &RewardsTree) -> Result<TreeReport> {
    let leaves = tree
        .leaves()
        .iter()
        .map(|leaf| -> Result<LeafReport> {
            let request = tree.claim_request(&leaf.beneficiary)?;
            Ok(LeafReport {
                beneficiary: leaf.beneficiary,
                amount: leaf.amount,
                leaf_hash: leaf.leaf_hash(),
                leaf_index: request.leaf_index,
                proof: request.proof,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(TreeReport {
        root: tree.root(),
        leaves,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ncn_rewards::RewardLeaf;

    #[test]
    fn test_report_lists_every_leaf_in_order() {
        let leaves: Vec<_> = (1..=3u8)
            .map(|i| RewardLeaf::new(BeneficiaryId::new([i; 32]), u64::from(i)))
            .collect();
        let tree = RewardsTree::build(leaves).unwrap();
        let report = run(&tree).unwrap();

        assert_eq!(report.root, tree.root());
        let indices: Vec<_> = report.leaves.iter().map(|l| l.leaf_index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert!(report.leaves.iter().all(|l| l.proof.len() == 2));
    }
}
