//! `ncn verify`: check one claim proof without any state.

use ncn_core::crypto::verify_proof;
use ncn_core::{BeneficiaryId, Hash32};
use ncn_rewards::reward_leaf_hash;
use serde::Serialize;

/// Output of `ncn verify`.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyReport {
    /// Hash of the reconstructed leaf
    pub leaf_hash: Hash32,
    /// Whether the proof reaches `root`
    pub valid: bool,
}

/// Check that `(beneficiary, amount)` sits at `index` under `root`.
pub fn run(
    root: &Hash32,
    beneficiary: &BeneficiaryId,
    amount: u64,
    index: u32,
    proof: &[Hash32],
) -> VerifyReport {
    let leaf_hash = reward_leaf_hash(beneficiary, amount);
    VerifyReport {
        leaf_hash,
        valid: verify_proof(&leaf_hash, index, proof, root),
    }
}
