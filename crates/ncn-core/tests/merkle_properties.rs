//! Property tests for the Merkle engine: every leaf proves against the root,
//! and any single-byte tamper breaks verification.

use ncn_core::crypto::merkle::{verify_proof, MerkleTree};
use ncn_core::Hash32;
use proptest::prelude::*;

fn leaves_strategy() -> impl Strategy<Value = Vec<Hash32>> {
    prop::collection::vec(any::<[u8; 32]>().prop_map(Hash32::new), 1..40)
}

proptest! {
    #[test]
    fn every_leaf_verifies(leaves in leaves_strategy()) {
        let tree = MerkleTree::build(leaves.clone()).unwrap();
        let root = tree.root();
        for (index, leaf) in leaves.iter().enumerate() {
            let proof = tree.prove(index).unwrap();
            prop_assert_eq!(proof.siblings.len(), tree.depth());
            prop_assert!(verify_proof(leaf, index as u32, &proof.siblings, &root));
        }
    }

    #[test]
    fn tampered_proof_fails(
        leaves in prop::collection::vec(any::<[u8; 32]>().prop_map(Hash32::new), 2..40),
        pick in any::<prop::sample::Index>(),
        sibling_pick in any::<prop::sample::Index>(),
        byte in 0usize..32,
        flip in 1u8..=255,
    ) {
        let tree = MerkleTree::build(leaves.clone()).unwrap();
        let index = pick.index(leaves.len());
        let mut proof = tree.prove(index).unwrap();
        let s = sibling_pick.index(proof.siblings.len());
        proof.siblings[s].0[byte] ^= flip;
        prop_assert!(!proof.verify(&leaves[index], &tree.root()));
    }

    #[test]
    fn tampered_root_or_leaf_fails(
        leaves in leaves_strategy(),
        pick in any::<prop::sample::Index>(),
        byte in 0usize..32,
        flip in 1u8..=255,
    ) {
        let tree = MerkleTree::build(leaves.clone()).unwrap();
        let index = pick.index(leaves.len());
        let proof = tree.prove(index).unwrap();

        let mut root = tree.root();
        root.0[byte] ^= flip;
        prop_assert!(!proof.verify(&leaves[index], &root));

        let mut leaf = leaves[index];
        leaf.0[byte] ^= flip;
        prop_assert!(!proof.verify(&leaf, &tree.root()));
    }

    #[test]
    fn root_is_deterministic(leaves in leaves_strategy()) {
        let a = MerkleTree::build(leaves.clone()).unwrap();
        let b = MerkleTree::build(leaves).unwrap();
        prop_assert_eq!(a.root(), b.root());
    }
}
