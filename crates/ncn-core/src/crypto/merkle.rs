//! Binary Merkle tree over reward leaves.
//!
//! Construction rules, fixed because proofs depend on them:
//!
//! - Leaves are 32-byte hashes supplied by the caller, in order.
//! - A parent is `H(left ‖ right)`.
//! - A level with an odd node count pairs its last node with itself, so the
//!   parent is `H(last ‖ last)` (duplicate-last rule).
//! - A single-leaf tree has `root == leaf` and an empty proof.
//!
//! Proofs carry no left/right flags. The position at each level is read from
//! the parity of the leaf index: even means the running node is the left
//! child. The index is halved after every level.

use serde::{Deserialize, Serialize};

use crate::crypto::hash::hasher;
use crate::errors::{NcnError, Result};
use crate::types::Hash32;

/// Maximum depth of a merkle tree (supports up to 2^32 leaves)
pub const MAX_MERKLE_DEPTH: usize = 32;

/// Hash two child nodes into their parent.
pub fn hash_pair(left: &Hash32, right: &Hash32) -> Hash32 {
    let mut h = hasher();
    h.update(left.as_bytes());
    h.update(right.as_bytes());
    Hash32(h.finalize())
}

/// Inclusion proof for one leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    /// Index of the leaf in the original ordering
    pub leaf_index: u32,
    /// Sibling hashes from the leaf level up to just below the root
    pub siblings: Vec<Hash32>,
}

impl MerkleProof {
    /// Verify this proof for `leaf` against `root`.
    pub fn verify(&self, leaf: &Hash32, root: &Hash32) -> bool {
        verify_proof(leaf, self.leaf_index, &self.siblings, root)
    }
}

/// Recompute the path from `leaf` and compare with `root`.
///
/// Rejects proofs deeper than [`MAX_MERKLE_DEPTH`] and indices with bits
/// above the proof depth. Under the duplicate-last rule the final leaf of an
/// odd level also verifies at the unused index beside it, so callers must
/// not key state on `leaf_index`.
pub fn verify_proof(leaf: &Hash32, leaf_index: u32, siblings: &[Hash32], root: &Hash32) -> bool {
    if siblings.len() > MAX_MERKLE_DEPTH {
        return false;
    }
    if siblings.len() < MAX_MERKLE_DEPTH && u64::from(leaf_index) >> siblings.len() != 0 {
        return false;
    }

    let mut current = *leaf;
    let mut index = leaf_index;
    for sibling in siblings {
        current = if index % 2 == 0 {
            hash_pair(&current, sibling)
        } else {
            hash_pair(sibling, &current)
        };
        index /= 2;
    }

    &current == root
}

/// Merkle tree with every level retained for proof generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleTree {
    /// `levels[0]` are the leaves, the last level holds only the root
    levels: Vec<Vec<Hash32>>,
}

impl MerkleTree {
    /// Build a tree over `leaves`. Fails on an empty leaf set.
    pub fn build(leaves: Vec<Hash32>) -> Result<Self> {
        if leaves.is_empty() {
            return Err(NcnError::invalid("merkle tree needs at least one leaf"));
        }
        if u32::try_from(leaves.len()).is_err() {
            return Err(NcnError::invalid(format!(
                "too many merkle leaves: {}",
                leaves.len()
            )));
        }

        let mut levels = vec![leaves];
        while let Some(current) = levels.last().filter(|level| level.len() > 1) {
            let next: Vec<Hash32> = current
                .chunks(2)
                .map(|pair| match pair {
                    [left, right] => hash_pair(left, right),
                    [last] => hash_pair(last, last),
                    _ => unreachable!("chunks(2) yields one or two nodes"),
                })
                .collect();
            levels.push(next);
        }

        Ok(Self { levels })
    }

    /// Root commitment.
    pub fn root(&self) -> Hash32 {
        // `build` guarantees a non-empty final level.
        self.levels
            .last()
            .and_then(|level| level.first())
            .copied()
            .unwrap_or(Hash32::ZERO)
    }

    /// Number of leaves.
    pub fn leaf_count(&self) -> usize {
        self.levels.first().map_or(0, Vec::len)
    }

    /// Number of sibling hashes in every proof of this tree.
    pub fn depth(&self) -> usize {
        self.levels.len() - 1
    }

    /// Produce the inclusion proof for the leaf at `index`.
    pub fn prove(&self, index: usize) -> Result<MerkleProof> {
        if index >= self.leaf_count() {
            return Err(NcnError::invalid(format!(
                "leaf index {index} out of range for {} leaves",
                self.leaf_count()
            )));
        }

        let mut siblings = Vec::with_capacity(self.depth());
        let mut position = index;
        for level in &self.levels[..self.depth()] {
            let sibling = if position % 2 == 0 {
                // Missing right sibling means the node was paired with itself.
                level.get(position + 1).unwrap_or(&level[position])
            } else {
                &level[position - 1]
            };
            siblings.push(*sibling);
            position /= 2;
        }

        Ok(MerkleProof {
            leaf_index: index as u32,
            siblings,
        })
    }
}
