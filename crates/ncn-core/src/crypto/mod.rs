//! Hashing and Merkle commitments.

pub mod hash;
pub mod merkle;

pub use hash::{hash, hasher, HashAlgorithm, Hasher, Sha256Algorithm, ALGORITHM};
pub use merkle::{hash_pair, verify_proof, MerkleProof, MerkleTree, MAX_MERKLE_DEPTH};
