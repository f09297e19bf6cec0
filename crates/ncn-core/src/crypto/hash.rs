//! Digest function behind every commitment in NCN.
//!
//! Reward leaves and Merkle nodes are hashed here and nowhere else. Hashing
//! needs no I/O, so it is a plain function rather than an effect. The
//! concrete algorithm is picked by [`ALGORITHM`]; callers only see
//! [`hash`] and [`hasher`].
//!
//! Digests are SHA-256, 32 bytes.
//!
//! ```ignore
//! use ncn_core::crypto::hash::hasher;
//!
//! let mut h = hasher();
//! h.update(beneficiary.as_bytes());
//! h.update(&amount.to_le_bytes());
//! let leaf = h.finalize();
//! ```

use sha2::{Digest, Sha256};
use std::fmt;

/// A 32-byte digest function.
pub trait HashAlgorithm: Send + Sync + fmt::Debug {
    /// Digest of `data` in one call.
    fn hash(&self, data: &[u8]) -> [u8; 32];

    /// Streaming state for input that arrives in pieces.
    fn hasher(&self) -> Box<dyn Hasher>;
}

/// Streaming digest state. Feeding the pieces of `x` yields the same digest
/// as hashing `x` whole.
pub trait Hasher: Send {
    /// Append `data`.
    fn update(&mut self, data: &[u8]);

    /// Consume the state and produce the digest.
    fn finalize(self: Box<Self>) -> [u8; 32];
}

/// SHA-256 from the `sha2` crate.
#[derive(Debug, Clone, Copy)]
pub struct Sha256Algorithm;

impl HashAlgorithm for Sha256Algorithm {
    fn hash(&self, data: &[u8]) -> [u8; 32] {
        Sha256::digest(data).into()
    }

    fn hasher(&self) -> Box<dyn Hasher> {
        Box::new(Sha256Stream(Sha256::new()))
    }
}

struct Sha256Stream(Sha256);

impl Hasher for Sha256Stream {
    fn update(&mut self, data: &[u8]) {
        Digest::update(&mut self.0, data);
    }

    fn finalize(self: Box<Self>) -> [u8; 32] {
        self.0.finalize().into()
    }
}

/// Algorithm used for leaves and nodes.
pub const ALGORITHM: Sha256Algorithm = Sha256Algorithm;

/// One-shot digest with [`ALGORITHM`].
#[inline]
pub fn hash(data: &[u8]) -> [u8; 32] {
    ALGORITHM.hash(data)
}

/// Streaming digest with [`ALGORITHM`].
#[inline]
pub fn hasher() -> Box<dyn Hasher> {
    ALGORITHM.hasher()
}
