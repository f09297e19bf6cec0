//! Deterministic identities and roots.

use ncn_core::{AccountId, Hash32};

/// Account whose 32 bytes are all `seed`.
pub fn account(seed: u8) -> AccountId {
    AccountId::new([seed; 32])
}

/// Root whose 32 bytes are all `seed`.
pub fn root(seed: u8) -> Hash32 {
    Hash32::new([seed; 32])
}
