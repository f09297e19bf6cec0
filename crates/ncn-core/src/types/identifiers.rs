//! 32-byte identities and commitments.
//!
//! Both types render as lowercase hex and serialize as hex strings so that
//! scenario files and CLI output stay human-readable.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::NcnError;

macro_rules! bytes32_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name(pub [u8; 32]);

        impl $name {
            /// Wrap raw bytes.
            pub const fn new(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }

            /// Borrow the raw bytes.
            pub fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }

            /// Lowercase hex encoding.
            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }
        }

        impl From<[u8; 32]> for $name {
            fn from(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.to_hex())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), &self.to_hex()[..8])
            }
        }

        impl FromStr for $name {
            type Err = NcnError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.strip_prefix("0x").unwrap_or(s);
                let bytes = hex::decode(trimmed).map_err(|e| {
                    NcnError::invalid(format!("{}: bad hex: {e}", stringify!($name)))
                })?;
                let array: [u8; 32] = bytes.try_into().map_err(|v: Vec<u8>| {
                    NcnError::invalid(format!(
                        "{}: expected 32 bytes, got {}",
                        stringify!($name),
                        v.len()
                    ))
                })?;
                Ok(Self(array))
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

bytes32_type!(
    /// Stable identity of an actor: authority, operator, beneficiary or
    /// token account.
    AccountId
);

bytes32_type!(
    /// 32-byte hash or commitment (Merkle nodes, reward roots).
    Hash32
);

/// Identity of a stake-weighted voter.
pub type OperatorId = AccountId;

/// Identity of a reward recipient.
pub type BeneficiaryId = AccountId;

impl Hash32 {
    /// All-zero hash.
    pub const ZERO: Hash32 = Hash32([0u8; 32]);
}
