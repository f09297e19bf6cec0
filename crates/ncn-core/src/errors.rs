//! Unified error system for NCN
//!
//! One error type covers every rejected transition of the ballot box and the
//! reward ledger. Every variant is a pure validation failure detected before
//! any state mutation, except `LedgerTransferFailed` which reports a failed
//! external transfer after which the caller's state is left untouched.

use serde::{Deserialize, Serialize};

/// Unified error type for all NCN operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum NcnError {
    /// Caller does not hold the role the operation requires
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Which role check failed
        message: String,
    },

    /// A proposal is already open and has not resolved
    #[error("A ballot round is already open")]
    RoundAlreadyOpen,

    /// The operation needs an open round but the box is idle
    #[error("No ballot round is open")]
    NoOpenRound,

    /// The vote arrived after `opened_at + vote_window`
    #[error("Vote window expired at slot {expired_at} (now {now})")]
    VoteWindowExpired {
        /// Last slot at which votes were accepted
        expired_at: u64,
        /// Slot at which the vote was attempted
        now: u64,
    },

    /// The operator already voted in the current round
    #[error("Operator already voted in round {round}")]
    DuplicateVote {
        /// Round in which the duplicate vote was attempted
        round: u64,
    },

    /// Caller has zero or unknown stake in the round snapshot
    #[error("Operator is not eligible to vote: {message}")]
    NotEligible {
        /// Reason the operator was rejected
        message: String,
    },

    /// Merkle proof did not reconstruct the finalized root
    #[error("Merkle proof is invalid")]
    ProofInvalid,

    /// Leaf amount does not exceed what was already paid out
    #[error("Nothing to claim: leaf total {total} does not exceed claimed {claimed}")]
    NothingToClaim {
        /// Cumulative amount in the leaf
        total: u64,
        /// Cumulative amount already paid
        claimed: u64,
    },

    /// Quorum has not (yet) been reached for the open round
    #[error("Quorum not reached: approved {approved} of {total}")]
    QuorumNotReached {
        /// Approved stake weight
        approved: u64,
        /// Total eligible stake weight
        total: u64,
    },

    /// External token ledger rejected the transfer
    #[error("Ledger transfer failed: {message}")]
    LedgerTransferFailed {
        /// Ledger-reported failure
        message: String,
    },

    /// No root has ever been finalized, so nothing can be claimed
    #[error("No finalized root is available")]
    NoFinalizedRoot,

    /// The registry reported zero total eligible stake
    #[error("No eligible stake in registry snapshot")]
    NoEligibleStake,

    /// Invalid input or configuration
    #[error("Invalid: {message}")]
    InvalidInput {
        /// Error message describing the invalid input
        message: String,
    },

    /// Checked arithmetic overflowed
    #[error("Arithmetic overflow: {context}")]
    Overflow {
        /// Where the overflow happened
        context: String,
    },

    /// A state invariant does not hold
    #[error("Invariant violation: {message}")]
    InvariantViolation {
        /// Which invariant failed
        message: String,
    },

    /// A collaborator failed in a way the core does not classify
    #[error("Effect error: {message}")]
    Effect {
        /// Collaborator-reported failure
        message: String,
    },
}

impl NcnError {
    /// Create an unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Create a not-eligible error
    pub fn not_eligible(message: impl Into<String>) -> Self {
        Self::NotEligible {
            message: message.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create an overflow error
    pub fn overflow(context: impl Into<String>) -> Self {
        Self::Overflow {
            context: context.into(),
        }
    }

    /// Create an invariant violation error
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::InvariantViolation {
            message: message.into(),
        }
    }

    /// Create a ledger transfer error
    pub fn ledger(message: impl Into<String>) -> Self {
        Self::LedgerTransferFailed {
            message: message.into(),
        }
    }

    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            NcnError::Unauthorized { .. } => "unauthorized",
            NcnError::RoundAlreadyOpen => "round_already_open",
            NcnError::NoOpenRound => "no_open_round",
            NcnError::VoteWindowExpired { .. } => "vote_window_expired",
            NcnError::DuplicateVote { .. } => "duplicate_vote",
            NcnError::NotEligible { .. } => "not_eligible",
            NcnError::ProofInvalid => "proof_invalid",
            NcnError::NothingToClaim { .. } => "nothing_to_claim",
            NcnError::QuorumNotReached { .. } => "quorum_not_reached",
            NcnError::LedgerTransferFailed { .. } => "ledger_transfer_failed",
            NcnError::NoFinalizedRoot => "no_finalized_root",
            NcnError::NoEligibleStake => "no_eligible_stake",
            NcnError::InvalidInput { .. } => "invalid_input",
            NcnError::Overflow { .. } => "overflow",
            NcnError::InvariantViolation { .. } => "invariant_violation",
            NcnError::Effect { .. } => "effect",
        }
    }
}

/// Standard Result type for NCN operations
pub type Result<T> = std::result::Result<T, NcnError>;

impl From<std::io::Error> for NcnError {
    fn from(err: std::io::Error) -> Self {
        Self::invalid(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = NcnError::invalid("test message");
        assert!(matches!(err, NcnError::InvalidInput { .. }));
        assert_eq!(err.to_string(), "Invalid: test message");
    }

    #[test]
    fn test_error_codes_are_distinct() {
        let errors = [
            NcnError::unauthorized("x"),
            NcnError::RoundAlreadyOpen,
            NcnError::NoOpenRound,
            NcnError::VoteWindowExpired {
                expired_at: 10,
                now: 11,
            },
            NcnError::DuplicateVote { round: 1 },
            NcnError::not_eligible("x"),
            NcnError::ProofInvalid,
            NcnError::NothingToClaim {
                total: 1,
                claimed: 1,
            },
            NcnError::QuorumNotReached {
                approved: 0,
                total: 1,
            },
            NcnError::ledger("x"),
            NcnError::NoFinalizedRoot,
            NcnError::NoEligibleStake,
            NcnError::invalid("x"),
            NcnError::overflow("x"),
            NcnError::invariant("x"),
            NcnError::Effect {
                message: "x".to_string(),
            },
        ];
        let codes: std::collections::BTreeSet<_> = errors.iter().map(NcnError::code).collect();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = NcnError::from(io_err);
        assert!(matches!(err, NcnError::InvalidInput { .. }));
    }
}
