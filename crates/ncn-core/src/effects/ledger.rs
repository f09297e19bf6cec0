//! Token ledger interface.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::NcnError;
use crate::types::AccountId;

/// Failure reported by the token ledger.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum LedgerError {
    /// Source balance below the requested amount
    #[error("Insufficient funds in {account}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        /// Source account
        account: AccountId,
        /// Balance at the time of the transfer
        balance: u64,
        /// Amount asked for
        requested: u64,
    },
    /// Account cannot receive or send tokens
    #[error("Unknown account {0}")]
    UnknownAccount(AccountId),
    /// Ledger could not be reached; retrying may succeed
    #[error("Ledger unavailable: {reason}")]
    Unavailable {
        /// Reason reported by the backend
        reason: String,
    },
}

impl From<LedgerError> for NcnError {
    fn from(err: LedgerError) -> Self {
        NcnError::ledger(err.to_string())
    }
}

/// External token ledger. A transfer either fully happens or not at all.
#[async_trait]
pub trait TokenLedgerEffects: Send + Sync {
    /// Move `amount` units from `from` to `to`.
    async fn transfer(&self, from: &AccountId, to: &AccountId, amount: u64)
        -> Result<(), LedgerError>;

    /// Current balance of `account`.
    async fn balance(&self, account: &AccountId) -> Result<u64, LedgerError>;
}

/// Blanket implementation for Arc<T> where T: TokenLedgerEffects
#[async_trait]
impl<T: TokenLedgerEffects + ?Sized> TokenLedgerEffects for std::sync::Arc<T> {
    async fn transfer(
        &self,
        from: &AccountId,
        to: &AccountId,
        amount: u64,
    ) -> Result<(), LedgerError> {
        (**self).transfer(from, to, amount).await
    }

    async fn balance(&self, account: &AccountId) -> Result<u64, LedgerError> {
        (**self).balance(account).await
    }
}
