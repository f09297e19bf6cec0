//! In-memory token ledger with failure injection.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use ncn_core::{AccountId, LedgerError, TokenLedgerEffects};
use parking_lot::Mutex;

/// One completed transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferRecord {
    /// Debited account
    pub from: AccountId,
    /// Credited account
    pub to: AccountId,
    /// Tokens moved
    pub amount: u64,
}

#[derive(Debug, Default)]
struct LedgerInner {
    balances: HashMap<AccountId, u64>,
    transfers: Vec<TransferRecord>,
    fail_next: usize,
    blocked: BTreeSet<AccountId>,
}

/// Balance map that moves tokens atomically and can be told to fail.
#[derive(Debug, Default)]
pub struct InMemoryTokenLedger {
    inner: Mutex<LedgerInner>,
}

impl InMemoryTokenLedger {
    /// Ledger with no balances.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint `amount` into `account`.
    pub fn credit(&self, account: AccountId, amount: u64) {
        let mut inner = self.inner.lock();
        let balance = inner.balances.entry(account).or_insert(0);
        *balance = balance.saturating_add(amount);
    }

    /// Current balance, zero for unknown accounts.
    pub fn balance_of(&self, account: &AccountId) -> u64 {
        self.inner.lock().balances.get(account).copied().unwrap_or(0)
    }

    /// Make the next `count` transfers fail as unavailable.
    pub fn fail_next_transfers(&self, count: usize) {
        self.inner.lock().fail_next = count;
    }

    /// Reject every transfer into `account` until unblocked.
    pub fn block_recipient(&self, account: AccountId) {
        self.inner.lock().blocked.insert(account);
    }

    /// Undo [`Self::block_recipient`].
    pub fn unblock_recipient(&self, account: &AccountId) {
        self.inner.lock().blocked.remove(account);
    }

    /// Completed transfers in order.
    pub fn transfers(&self) -> Vec<TransferRecord> {
        self.inner.lock().transfers.clone()
    }
}

#[async_trait]
impl TokenLedgerEffects for InMemoryTokenLedger {
    async fn transfer(&self, from: &AccountId, to: &AccountId, amount: u64) -> Result<(), LedgerError> {
        let mut inner = self.inner.lock();

        if inner.fail_next > 0 {
            inner.fail_next -= 1;
            return Err(LedgerError::Unavailable {
                reason: "injected failure".to_string(),
            });
        }
        if inner.blocked.contains(to) {
            return Err(LedgerError::Unavailable {
                reason: format!("recipient {to} blocked"),
            });
        }

        let balance = inner.balances.get(from).copied().unwrap_or(0);
        if balance < amount {
            return Err(LedgerError::InsufficientFunds {
                account: *from,
                balance,
                requested: amount,
            });
        }

        inner.balances.insert(*from, balance - amount);
        let to_balance = inner.balances.entry(*to).or_insert(0);
        *to_balance = to_balance.saturating_add(amount);
        inner.transfers.push(TransferRecord {
            from: *from,
            to: *to,
            amount,
        });
        Ok(())
    }

    async fn balance(&self, account: &AccountId) -> Result<u64, LedgerError> {
        Ok(self.balance_of(account))
    }
}
