//! Local effect handlers backing `ncn simulate`.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use ncn_core::{
    AccountId, ClockEffects, LedgerError, Result, Slot, StakeRegistryEffects, StakeSnapshot,
    TokenLedgerEffects,
};
use parking_lot::Mutex;

/// Registry with a fixed operator set.
#[derive(Debug, Clone)]
pub struct LocalStakeRegistry {
    snapshot: StakeSnapshot,
    authorities: BTreeSet<AccountId>,
}

impl LocalStakeRegistry {
    /// Registry where `authority` is the only proposer.
    pub fn new(authority: AccountId, snapshot: StakeSnapshot) -> Self {
        Self {
            snapshot,
            authorities: BTreeSet::from([authority]),
        }
    }
}

#[async_trait]
impl StakeRegistryEffects for LocalStakeRegistry {
    async fn stake_snapshot(&self) -> Result<StakeSnapshot> {
        Ok(self.snapshot.clone())
    }

    async fn is_authority(&self, identity: &AccountId) -> Result<bool> {
        Ok(self.authorities.contains(identity))
    }
}

/// Clock driven by the scenario script.
#[derive(Debug, Default)]
pub struct LocalClock {
    slot: AtomicU64,
}

impl LocalClock {
    /// Jump to `slot`.
    pub fn set(&self, slot: u64) {
        self.slot.store(slot, Ordering::SeqCst);
    }
}

#[async_trait]
impl ClockEffects for LocalClock {
    async fn now(&self) -> Result<Slot> {
        Ok(Slot(self.slot.load(Ordering::SeqCst)))
    }
}

/// Balance map with all-or-nothing transfers.
#[derive(Debug, Default)]
pub struct LocalTokenLedger {
    balances: Mutex<HashMap<AccountId, u64>>,
}

impl LocalTokenLedger {
    /// Credit `amount` out of thin air.
    pub fn mint(&self, account: AccountId, amount: u64) {
        let mut balances = self.balances.lock();
        let balance = balances.entry(account).or_insert(0);
        *balance = balance.saturating_add(amount);
    }

    /// Current balance, zero for unknown accounts.
    pub fn balance_of(&self, account: &AccountId) -> u64 {
        self.balances.lock().get(account).copied().unwrap_or(0)
    }
}

#[async_trait]
impl TokenLedgerEffects for LocalTokenLedger {
    async fn transfer(&self, from: &AccountId, to: &AccountId, amount: u64) -> std::result::Result<(), LedgerError> {
        let mut balances = self.balances.lock();
        let available = balances.get(from).copied().unwrap_or(0);
        if available < amount {
            return Err(LedgerError::InsufficientFunds {
                account: *from,
                balance: available,
                requested: amount,
            });
        }
        balances.insert(*from, available - amount);
        let credited = balances.entry(*to).or_insert(0);
        *credited = credited.saturating_add(amount);
        Ok(())
    }

    async fn balance(&self, account: &AccountId) -> std::result::Result<u64, LedgerError> {
        Ok(self.balance_of(account))
    }
}
