//! In-memory stake registry.

use std::collections::BTreeSet;

use async_trait::async_trait;
use ncn_core::{AccountId, OperatorId, Result, StakeRegistryEffects, StakeSnapshot};
use parking_lot::RwLock;

/// Registry whose delegations can be changed mid-test.
#[derive(Debug, Default)]
pub struct InMemoryStakeRegistry {
    stake: RwLock<StakeSnapshot>,
    authorities: RwLock<BTreeSet<AccountId>>,
}

impl InMemoryStakeRegistry {
    /// Registry with one authority and the given operator weights.
    pub fn new(authority: AccountId, weights: impl IntoIterator<Item = (OperatorId, u64)>) -> Self {
        Self {
            stake: RwLock::new(StakeSnapshot::from_weights(weights)),
            authorities: RwLock::new(BTreeSet::from([authority])),
        }
    }

    /// Set (or replace) one operator's delegated weight.
    pub fn set_weight(&self, operator: OperatorId, weight: u64) {
        self.stake.write().weights.insert(operator, weight);
    }

    /// Drop an operator from the registry.
    pub fn remove_operator(&self, operator: &OperatorId) {
        self.stake.write().weights.remove(operator);
    }

    /// Replace the recognised authority.
    pub fn set_authority(&self, authority: AccountId) {
        let mut authorities = self.authorities.write();
        authorities.clear();
        authorities.insert(authority);
    }
}

#[async_trait]
impl StakeRegistryEffects for InMemoryStakeRegistry {
    async fn stake_snapshot(&self) -> Result<StakeSnapshot> {
        Ok(self.stake.read().clone())
    }

    async fn is_authority(&self, identity: &AccountId) -> Result<bool> {
        Ok(self.authorities.read().contains(identity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::account;

    #[tokio::test]
    async fn test_registry_views() {
        let registry = InMemoryStakeRegistry::new(account(100), [(account(1), 1000)]);
        registry.set_weight(account(2), 2000);

        assert_eq!(registry.total_eligible_weight().await.unwrap(), 3000);
        assert_eq!(registry.current_stake_weight(&account(2)).await.unwrap(), 2000);
        assert!(registry.is_authority(&account(100)).await.unwrap());
        assert!(!registry.is_authority(&account(1)).await.unwrap());

        registry.remove_operator(&account(1));
        assert_eq!(registry.current_stake_weight(&account(1)).await.unwrap(), 0);
    }
}
