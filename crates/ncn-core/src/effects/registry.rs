//! Stake registry interface.
//!
//! The staking registry (operator/vault registration and delegation) lives
//! outside this workspace. The ballot box only needs a consistent view of
//! who may vote and with what weight at the moment a round opens.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::{NcnError, Result};
use crate::types::{AccountId, OperatorId};

/// Point-in-time view of every operator's delegated stake.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeSnapshot {
    /// Weight per eligible operator
    pub weights: BTreeMap<OperatorId, u64>,
}

impl StakeSnapshot {
    /// Build from `(operator, weight)` pairs. Later duplicates win.
    pub fn from_weights(weights: impl IntoIterator<Item = (OperatorId, u64)>) -> Self {
        Self {
            weights: weights.into_iter().collect(),
        }
    }

    /// Weight of `operator`, zero when unknown.
    pub fn weight_of(&self, operator: &OperatorId) -> u64 {
        self.weights.get(operator).copied().unwrap_or(0)
    }

    /// Sum of all weights; fails rather than wrapping.
    pub fn total_weight(&self) -> Result<u64> {
        self.weights.values().try_fold(0u64, |acc, weight| {
            acc.checked_add(*weight)
                .ok_or_else(|| NcnError::overflow("total eligible stake"))
        })
    }

    /// True when no operator has stake.
    pub fn is_empty(&self) -> bool {
        self.weights.values().all(|weight| *weight == 0)
    }
}

/// External registry of operator stake and authority identity.
#[async_trait]
pub trait StakeRegistryEffects: Send + Sync {
    /// Consistent snapshot of all eligible operators.
    async fn stake_snapshot(&self) -> Result<StakeSnapshot>;

    /// Whether `identity` is recognised as the deployment authority.
    async fn is_authority(&self, identity: &AccountId) -> Result<bool>;

    /// Current delegated weight of one operator.
    async fn current_stake_weight(&self, operator: &OperatorId) -> Result<u64> {
        Ok(self.stake_snapshot().await?.weight_of(operator))
    }

    /// Total weight of all eligible operators.
    async fn total_eligible_weight(&self) -> Result<u64> {
        self.stake_snapshot().await?.total_weight()
    }
}

/// Blanket implementation for Arc<T> where T: StakeRegistryEffects
#[async_trait]
impl<T: StakeRegistryEffects + ?Sized> StakeRegistryEffects for std::sync::Arc<T> {
    async fn stake_snapshot(&self) -> Result<StakeSnapshot> {
        (**self).stake_snapshot().await
    }

    async fn is_authority(&self, identity: &AccountId) -> Result<bool> {
        (**self).is_authority(identity).await
    }

    async fn current_stake_weight(&self, operator: &OperatorId) -> Result<u64> {
        (**self).current_stake_weight(operator).await
    }

    async fn total_eligible_weight(&self) -> Result<u64> {
        (**self).total_eligible_weight().await
    }
}
