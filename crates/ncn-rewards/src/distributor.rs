//! Effectful reward distributor.
//!
//! Pays claims out of a reserve account through the token ledger. Claims
//! for one beneficiary run one at a time behind that beneficiary's lock;
//! claims for different beneficiaries do not wait on each other. The claim
//! record is committed only after the ledger confirms the transfer.

use std::collections::HashMap;
use std::sync::Arc;

use ncn_core::{AccountId, BeneficiaryId, Hash32, NcnError, Result, TokenLedgerEffects};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::ledger::{ClaimPlan, ClaimRequest, RewardLedger};

/// Pays cumulative reward claims from `reserve`.
pub struct RewardDistributor<L> {
    ledger: L,
    reserve: AccountId,
    records: Mutex<RewardLedger>,
    claim_locks: Mutex<HashMap<BeneficiaryId, Arc<tokio::sync::Mutex<()>>>>,
}

impl<L> RewardDistributor<L>
where
    L: TokenLedgerEffects,
{
    /// Distributor with no claim history.
    pub fn new(ledger: L, reserve: AccountId) -> Self {
        Self::from_records(ledger, reserve, RewardLedger::new())
    }

    /// Resume with previously persisted claim records.
    pub fn from_records(ledger: L, reserve: AccountId, records: RewardLedger) -> Self {
        Self {
            ledger,
            reserve,
            records: Mutex::new(records),
            claim_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Account holding the rewards.
    pub fn reserve(&self) -> AccountId {
        self.reserve
    }

    /// Tokens currently held by the reserve.
    pub async fn reserve_balance(&self) -> Result<u64> {
        Ok(self.ledger.balance(&self.reserve).await?)
    }

    /// Move `amount` from `funder` into the reserve.
    pub async fn fund_rewards(&self, funder: &AccountId, amount: u64) -> Result<()> {
        if amount == 0 {
            return Err(NcnError::invalid("funding amount must be greater than zero"));
        }

        match self.ledger.transfer(funder, &self.reserve, amount).await {
            Ok(()) => {
                info!(funder = %funder, amount, reserve = %self.reserve, "Reward reserve funded");
                Ok(())
            }
            Err(err) => {
                warn!(funder = %funder, amount, error = %err, "Reserve funding failed");
                Err(err.into())
            }
        }
    }

    /// Pay `request` against `finalized_root` on behalf of `caller`.
    ///
    /// Returns the committed plan. A ledger failure returns
    /// `LedgerTransferFailed` and leaves the beneficiary's record as it was.
    pub async fn claim(
        &self,
        caller: &AccountId,
        request: &ClaimRequest,
        finalized_root: Option<Hash32>,
    ) -> Result<ClaimPlan> {
        let lock = self.claim_lock(&request.beneficiary);
        let _guard = lock.lock().await;

        let plan = match self
            .records
            .lock()
            .prepare_claim(caller, request, finalized_root)
        {
            Ok(plan) => plan,
            Err(err) => {
                debug!(
                    beneficiary = %request.beneficiary,
                    leaf_index = request.leaf_index,
                    error = %err,
                    "Claim rejected"
                );
                return Err(err);
            }
        };

        if let Err(err) = self
            .ledger
            .transfer(&self.reserve, &plan.beneficiary, plan.payable)
            .await
        {
            warn!(
                beneficiary = %plan.beneficiary,
                payable = plan.payable,
                error = %err,
                "Reward transfer failed, claim record unchanged"
            );
            return Err(err.into());
        }

        self.records.lock().commit(&plan)?;
        info!(
            beneficiary = %plan.beneficiary,
            payable = plan.payable,
            claimed = plan.new_claimed,
            "Reward claimed"
        );
        Ok(plan)
    }

    /// Amount already paid to `beneficiary`.
    pub fn claimed_amount(&self, beneficiary: &BeneficiaryId) -> u64 {
        self.records.lock().claimed_amount(beneficiary)
    }

    /// Copy of every claim record for persistence or inspection.
    pub fn records(&self) -> RewardLedger {
        self.records.lock().clone()
    }

    fn claim_lock(&self, beneficiary: &BeneficiaryId) -> Arc<tokio::sync::Mutex<()>> {
        self.claim_locks
            .lock()
            .entry(*beneficiary)
            .or_default()
            .clone()
    }
}
