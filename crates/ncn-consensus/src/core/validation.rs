//! Ballot box invariants.
//!
//! Checked after every accepted transition in debug builds and available to
//! callers that load a persisted box from elsewhere.

use ncn_core::{NcnError, Result};

use super::state::BallotBox;

/// Verify every structural invariant of `ballot`.
///
/// - voters are drawn from the round snapshot
/// - `approved + rejected` equals the snapshot weight of all voters
/// - `approved <= total_eligible_weight`
/// - `total_eligible_weight` equals the snapshot total
/// - `finalized_root` and `finalized_round` are set together
pub fn check_invariants(ballot: &BallotBox) -> Result<()> {
    let snapshot_total = ballot.stake_snapshot.total_weight()?;
    if snapshot_total != ballot.total_eligible_weight {
        return Err(NcnError::invariant(format!(
            "total eligible weight {} differs from snapshot total {snapshot_total}",
            ballot.total_eligible_weight
        )));
    }

    let mut voted_weight: u64 = 0;
    for operator in &ballot.voted_operators {
        if !ballot.stake_snapshot.weights.contains_key(operator) {
            return Err(NcnError::invariant(format!(
                "voter {operator} is not in the round snapshot"
            )));
        }
        voted_weight = voted_weight
            .checked_add(ballot.snapshot_weight(operator))
            .ok_or_else(|| NcnError::overflow("voted weight"))?;
    }

    let tallied = ballot
        .approved_weight
        .checked_add(ballot.rejected_weight)
        .ok_or_else(|| NcnError::overflow("tallied weight"))?;
    if tallied != voted_weight {
        return Err(NcnError::invariant(format!(
            "tallied weight {tallied} differs from voter weight {voted_weight}"
        )));
    }

    if ballot.approved_weight > ballot.total_eligible_weight {
        return Err(NcnError::invariant(format!(
            "approved weight {} exceeds total {}",
            ballot.approved_weight, ballot.total_eligible_weight
        )));
    }

    if ballot.finalized_root.is_some() != ballot.finalized_round.is_some() {
        return Err(NcnError::invariant(
            "finalized root and finalized round must be set together",
        ));
    }

    Ok(())
}

/// Debug-build assertion wrapper used by the transitions.
pub(crate) fn debug_assert_invariants(ballot: &BallotBox) {
    if cfg!(debug_assertions) {
        if let Err(err) = check_invariants(ballot) {
            panic!("ballot box invariant broken: {err}");
        }
    }
}
