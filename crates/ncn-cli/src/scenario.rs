//! TOML input files.
//!
//! A rewards file lists leaves:
//!
//! ```toml
//! [[leaves]]
//! beneficiary = "0a0a…"
//! amount = 123456789
//! ```
//!
//! A scenario file describes operators, funding and a sequence of rounds.
//! Slots must never go backwards across the whole script.

use std::path::Path;

use anyhow::{bail, Context, Result};
use ncn_core::{AccountId, BeneficiaryId, NcnConfig, OperatorId, StakeSnapshot};
use ncn_rewards::{RewardLeaf, RewardsTree};
use serde::Deserialize;

/// Contents of a rewards file.
#[derive(Debug, Clone, Deserialize)]
pub struct RewardsFile {
    /// Leaves in any order; the tree sorts them
    pub leaves: Vec<RewardLeaf>,
}

impl RewardsFile {
    /// Read and parse a rewards file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read rewards file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("invalid rewards file {}", path.display()))
    }

    /// Build the reward tree over the file's leaves.
    pub fn tree(&self) -> Result<RewardsTree> {
        Ok(RewardsTree::build(self.leaves.clone())?)
    }
}

/// One operator and its delegated weight.
#[derive(Debug, Clone, Deserialize)]
pub struct OperatorEntry {
    /// Operator identity
    pub id: OperatorId,
    /// Delegated stake
    pub weight: u64,
}

/// Tokens minted to `funder` and moved into the reserve before round one.
#[derive(Debug, Clone, Deserialize)]
pub struct Funding {
    /// Account minted into and debited
    pub funder: AccountId,
    /// Tokens minted and transferred
    pub amount: u64,
}

/// One vote cast at `slot`.
#[derive(Debug, Clone, Deserialize)]
pub struct VoteStep {
    /// Voting operator
    pub operator: OperatorId,
    /// Defaults to an approval
    #[serde(default = "default_approve")]
    pub approve: bool,
    /// Slot to cast the vote at
    pub slot: u64,
}

fn default_approve() -> bool {
    true
}

/// One round: propose the tree's root, vote, evaluate, then claim.
#[derive(Debug, Clone, Deserialize)]
pub struct RoundStep {
    /// Slot the authority proposes at
    pub propose_at: u64,
    /// Slot consensus is evaluated at
    pub check_at: u64,
    /// Leaves of the candidate tree
    pub leaves: Vec<RewardLeaf>,
    /// Votes in casting order
    #[serde(default)]
    pub votes: Vec<VoteStep>,
    /// Beneficiaries that claim from this round's tree after evaluation
    #[serde(default)]
    pub claims: Vec<BeneficiaryId>,
}

/// Complete simulation script.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    /// Inline config; falls back to `--config` when absent
    pub config: Option<NcnConfig>,
    /// Reward reserve account
    pub reserve: AccountId,
    /// Optional reserve funding before the first round
    pub funding: Option<Funding>,
    /// Eligible operator set
    pub operators: Vec<OperatorEntry>,
    /// Rounds in execution order
    pub rounds: Vec<RoundStep>,
}

impl Scenario {
    /// Read and parse a scenario file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("invalid scenario {}", path.display()))
    }

    /// Parse a scenario and reject slots that go backwards.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let scenario: Scenario = toml::from_str(content)?;
        scenario.check_slots()?;
        Ok(scenario)
    }

    /// Registry view of the operator set.
    pub fn stake_snapshot(&self) -> StakeSnapshot {
        StakeSnapshot::from_weights(self.operators.iter().map(|op| (op.id, op.weight)))
    }

    /// Config from the scenario, else from `fallback`.
    pub fn resolve_config(&self, fallback: Option<NcnConfig>) -> Result<NcnConfig> {
        match (&self.config, fallback) {
            (Some(config), _) => {
                config.validate()?;
                Ok(config.clone())
            }
            (None, Some(config)) => Ok(config),
            (None, None) => bail!("scenario has no [config] and no --config was given"),
        }
    }

    fn check_slots(&self) -> Result<()> {
        let mut last = 0u64;
        for (index, round) in self.rounds.iter().enumerate() {
            let slots = std::iter::once(round.propose_at)
                .chain(round.votes.iter().map(|v| v.slot))
                .chain(std::iter::once(round.check_at));
            for slot in slots {
                if slot < last {
                    bail!("round {index}: slot {slot} is earlier than slot {last}");
                }
                last = slot;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = r#"
reserve = "fafafafafafafafafafafafafafafafafafafafafafafafafafafafafafafafa"

[[operators]]
id = "0101010101010101010101010101010101010101010101010101010101010101"
weight = 1000

[[rounds]]
propose_at = 0
check_at = 3
leaves = [{ beneficiary = "0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a", amount = 5 }]
votes = [{ operator = "0101010101010101010101010101010101010101010101010101010101010101", slot = 1 }]
"#;

    #[test]
    fn test_parse_scenario() {
        let scenario = Scenario::from_toml_str(SCENARIO).unwrap();
        assert_eq!(scenario.rounds.len(), 1);
        assert!(scenario.rounds[0].votes[0].approve);
        assert_eq!(scenario.stake_snapshot().total_weight().unwrap(), 1000);
        assert!(scenario.resolve_config(None).is_err());
    }

    #[test]
    fn test_slots_must_not_go_backwards() {
        let bad = SCENARIO.replace("check_at = 3", "check_at = 0");
        assert!(Scenario::from_toml_str(&bad).is_err());
    }
}
