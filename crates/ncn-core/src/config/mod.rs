//! Deployment configuration.
//!
//! One [`NcnConfig`] exists per deployment. It is created at initialization,
//! its authority may be rotated, and it is otherwise immutable. Files are
//! TOML; `NCN_*` environment variables override individual fields.

pub mod validation;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{NcnError, Result};
use crate::types::AccountId;

pub use validation::{ConfigValidation, ValidationError, ValidationResult};

/// Default voting window in slots.
pub const DEFAULT_VOTE_WINDOW: u64 = 10;

/// Fraction of total eligible stake whose approval finalizes a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuorumThreshold {
    /// Must be at least 1 and at most `denominator`
    pub numerator: u64,
    /// Must be non-zero
    pub denominator: u64,
}

impl QuorumThreshold {
    /// Two thirds of total eligible stake.
    pub const TWO_THIRDS: QuorumThreshold = QuorumThreshold {
        numerator: 2,
        denominator: 3,
    };

    /// Create a validated threshold.
    pub fn new(numerator: u64, denominator: u64) -> Result<Self> {
        let threshold = Self {
            numerator,
            denominator,
        };
        threshold.validate()?;
        Ok(threshold)
    }

    /// `approved / total >= numerator / denominator`, computed without
    /// rounding. Never met when `total` is zero.
    pub fn is_met(&self, approved: u64, total: u64) -> bool {
        if total == 0 {
            return false;
        }
        u128::from(approved) * u128::from(self.denominator)
            >= u128::from(self.numerator) * u128::from(total)
    }
}

impl Default for QuorumThreshold {
    fn default() -> Self {
        Self::TWO_THIRDS
    }
}

impl ConfigValidation for QuorumThreshold {
    fn validate(&self) -> ValidationResult {
        validation::at_least("quorum_threshold.denominator", self.denominator, 1)?;
        validation::at_least("quorum_threshold.numerator", self.numerator, 1)?;
        if self.numerator > self.denominator {
            return Err(ValidationError::Custom {
                field: "quorum_threshold".to_string(),
                message: format!(
                    "{}/{} exceeds total stake",
                    self.numerator, self.denominator
                ),
            });
        }
        Ok(())
    }
}

/// Singleton deployment configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NcnConfig {
    /// Identity permitted to propose roots and rotate itself
    pub authority: AccountId,
    /// Slots a proposal stays open for votes
    #[serde(default = "default_vote_window")]
    pub vote_window: u64,
    /// Approval fraction required to finalize
    #[serde(default)]
    pub quorum_threshold: QuorumThreshold,
}

fn default_vote_window() -> u64 {
    DEFAULT_VOTE_WINDOW
}

impl NcnConfig {
    /// Config with default window and threshold.
    pub fn new(authority: AccountId) -> Self {
        Self {
            authority,
            vote_window: DEFAULT_VOTE_WINDOW,
            quorum_threshold: QuorumThreshold::default(),
        }
    }

    /// Parse a TOML document and validate it.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: NcnConfig = toml::from_str(content)
            .map_err(|e| NcnError::invalid(format!("Invalid TOML config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file, apply `NCN_*` environment overrides, validate.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            NcnError::invalid(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;
        let mut config: NcnConfig = toml::from_str(&content)
            .map_err(|e| NcnError::invalid(format!("Invalid TOML config: {e}")))?;
        config.merge_with_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from the process environment.
    pub fn merge_with_env(&mut self) -> Result<()> {
        self.merge_with_vars(std::env::vars())
    }

    /// Apply overrides from `(key, value)` pairs. Unknown keys are ignored.
    pub fn merge_with_vars(&mut self, vars: impl IntoIterator<Item = (String, String)>) -> Result<()> {
        for (key, value) in vars {
            match key.as_str() {
                "NCN_AUTHORITY" => self.authority = value.parse()?,
                "NCN_VOTE_WINDOW" => self.vote_window = parse_u64(&key, &value)?,
                "NCN_QUORUM_NUMERATOR" => {
                    self.quorum_threshold.numerator = parse_u64(&key, &value)?;
                }
                "NCN_QUORUM_DENOMINATOR" => {
                    self.quorum_threshold.denominator = parse_u64(&key, &value)?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Validate, converting failures into [`NcnError::InvalidInput`].
    pub fn validate(&self) -> Result<()> {
        ConfigValidation::validate(self).map_err(NcnError::from)
    }

    /// Replace the authority. Only the current authority may do this.
    pub fn rotate_authority(&mut self, caller: &AccountId, new_authority: AccountId) -> Result<()> {
        if caller != &self.authority {
            return Err(NcnError::unauthorized("only the authority may rotate itself"));
        }
        self.authority = new_authority;
        Ok(())
    }
}

impl ConfigValidation for NcnConfig {
    fn validate(&self) -> ValidationResult {
        validation::at_least("vote_window", self.vote_window, 1)?;
        self.quorum_threshold.validate()
    }
}

fn parse_u64(key: &str, value: &str) -> Result<u64> {
    value.parse().map_err(|_| {
        NcnError::from(ValidationError::InvalidFormat {
            field: key.to_string(),
            expected: "unsigned integer".to_string(),
            actual: value.to_string(),
        })
    })
}
