//! Quantification settings shared by the assignment and scoring components.

use serde::{Deserialize, Serialize};

#[cfg(feature = "typescript")]
use ts_rs::TS;

use crate::error::{QuantificationError, Result};

/// Scores a quantifier may submit, a Fibonacci-like scale.
pub const DEFAULT_ALLOWED_SCORES: [u32; 11] = [0, 1, 2, 3, 5, 8, 13, 21, 34, 55, 89];

/// Settings for a period's quantification round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase", default)]
pub struct QuantificationSettings {
    /// Independent quantifiers per praise item (redundancy factor)
    pub quantifiers_per_praise: usize,
    /// Target workload used when sizing the pool
    pub praise_per_quantifier: usize,
    /// Ascending list of allowed scores
    pub allowed_scores: Vec<u32>,
    /// Share of the original's score a duplicate inherits (0.0 - 1.0)
    pub duplicate_discount: f64,
}

impl Default for QuantificationSettings {
    fn default() -> Self {
        Self {
            quantifiers_per_praise: 3,
            praise_per_quantifier: 50,
            allowed_scores: DEFAULT_ALLOWED_SCORES.to_vec(),
            duplicate_discount: 0.1,
        }
    }
}

impl QuantificationSettings {
    /// Builder: set the redundancy factor.
    pub fn with_redundancy(mut self, quantifiers_per_praise: usize) -> Self {
        self.quantifiers_per_praise = quantifiers_per_praise;
        self
    }

    /// Builder: set the per-quantifier workload.
    pub fn with_praise_per_quantifier(mut self, praise_per_quantifier: usize) -> Self {
        self.praise_per_quantifier = praise_per_quantifier;
        self
    }

    /// Builder: set the duplicate discount.
    pub fn with_duplicate_discount(mut self, discount: f64) -> Self {
        self.duplicate_discount = discount;
        self
    }

    /// Whether `score` may be submitted.
    pub fn is_allowed_score(&self, score: u32) -> bool {
        self.allowed_scores.binary_search(&score).is_ok()
    }

    /// Check internal consistency.
    pub fn validate(&self) -> Result<()> {
        if self.quantifiers_per_praise == 0 {
            return Err(QuantificationError::InvalidSettings(
                "quantifiersPerPraise must be at least 1".to_string(),
            ));
        }
        if self.praise_per_quantifier == 0 {
            return Err(QuantificationError::InvalidSettings(
                "praisePerQuantifier must be at least 1".to_string(),
            ));
        }
        if self.allowed_scores.is_empty() {
            return Err(QuantificationError::InvalidSettings(
                "allowedScores must not be empty".to_string(),
            ));
        }
        if self.allowed_scores.windows(2).any(|w| w[0] >= w[1]) {
            return Err(QuantificationError::InvalidSettings(
                "allowedScores must be strictly ascending".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.duplicate_discount) {
            return Err(QuantificationError::InvalidSettings(format!(
                "duplicateDiscount {} outside 0.0 - 1.0",
                self.duplicate_discount
            )));
        }
        Ok(())
    }
}
