//! Consensus scoring - collapses one item's quantifications into a single score.
//!
//! Rules, in order:
//! 1. Any duplicate marker puts the whole item into duplicate treatment: it
//!    inherits the original's realized score times the duplicate discount.
//! 2. Otherwise the realized score is the mean of the non-zero scores.
//!    Dismissals are ignored as long as one quantifier scored the item.
//! 3. All dismissed, or nothing submitted yet, realizes 0.

use std::collections::HashMap;

use tracing::debug;

use crate::settings::QuantificationSettings;
use crate::types::{PraiseId, PraiseItem, QuantificationState};

/// Source of already-realized scores for duplicate originals.
pub trait ScoreLookup {
    /// Cached `scoreRealized` of `praise_id`, if known.
    fn score_realized(&self, praise_id: &PraiseId) -> Option<f64>;
}

impl ScoreLookup for HashMap<PraiseId, f64> {
    fn score_realized(&self, praise_id: &PraiseId) -> Option<f64> {
        self.get(praise_id).copied()
    }
}

impl ScoreLookup for [PraiseItem] {
    fn score_realized(&self, praise_id: &PraiseId) -> Option<f64> {
        self.iter()
            .find(|item| &item.id == praise_id)
            .map(|item| item.score_realized)
    }
}

/// How an item's realized score was reached.
#[derive(Debug, Clone, PartialEq)]
pub enum ScoreOutcome {
    /// Nothing submitted yet
    Pending,
    /// Every submission was a dismissal
    Dismissed,
    /// Inherited from an original item
    Duplicate {
        /// Original item
        original: PraiseId,
        /// Original's realized score before discount
        original_score: f64,
    },
    /// Mean of submitted scores
    Scored {
        /// Number of scores averaged
        count: usize,
        /// Sum of scores averaged
        sum: u64,
    },
}

/// Computes realized scores.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConsensusScorer {
    duplicate_discount: f64,
}

impl ConsensusScorer {
    /// Create a scorer with the given duplicate discount.
    pub fn new(duplicate_discount: f64) -> Self {
        Self { duplicate_discount }
    }

    /// Create from quantification settings.
    pub fn from_settings(settings: &QuantificationSettings) -> Self {
        Self::new(settings.duplicate_discount)
    }

    /// Classify the item's quantifications.
    pub fn outcome<L: ScoreLookup + ?Sized>(&self, item: &PraiseItem, originals: &L) -> ScoreOutcome {
        if let Some(original) = item.duplicate_target() {
            let original_score = originals.score_realized(original).unwrap_or_else(|| {
                debug!(
                    praise_id = %item.id,
                    original = %original,
                    "Duplicate original not available, inheriting 0"
                );
                0.0
            });
            return ScoreOutcome::Duplicate {
                original: original.clone(),
                original_score,
            };
        }

        let mut count = 0usize;
        let mut sum = 0u64;
        let mut dismissed = 0usize;
        for quantification in &item.quantifications {
            match quantification.state() {
                QuantificationState::Scored(score) => {
                    count += 1;
                    sum += u64::from(score);
                }
                QuantificationState::Dismissed => dismissed += 1,
                QuantificationState::Pending | QuantificationState::Duplicate(_) => {}
            }
        }

        if count > 0 {
            ScoreOutcome::Scored { count, sum }
        } else if dismissed > 0 {
            ScoreOutcome::Dismissed
        } else {
            ScoreOutcome::Pending
        }
    }

    /// Compute the item's realized score.
    pub fn realize<L: ScoreLookup + ?Sized>(&self, item: &PraiseItem, originals: &L) -> f64 {
        match self.outcome(item, originals) {
            ScoreOutcome::Pending | ScoreOutcome::Dismissed => 0.0,
            ScoreOutcome::Duplicate { original_score, .. } => {
                original_score * self.duplicate_discount
            }
            ScoreOutcome::Scored { count, sum } => sum as f64 / count as f64,
        }
    }

    /// Recompute and cache the item's realized score.
    ///
    /// Returns true when the cached value changed.
    pub fn refresh<L: ScoreLookup + ?Sized>(&self, item: &mut PraiseItem, originals: &L) -> bool {
        let score = self.realize(item, originals);
        let changed = score != item.score_realized;
        item.score_realized = score;
        changed
    }
}

impl Default for ConsensusScorer {
    fn default() -> Self {
        Self::from_settings(&QuantificationSettings::default())
    }
}

/// Compute an item's realized score with the given duplicate discount.
pub fn realize_score<L: ScoreLookup + ?Sized>(
    item: &PraiseItem,
    originals: &L,
    duplicate_discount: f64,
) -> f64 {
    ConsensusScorer::new(duplicate_discount).realize(item, originals)
}

/// Snapshot of every item's cached realized score.
pub fn score_index(items: &[PraiseItem]) -> HashMap<PraiseId, f64> {
    items
        .iter()
        .map(|item| (item.id.clone(), item.score_realized))
        .collect()
}
