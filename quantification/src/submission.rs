//! Quantifier submissions.
//!
//! A submission mutates exactly one quantification and immediately
//! recomputes the owning item's realized score, followed by every item
//! whose score is inherited from it through duplicate markers.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

#[cfg(feature = "typescript")]
use ts_rs::TS;

use crate::consensus::{score_index, ConsensusScorer};
use crate::duplicate::DuplicateGraph;
use crate::error::{QuantificationError, Result};
use crate::settings::QuantificationSettings;
use crate::types::{Period, PeriodStatus, PraiseId, PraiseItem, UserId};

/// What a quantifier submits for one item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase", default)]
pub struct QuantificationInput {
    /// Score from the allowed scale
    pub score: u32,
    /// Dismiss the item as not being praise
    pub dismissed: bool,
    /// Mark the item as a repeat of another
    pub duplicate_of: Option<PraiseId>,
}

impl QuantificationInput {
    /// Submit a score.
    pub fn score(score: u32) -> Self {
        Self {
            score,
            ..Default::default()
        }
    }

    /// Dismiss the item.
    pub fn dismiss() -> Self {
        Self {
            dismissed: true,
            ..Default::default()
        }
    }

    /// Mark the item as a duplicate of `original`.
    pub fn duplicate_of(original: impl Into<PraiseId>) -> Self {
        Self {
            duplicate_of: Some(original.into()),
            ..Default::default()
        }
    }

    /// Reduce to a single resolved state: dismissal, then duplicate, then score.
    pub fn normalized(self) -> Self {
        if self.dismissed {
            Self::dismiss()
        } else if self.duplicate_of.is_some() {
            Self {
                score: 0,
                dismissed: false,
                duplicate_of: self.duplicate_of,
            }
        } else {
            Self::score(self.score)
        }
    }
}

/// Applies submissions against a snapshot of a period's items.
#[derive(Debug, Clone)]
pub struct SubmissionProcessor<'a> {
    settings: &'a QuantificationSettings,
    scorer: ConsensusScorer,
}

impl<'a> SubmissionProcessor<'a> {
    /// Create a processor for the given settings.
    pub fn new(settings: &'a QuantificationSettings) -> Self {
        Self {
            settings,
            scorer: ConsensusScorer::from_settings(settings),
        }
    }

    /// Apply one input from `quantifier` to each of `praise_ids`.
    ///
    /// All-or-nothing: returns the changed items, or an error with `items`
    /// untouched.
    pub fn apply(
        &self,
        period: &Period,
        items: &[PraiseItem],
        praise_ids: &[PraiseId],
        quantifier: &UserId,
        input: &QuantificationInput,
    ) -> Result<Vec<PraiseItem>> {
        period.require_status(PeriodStatus::Quantify)?;
        // Replaced quantifiers keep their submitted slots but may not edit them
        if !period.has_quantifier(quantifier) {
            return Err(QuantificationError::NotAssigned {
                quantifier_id: quantifier.clone(),
            });
        }
        let input = input.clone().normalized();
        if input.duplicate_of.is_none()
            && !input.dismissed
            && !self.settings.is_allowed_score(input.score)
        {
            return Err(QuantificationError::InvalidScore { score: input.score });
        }

        let mut working: Vec<PraiseItem> = items.to_vec();
        let positions: HashMap<PraiseId, usize> = working
            .iter()
            .enumerate()
            .map(|(i, item)| (item.id.clone(), i))
            .collect();
        let mut scores = score_index(&working);
        let mut changed: BTreeSet<usize> = BTreeSet::new();

        for praise_id in praise_ids {
            let index = *positions
                .get(praise_id)
                .ok_or_else(|| QuantificationError::PraiseNotFound {
                    praise_id: praise_id.clone(),
                })?;

            if let Some(original) = &input.duplicate_of {
                if !positions.contains_key(original) {
                    return Err(QuantificationError::PraiseNotFound {
                        praise_id: original.clone(),
                    });
                }
                if DuplicateGraph::build(&working).would_create_cycle(praise_id, original) {
                    return Err(QuantificationError::DuplicateCycle {
                        praise_id: praise_id.clone(),
                        duplicate_of: original.clone(),
                    });
                }
            }

            let item = &mut working[index];
            let quantification = item.quantification_by_mut(quantifier).ok_or_else(|| {
                QuantificationError::NotQuantifierOfPraise {
                    praise_id: praise_id.clone(),
                    quantifier_id: quantifier.clone(),
                }
            })?;
            quantification.score = input.score;
            quantification.dismissed = input.dismissed;
            quantification.duplicate_of = input.duplicate_of.clone();
            quantification.updated_at = chrono::Utc::now();

            self.scorer.refresh(item, &scores);
            scores.insert(item.id.clone(), item.score_realized);
            changed.insert(index);
            debug!(
                praise_id = %praise_id,
                quantifier = %quantifier,
                score_realized = item.score_realized,
                "Quantification applied"
            );

            let graph = DuplicateGraph::build(&working);
            for dependent in graph.dependents_of(praise_id) {
                if let Some(&dep_index) = positions.get(&dependent) {
                    let dep = &mut working[dep_index];
                    if self.scorer.refresh(dep, &scores) {
                        scores.insert(dep.id.clone(), dep.score_realized);
                        changed.insert(dep_index);
                    }
                }
            }
        }

        Ok(changed.into_iter().map(|i| working[i].clone()).collect())
    }
}

/// Apply one quantifier's submission to a single praise item.
pub fn apply_quantification(
    period: &Period,
    items: &[PraiseItem],
    praise_id: &PraiseId,
    quantifier: &UserId,
    input: &QuantificationInput,
    settings: &QuantificationSettings,
) -> Result<Vec<PraiseItem>> {
    SubmissionProcessor::new(settings).apply(
        period,
        items,
        std::slice::from_ref(praise_id),
        quantifier,
        input,
    )
}

/// Apply one quantifier's submission to several praise items at once.
pub fn apply_quantifications(
    period: &Period,
    items: &[PraiseItem],
    praise_ids: &[PraiseId],
    quantifier: &UserId,
    input: &QuantificationInput,
    settings: &QuantificationSettings,
) -> Result<Vec<PraiseItem>> {
    SubmissionProcessor::new(settings).apply(period, items, praise_ids, quantifier, input)
}
