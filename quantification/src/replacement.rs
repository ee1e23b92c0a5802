//! Quantifier replacement.
//!
//! Swaps one quantifier for another mid-cycle. Only pending work moves to
//! the replacement; anything the outgoing quantifier already submitted
//! stays attributed to them.

use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::consensus::{score_index, ConsensusScorer};
use crate::error::{QuantificationError, Result};
use crate::settings::QuantificationSettings;
use crate::types::{Period, PeriodStatus, PraiseItem, UserId};

/// Result of a successful replacement.
#[derive(Debug, Clone)]
pub struct ReplacementOutcome {
    /// Period with the quantifier list updated
    pub period: Period,
    /// Items that changed, in input order
    pub praise_items: Vec<PraiseItem>,
    /// Pending quantifications moved to the new quantifier
    pub transferred: usize,
    /// Submitted quantifications left with the outgoing quantifier
    pub retained: usize,
}

/// Replace `current` with `replacement` in a QUANTIFY period.
pub fn replace_quantifier(
    period: &Period,
    current: &UserId,
    replacement: &UserId,
    items: &[PraiseItem],
    settings: &QuantificationSettings,
) -> Result<ReplacementOutcome> {
    period.require_status(PeriodStatus::Quantify)?;
    if !period.has_quantifier(current) {
        return Err(QuantificationError::NotAssigned {
            quantifier_id: current.clone(),
        });
    }
    if period.has_quantifier(replacement) {
        return Err(QuantificationError::AlreadyAssigned {
            quantifier_id: replacement.clone(),
        });
    }

    let scorer = ConsensusScorer::from_settings(settings);
    let scores = score_index(items);
    let mut working: Vec<PraiseItem> = items.to_vec();
    let mut changed: BTreeSet<usize> = BTreeSet::new();
    let mut transferred = 0usize;
    let mut retained = 0usize;

    for (index, item) in working.iter_mut().enumerate() {
        let Some(position) = item
            .quantifications
            .iter()
            .position(|q| &q.quantifier == current)
        else {
            continue;
        };

        if item.quantifications[position].is_resolved() {
            retained += 1;
        } else {
            if item.involves(replacement) || item.quantification_by(replacement).is_some() {
                return Err(QuantificationError::ReplacementIneligible {
                    praise_id: item.id.clone(),
                    quantifier_id: replacement.clone(),
                });
            }
            let quantification = &mut item.quantifications[position];
            quantification.quantifier = replacement.clone();
            quantification.reset();
            transferred += 1;
            changed.insert(index);
        }

        if scorer.refresh(item, &scores) {
            changed.insert(index);
        }
        debug!(praise_id = %item.id, score_realized = item.score_realized, "Rescored after replacement");
    }

    let mut updated_period = period.clone();
    for quantifier in updated_period.quantifiers.iter_mut() {
        if quantifier == current {
            *quantifier = replacement.clone();
        }
    }

    info!(
        period_id = %period.id,
        current = %current,
        replacement = %replacement,
        transferred,
        retained,
        "Quantifier replaced"
    );

    Ok(ReplacementOutcome {
        period: updated_period,
        praise_items: changed.into_iter().map(|i| working[i].clone()).collect(),
        transferred,
        retained,
    })
}
