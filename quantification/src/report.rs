//! Period progress and result summaries.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[cfg(feature = "typescript")]
use ts_rs::TS;

use crate::types::{Period, PraiseItem, UserId};

/// Workload and completion for one quantifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct QuantifierProgress {
    /// Quantifier
    pub quantifier_id: UserId,
    /// Quantifications they hold
    pub assigned_count: usize,
    /// Of those, how many are submitted
    pub finished_count: usize,
}

impl QuantifierProgress {
    /// Whether every assigned item is submitted.
    pub fn is_done(&self) -> bool {
        self.finished_count == self.assigned_count
    }
}

/// Realized totals for one receiver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct ReceiverTotal {
    /// Receiver
    pub receiver_id: UserId,
    /// Praise items received
    pub praise_count: usize,
    /// Sum of realized scores
    pub score_realized: f64,
}

/// Progress of every quantifier in the period's list, in list order.
///
/// Quantifiers whose submitted work remains after being replaced are not
/// listed.
pub fn quantifier_progress(period: &Period, items: &[PraiseItem]) -> Vec<QuantifierProgress> {
    period
        .quantifiers
        .iter()
        .map(|quantifier| {
            let held = items.iter().filter_map(|item| item.quantification_by(quantifier));
            let (assigned_count, finished_count) = held.fold((0, 0), |(assigned, finished), q| {
                (assigned + 1, finished + usize::from(q.is_resolved()))
            });
            QuantifierProgress {
                quantifier_id: quantifier.clone(),
                assigned_count,
                finished_count,
            }
        })
        .collect()
}

/// Per-receiver totals ordered by receiver id.
pub fn receiver_totals(items: &[PraiseItem]) -> Vec<ReceiverTotal> {
    let mut totals: BTreeMap<&UserId, (usize, f64)> = BTreeMap::new();
    for item in items {
        let entry = totals.entry(&item.receiver).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += item.score_realized;
    }

    totals
        .into_iter()
        .map(|(receiver, (praise_count, score_realized))| ReceiverTotal {
            receiver_id: receiver.clone(),
            praise_count,
            score_realized,
        })
        .collect()
}
