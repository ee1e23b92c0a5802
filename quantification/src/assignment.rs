//! Assignment engine - distributes a period's praise among quantifiers.
//!
//! Greedy least-loaded selection: items are visited in a stable order
//! (receiver, then creation time) and each one takes the `redundancy`
//! eligible quantifiers with the lowest running load, ties broken by
//! quantifier id. Exclusions are sparse (a quantifier never reviews praise
//! they gave or received), so this keeps loads within one of each other
//! without a matching solver.
//!
//! The operation is all-or-nothing: inputs are never mutated and the
//! updated period and items are only returned when every item was served.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

#[cfg(feature = "typescript")]
use ts_rs::TS;

use crate::error::{QuantificationError, Result};
use crate::pool::{check_pool_size, PoolSizeReport};
use crate::settings::QuantificationSettings;
use crate::types::{Period, PeriodStatus, PraiseId, PraiseItem, Quantification, UserId};

/// A quantifier and their running workload within a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct QuantifierPoolEntry {
    /// Quantifier
    pub quantifier_id: UserId,
    /// Praise items assigned so far
    pub assigned_count: usize,
}

/// Result of a successful assignment.
#[derive(Debug, Clone)]
pub struct AssignmentOutcome {
    /// Period moved to QUANTIFY with its quantifier list set
    pub period: Period,
    /// Items with placeholders attached, in input order
    pub praise_items: Vec<PraiseItem>,
    /// Final workload per pool member, by quantifier id
    pub loads: Vec<QuantifierPoolEntry>,
    /// Pool check performed before assigning
    pub pool: PoolSizeReport,
    /// SHA256 over the ordered (praise, quantifier) pairs
    pub digest: String,
}

/// Assigns quantifiers to praise items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignmentEngine {
    redundancy: usize,
    praise_per_quantifier: usize,
}

impl AssignmentEngine {
    /// Create an engine for the given redundancy and workload target.
    pub fn new(redundancy: usize, praise_per_quantifier: usize) -> Self {
        Self {
            redundancy,
            praise_per_quantifier,
        }
    }

    /// Create from quantification settings.
    pub fn from_settings(settings: &QuantificationSettings) -> Self {
        Self::new(settings.quantifiers_per_praise, settings.praise_per_quantifier)
    }

    /// Redundancy factor.
    pub fn redundancy(&self) -> usize {
        self.redundancy
    }

    /// Check the pool for `period` without assigning anything.
    pub fn check_pool(&self, period: &Period, items: &[PraiseItem], pool_size: usize) -> PoolSizeReport {
        check_pool_size(
            receiver_count(period, items),
            pool_size,
            self.redundancy,
            self.praise_per_quantifier,
        )
    }

    /// Assign `redundancy` quantifiers to every item.
    pub fn assign(
        &self,
        period: &Period,
        items: &[PraiseItem],
        quantifiers: &[UserId],
    ) -> Result<AssignmentOutcome> {
        period.require_status(PeriodStatus::Open)?;
        if self.redundancy == 0 {
            return Err(QuantificationError::InvalidSettings(
                "redundancy must be at least 1".to_string(),
            ));
        }

        let pool: BTreeSet<&UserId> = quantifiers.iter().collect();
        let report = self.check_pool(period, items, pool.len());
        if !report.is_sufficient() || pool.is_empty() {
            let deficit = report.deficit.max(1);
            warn!(
                period_id = %period.id,
                pool_size = pool.len(),
                required = report.required_pool_size,
                deficit,
                "Quantifier pool too small, refusing assignment"
            );
            return Err(QuantificationError::InsufficientPool { deficit });
        }

        if let Some(item) = items.iter().find(|item| !item.quantifications.is_empty()) {
            return Err(QuantificationError::PraiseAlreadyAssigned {
                praise_id: item.id.clone(),
            });
        }

        let mut loads: BTreeMap<&UserId, usize> = pool.iter().map(|q| (*q, 0)).collect();
        let mut selections: Vec<Vec<UserId>> = vec![Vec::new(); items.len()];

        for index in visit_order(items) {
            let item = &items[index];
            let mut eligible: Vec<(&UserId, usize)> = loads
                .iter()
                .filter(|(quantifier, _)| !item.involves(quantifier))
                .map(|(quantifier, load)| (*quantifier, *load))
                .collect();

            if eligible.len() < self.redundancy {
                warn!(
                    period_id = %period.id,
                    praise_id = %item.id,
                    eligible = eligible.len(),
                    redundancy = self.redundancy,
                    "Assignment infeasible"
                );
                return Err(QuantificationError::AssignmentInfeasible {
                    praise_id: item.id.clone(),
                });
            }

            // Least loaded first; the map already yields ids ascending
            eligible.sort_by_key(|(_, load)| *load);
            let chosen: Vec<UserId> = eligible
                .into_iter()
                .take(self.redundancy)
                .map(|(quantifier, _)| quantifier.clone())
                .collect();

            for quantifier in &chosen {
                if let Some(load) = loads.get_mut(quantifier) {
                    *load += 1;
                }
            }
            debug!(praise_id = %item.id, quantifiers = ?chosen, "Assigned praise");
            selections[index] = chosen;
        }

        let praise_items: Vec<PraiseItem> = items
            .iter()
            .zip(selections)
            .map(|(item, chosen)| {
                let mut updated = item.clone();
                updated.quantifications = chosen.into_iter().map(Quantification::placeholder).collect();
                updated.score_realized = 0.0;
                updated
            })
            .collect();

        let mut updated_period = period.clone();
        updated_period.advance_to(PeriodStatus::Quantify)?;
        updated_period.quantifiers = loads
            .iter()
            .filter(|(_, load)| **load > 0)
            .map(|(quantifier, _)| (*quantifier).clone())
            .collect();

        let loads: Vec<QuantifierPoolEntry> = loads
            .into_iter()
            .map(|(quantifier, assigned_count)| QuantifierPoolEntry {
                quantifier_id: quantifier.clone(),
                assigned_count,
            })
            .collect();

        let digest = assignment_digest(&praise_items);

        info!(
            period_id = %period.id,
            praise = praise_items.len(),
            quantifiers = updated_period.quantifiers.len(),
            redundancy = self.redundancy,
            digest = %digest,
            "Quantifiers assigned"
        );

        Ok(AssignmentOutcome {
            period: updated_period,
            praise_items,
            loads,
            pool: report,
            digest,
        })
    }
}

impl Default for AssignmentEngine {
    fn default() -> Self {
        Self::from_settings(&QuantificationSettings::default())
    }
}

/// Assign `redundancy` quantifiers to every item of an OPEN period.
pub fn assign_quantifiers(
    period: &Period,
    items: &[PraiseItem],
    quantifiers: &[UserId],
    settings: &QuantificationSettings,
) -> Result<AssignmentOutcome> {
    AssignmentEngine::from_settings(settings).assign(period, items, quantifiers)
}

/// Distinct receivers named by the period or its items.
fn receiver_count(period: &Period, items: &[PraiseItem]) -> usize {
    period
        .receivers
        .iter()
        .chain(items.iter().map(|item| &item.receiver))
        .collect::<BTreeSet<_>>()
        .len()
}

/// Item indices ordered by receiver, creation time, then input position.
fn visit_order(items: &[PraiseItem]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..items.len()).collect();
    order.sort_by(|&a, &b| {
        (&items[a].receiver, items[a].created_at, a).cmp(&(&items[b].receiver, items[b].created_at, b))
    });
    order
}

/// Hash the ordered (praise, quantifier) pairs of an assignment.
pub fn assignment_digest(items: &[PraiseItem]) -> String {
    let pairs: Vec<(&PraiseId, Vec<&UserId>)> = items
        .iter()
        .map(|item| {
            (
                &item.id,
                item.quantifications.iter().map(|q| &q.quantifier).collect(),
            )
        })
        .collect();
    let json = serde_json::to_string(&pairs).unwrap_or_default();

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    hex::encode(hasher.finalize())
}
