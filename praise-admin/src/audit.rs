//! Audit trail for administrative actions.
//!
//! Every assignment, replacement, submission and close is recorded with its
//! outcome, so a period's history can be reconstructed after the fact.

use chrono::{DateTime, Utc};
use quantification::{PeriodId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Maximum entries in the audit log before pruning.
const MAX_AUDIT_ENTRIES: usize = 10_000;

/// Administrative action kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    VerifyPoolSize,
    AssignQuantifiers,
    ReplaceQuantifier,
    Quantify,
    ClosePeriod,
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AuditAction::VerifyPoolSize => "verify_pool_size",
            AuditAction::AssignQuantifiers => "assign_quantifiers",
            AuditAction::ReplaceQuantifier => "replace_quantifier",
            AuditAction::Quantify => "quantify",
            AuditAction::ClosePeriod => "close_period",
        };
        f.write_str(name)
    }
}

/// Whether the action went through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum AuditOutcome {
    Succeeded,
    Refused(String),
}

impl AuditOutcome {
    /// Build from an operation result.
    pub fn from_result<T, E: fmt::Display>(result: &Result<T, E>) -> Self {
        match result {
            Ok(_) => AuditOutcome::Succeeded,
            Err(err) => AuditOutcome::Refused(err.to_string()),
        }
    }

    /// Whether the action succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, AuditOutcome::Succeeded)
    }
}

/// An entry in the audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    /// Unique entry ID
    pub entry_id: String,
    /// Action performed
    pub action: AuditAction,
    /// Period acted on
    pub period_id: PeriodId,
    /// Who requested it
    pub actor: UserId,
    /// Result of the action
    pub outcome: AuditOutcome,
    /// Assignment digest, for assignments that succeeded
    pub digest: Option<String>,
    /// When it happened
    pub recorded_at: DateTime<Utc>,
}

impl AuditEntry {
    /// Create an entry.
    pub fn new(action: AuditAction, period_id: PeriodId, actor: UserId, outcome: AuditOutcome) -> Self {
        Self {
            entry_id: uuid::Uuid::new_v4().to_string(),
            action,
            period_id,
            actor,
            outcome,
            digest: None,
            recorded_at: Utc::now(),
        }
    }

    /// Attach an assignment digest.
    pub fn with_digest(mut self, digest: impl Into<String>) -> Self {
        self.digest = Some(digest.into());
        self
    }
}

/// Audit log of administrative actions.
pub struct AuditLog {
    /// Log entries (newest first)
    entries: Arc<RwLock<VecDeque<AuditEntry>>>,
    /// Maximum entries to retain
    max_entries: usize,
}

impl AuditLog {
    /// Create a new audit log.
    pub fn new() -> Self {
        Self::with_max_entries(MAX_AUDIT_ENTRIES)
    }

    /// Create with custom max entries.
    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(VecDeque::new())),
            max_entries,
        }
    }

    /// Record an entry, returning its ID.
    pub async fn record(&self, entry: AuditEntry) -> String {
        let entry_id = entry.entry_id.clone();

        let mut entries = self.entries.write().await;
        entries.push_front(entry);

        // Prune if over limit
        while entries.len() > self.max_entries {
            entries.pop_back();
        }

        entry_id
    }

    /// Get recent entries.
    pub async fn recent(&self, limit: usize) -> Vec<AuditEntry> {
        let entries = self.entries.read().await;
        entries.iter().take(limit).cloned().collect()
    }

    /// Get entries for a period, newest first.
    pub async fn get_by_period(&self, period_id: &PeriodId, limit: usize) -> Vec<AuditEntry> {
        let entries = self.entries.read().await;
        entries
            .iter()
            .filter(|e| &e.period_id == period_id)
            .take(limit)
            .cloned()
            .collect()
    }

    /// Get entries for an actor, newest first.
    pub async fn get_by_actor(&self, actor: &UserId, limit: usize) -> Vec<AuditEntry> {
        let entries = self.entries.read().await;
        entries
            .iter()
            .filter(|e| &e.actor == actor)
            .take(limit)
            .cloned()
            .collect()
    }

    /// Get statistics.
    pub async fn stats(&self) -> AuditStats {
        let entries = self.entries.read().await;

        let total = entries.len();
        let succeeded = entries.iter().filter(|e| e.outcome.is_success()).count();
        let assignments = entries
            .iter()
            .filter(|e| e.action == AuditAction::AssignQuantifiers && e.outcome.is_success())
            .count();

        AuditStats {
            total_actions: total,
            succeeded,
            refused: total - succeeded,
            assignments,
        }
    }

    /// Clear the log.
    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        entries.clear();
    }

    /// Get count.
    pub async fn count(&self) -> usize {
        let entries = self.entries.read().await;
        entries.len()
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics from the audit log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditStats {
    /// Total actions logged
    pub total_actions: usize,
    /// Actions that went through
    pub succeeded: usize,
    /// Actions refused by validation or storage
    pub refused: usize,
    /// Successful assignments
    pub assignments: usize,
}
