//! Core types for praise quantification.
//!
//! These types model a scoring period, the praise items received during it
//! and the per-quantifier assessments attached to each item.
//!
//! With the `typescript` feature enabled, these types can be exported to TypeScript
//! using ts-rs for consistency with the React frontend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[cfg(feature = "typescript")]
use ts_rs::TS;

use crate::error::{QuantificationError, Result};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[cfg_attr(feature = "typescript", derive(TS))]
        #[cfg_attr(feature = "typescript", ts(export))]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Create an identifier from any string-like value.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the raw identifier.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(
    /// Identifier of a community member (giver, receiver, forwarder or quantifier).
    UserId
);
string_id!(
    /// Identifier of a praise item.
    PraiseId
);
string_id!(
    /// Identifier of a scoring period.
    PeriodId
);

/// Lifecycle status of a period.
///
/// Transitions are monotonic: OPEN -> QUANTIFY -> CLOSED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PeriodStatus {
    /// Accepting praise, no quantifiers assigned yet
    Open,
    /// Quantifiers assigned and scoring in progress
    Quantify,
    /// Scoring finished, results are final
    Closed,
}

impl PeriodStatus {
    /// Whether `next` is the single legal successor of this status.
    pub fn can_transition_to(&self, next: PeriodStatus) -> bool {
        matches!(
            (self, next),
            (Self::Open, Self::Quantify) | (Self::Quantify, Self::Closed)
        )
    }

    /// Get string representation for logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Quantify => "QUANTIFY",
            Self::Closed => "CLOSED",
        }
    }
}

impl Default for PeriodStatus {
    fn default() -> Self {
        Self::Open
    }
}

impl fmt::Display for PeriodStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One scoring cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Period {
    /// Unique identifier
    pub id: PeriodId,
    /// Current lifecycle status
    pub status: PeriodStatus,
    /// When the period stops accepting praise
    pub end_date: DateTime<Utc>,
    /// Quantifiers holding assignments in this period, in assignment order
    pub quantifiers: Vec<UserId>,
    /// Distinct receivers of praise in this period
    pub receivers: Vec<UserId>,
    /// Distinct givers of praise in this period
    pub givers: Vec<UserId>,
}

impl Period {
    /// Create an open period ending at `end_date`.
    pub fn new(id: impl Into<PeriodId>, end_date: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            status: PeriodStatus::Open,
            end_date,
            quantifiers: Vec::new(),
            receivers: Vec::new(),
            givers: Vec::new(),
        }
    }

    /// Builder: record the distinct givers and receivers of `items`.
    pub fn with_participants_from(mut self, items: &[PraiseItem]) -> Self {
        for item in items {
            if !self.receivers.contains(&item.receiver) {
                self.receivers.push(item.receiver.clone());
            }
            if !self.givers.contains(&item.giver) {
                self.givers.push(item.giver.clone());
            }
        }
        self
    }

    /// Whether `quantifier` is part of this period's pool.
    pub fn has_quantifier(&self, quantifier: &UserId) -> bool {
        self.quantifiers.contains(quantifier)
    }

    /// Fail unless the period is currently in `expected` status.
    pub fn require_status(&self, expected: PeriodStatus) -> Result<()> {
        if self.status != expected {
            return Err(QuantificationError::InvalidPeriodStatus {
                expected,
                actual: self.status,
            });
        }
        Ok(())
    }

    /// Move to `next`, refusing anything but the forward transition.
    pub fn advance_to(&mut self, next: PeriodStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(QuantificationError::InvalidStatusTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}

/// One quantifier's assessment of one praise item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Quantification {
    /// Quantifier who owns this assessment
    pub quantifier: UserId,
    /// Score from the allowed scale, 0 when not scored
    pub score: u32,
    /// "This isn't praise"
    pub dismissed: bool,
    /// Original item this one repeats
    pub duplicate_of: Option<PraiseId>,
    /// When the placeholder was created
    pub created_at: DateTime<Utc>,
    /// Last mutation
    pub updated_at: DateTime<Utc>,
}

/// Resolved state of a quantification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantificationState<'a> {
    /// Not yet reviewed
    Pending,
    /// Scored with a non-zero value
    Scored(u32),
    /// Dismissed as not being praise
    Dismissed,
    /// Marked as a repeat of another item
    Duplicate(&'a PraiseId),
}

impl Quantification {
    /// Create an empty placeholder for `quantifier`.
    pub fn placeholder(quantifier: UserId) -> Self {
        let now = Utc::now();
        Self {
            quantifier,
            score: 0,
            dismissed: false,
            duplicate_of: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Classify this quantification.
    ///
    /// Precedence follows submission normalization: dismissal, then duplicate, then score.
    pub fn state(&self) -> QuantificationState<'_> {
        if self.dismissed {
            QuantificationState::Dismissed
        } else if let Some(original) = &self.duplicate_of {
            QuantificationState::Duplicate(original)
        } else if self.score > 0 {
            QuantificationState::Scored(self.score)
        } else {
            QuantificationState::Pending
        }
    }

    /// Whether the owner has submitted anything.
    pub fn is_resolved(&self) -> bool {
        !matches!(self.state(), QuantificationState::Pending)
    }

    /// Clear any submitted state.
    pub fn reset(&mut self) {
        self.score = 0;
        self.dismissed = false;
        self.duplicate_of = None;
        self.updated_at = Utc::now();
    }
}

/// One act of recognition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct PraiseItem {
    /// Unique identifier
    pub id: PraiseId,
    /// Who gave the praise
    pub giver: UserId,
    /// Who received the praise
    pub receiver: UserId,
    /// Who forwarded it on the giver's behalf
    pub forwarder: Option<UserId>,
    /// Assessments, in assignment order
    pub quantifications: Vec<Quantification>,
    /// Cached consensus score, always recomputable from `quantifications`
    pub score_realized: f64,
    /// Creation time, used for stable assignment ordering
    pub created_at: DateTime<Utc>,
}

impl PraiseItem {
    /// Create an unquantified item with a fresh identifier.
    pub fn new(giver: impl Into<UserId>, receiver: impl Into<UserId>) -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string(), giver, receiver)
    }

    /// Create an unquantified item with a known identifier.
    pub fn with_id(
        id: impl Into<PraiseId>,
        giver: impl Into<UserId>,
        receiver: impl Into<UserId>,
    ) -> Self {
        Self {
            id: id.into(),
            giver: giver.into(),
            receiver: receiver.into(),
            forwarder: None,
            quantifications: Vec::new(),
            score_realized: 0.0,
            created_at: Utc::now(),
        }
    }

    /// Builder: set the forwarder.
    pub fn with_forwarder(mut self, forwarder: impl Into<UserId>) -> Self {
        self.forwarder = Some(forwarder.into());
        self
    }

    /// Builder: set the creation time.
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Whether `user` gave or received this praise.
    pub fn involves(&self, user: &UserId) -> bool {
        &self.giver == user || &self.receiver == user
    }

    /// The quantification owned by `quantifier`, if any.
    pub fn quantification_by(&self, quantifier: &UserId) -> Option<&Quantification> {
        self.quantifications
            .iter()
            .find(|q| &q.quantifier == quantifier)
    }

    /// Mutable access to the quantification owned by `quantifier`.
    pub fn quantification_by_mut(&mut self, quantifier: &UserId) -> Option<&mut Quantification> {
        self.quantifications
            .iter_mut()
            .find(|q| &q.quantifier == quantifier)
    }

    /// The original this item inherits its score from.
    ///
    /// The first duplicate marker in quantification order wins.
    pub fn duplicate_target(&self) -> Option<&PraiseId> {
        self.quantifications.iter().find_map(|q| match q.state() {
            QuantificationState::Duplicate(original) => Some(original),
            _ => None,
        })
    }

    /// Whether no quantifier has resolved this item yet.
    pub fn is_pending(&self) -> bool {
        self.quantifications.iter().all(|q| !q.is_resolved())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_transitions_are_forward_only() {
        assert!(PeriodStatus::Open.can_transition_to(PeriodStatus::Quantify));
        assert!(PeriodStatus::Quantify.can_transition_to(PeriodStatus::Closed));
        assert!(!PeriodStatus::Open.can_transition_to(PeriodStatus::Closed));
        assert!(!PeriodStatus::Closed.can_transition_to(PeriodStatus::Open));
        assert!(!PeriodStatus::Quantify.can_transition_to(PeriodStatus::Open));
        assert!(!PeriodStatus::Quantify.can_transition_to(PeriodStatus::Quantify));
    }

    #[test]
    fn test_advance_rejects_skipping() {
        let mut period = Period::new("p1", Utc::now());
        let err = period.advance_to(PeriodStatus::Closed).unwrap_err();
        assert!(matches!(
            err,
            QuantificationError::InvalidStatusTransition { .. }
        ));
        assert_eq!(period.status, PeriodStatus::Open);
    }

    #[test]
    fn test_quantification_state_precedence() {
        let mut q = Quantification::placeholder(UserId::from("q1"));
        assert_eq!(q.state(), QuantificationState::Pending);

        q.score = 5;
        assert_eq!(q.state(), QuantificationState::Scored(5));

        q.duplicate_of = Some(PraiseId::from("x"));
        assert!(matches!(q.state(), QuantificationState::Duplicate(_)));

        q.dismissed = true;
        assert_eq!(q.state(), QuantificationState::Dismissed);

        q.reset();
        assert!(!q.is_resolved());
    }

    #[test]
    fn test_serializes_camel_case() {
        let item = PraiseItem::with_id("a", "giver", "receiver");
        let json = serde_json::to_value(&item).unwrap();
        assert!(json.get("scoreRealized").is_some());
        assert_eq!(json["id"], "a");

        let period = Period::new("p1", Utc::now());
        let json = serde_json::to_value(&period).unwrap();
        assert_eq!(json["status"], "OPEN");
        assert!(json.get("endDate").is_some());
    }

    #[test]
    fn test_participants_are_distinct() {
        let items = vec![
            PraiseItem::new("g1", "r1"),
            PraiseItem::new("g1", "r2"),
            PraiseItem::new("g2", "r1"),
        ];
        let period = Period::new("p1", Utc::now()).with_participants_from(&items);
        assert_eq!(period.receivers.len(), 2);
        assert_eq!(period.givers.len(), 2);
    }
}
