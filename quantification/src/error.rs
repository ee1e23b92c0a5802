//! Error types for quantification operations.
//!
//! Every variant is a rejected operation: it is returned before any
//! period or praise item is mutated, so the caller's state is untouched.

use crate::types::{PeriodStatus, PraiseId, UserId};

/// Error types for the quantification engine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QuantificationError {
    /// Quantifier pool too small for the requested redundancy
    #[error("Quantifier pool is short by {deficit} quantifiers")]
    InsufficientPool { deficit: usize },

    /// An item has too few eligible quantifiers after exclusions
    #[error("Not enough eligible quantifiers for praise {praise_id}")]
    AssignmentInfeasible { praise_id: PraiseId },

    /// Replaced quantifier is not part of the period
    #[error("Quantifier {quantifier_id} is not assigned to this period")]
    NotAssigned { quantifier_id: UserId },

    /// Replacement quantifier is already part of the period
    #[error("Quantifier {quantifier_id} is already assigned to this period")]
    AlreadyAssigned { quantifier_id: UserId },

    /// Score outside the allowed scale
    #[error("Score {score} is not an allowed value")]
    InvalidScore { score: u32 },

    /// Duplicate marker would reference itself transitively
    #[error("Marking {praise_id} as duplicate of {duplicate_of} creates a cycle")]
    DuplicateCycle {
        praise_id: PraiseId,
        duplicate_of: PraiseId,
    },

    /// Operation requires a different period status
    #[error("Period must be {expected}, but is {actual}")]
    InvalidPeriodStatus {
        expected: PeriodStatus,
        actual: PeriodStatus,
    },

    /// Status change that is not OPEN -> QUANTIFY -> CLOSED
    #[error("Period cannot move from {from} to {to}")]
    InvalidStatusTransition { from: PeriodStatus, to: PeriodStatus },

    /// Referenced praise is not part of the period
    #[error("Praise {praise_id} not found in period")]
    PraiseNotFound { praise_id: PraiseId },

    /// Submitter holds no quantification on the item
    #[error("Quantifier {quantifier_id} is not assigned to praise {praise_id}")]
    NotQuantifierOfPraise {
        praise_id: PraiseId,
        quantifier_id: UserId,
    },

    /// Item already carries quantifications before assignment
    #[error("Praise {praise_id} already has quantifiers assigned")]
    PraiseAlreadyAssigned { praise_id: PraiseId },

    /// Replacement would review their own praise or hold two slots on one item
    #[error("Quantifier {quantifier_id} cannot take over praise {praise_id}")]
    ReplacementIneligible {
        praise_id: PraiseId,
        quantifier_id: UserId,
    },

    /// Settings failed validation
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
}

pub type Result<T> = std::result::Result<T, QuantificationError>;
