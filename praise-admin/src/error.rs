//! Error types for the administrative layer.

use quantification::{PeriodId, PraiseId, QuantificationError};

use crate::ledger::LedgerError;

/// Errors surfaced by [`QuantificationService`](crate::QuantificationService).
#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    /// Period does not exist in the ledger
    #[error("Period not found: {0}")]
    PeriodNotFound(PeriodId),

    /// Praise item does not belong to any known period
    #[error("Praise not found: {0}")]
    PraiseNotFound(PraiseId),

    /// Bulk submission spans more than one period
    #[error("Praise items belong to different periods: {first} and {second}")]
    MixedPeriods { first: PeriodId, second: PeriodId },

    /// Engine refused the operation
    #[error(transparent)]
    Quantification(#[from] QuantificationError),

    /// Storage failure
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

/// Result alias for administrative operations.
pub type Result<T> = std::result::Result<T, AdminError>;
