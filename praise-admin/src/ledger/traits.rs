//! Core traits for praise storage.
//!
//! This module defines the `PraiseLedger` trait, the abstraction over the
//! document store holding periods, praise and the quantifier pool.

use async_trait::async_trait;
use quantification::{Period, PeriodId, PraiseId, PraiseItem, UserId};
use tracing::warn;

/// Error types for ledger operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LedgerError {
    /// Record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Underlying store failed
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Storage backing the administrative layer.
///
/// Writes that touch both a period and its praise go through
/// `save_period_and_items`; stores with transactions should override it to
/// commit both in one transaction.
#[async_trait]
pub trait PraiseLedger: Send + Sync {
    /// Fetch a period, `None` if it does not exist.
    async fn get_period(&self, period_id: &PeriodId) -> Result<Option<Period>, LedgerError>;

    /// All praise received during a period, in creation order.
    async fn get_praise_items_for_period(
        &self,
        period_id: &PeriodId,
    ) -> Result<Vec<PraiseItem>, LedgerError>;

    /// Number of distinct receivers named by the period or its praise.
    async fn get_receiver_count(&self, period_id: &PeriodId) -> Result<usize, LedgerError>;

    /// Users eligible to quantify.
    async fn get_quantifier_pool(&self) -> Result<Vec<UserId>, LedgerError>;

    /// Period a praise item belongs to.
    async fn get_period_id_for_praise(
        &self,
        praise_id: &PraiseId,
    ) -> Result<Option<PeriodId>, LedgerError>;

    /// Insert or overwrite a period.
    async fn save_period(&self, period: &Period) -> Result<(), LedgerError>;

    /// Insert or overwrite praise items of one period.
    async fn save_praise_items(
        &self,
        period_id: &PeriodId,
        items: &[PraiseItem],
    ) -> Result<(), LedgerError>;

    /// Write a period and its changed items as one unit.
    ///
    /// Runs the two saves in turn and puts the previous period and items
    /// back when the item write fails.
    async fn save_period_and_items(
        &self,
        period: &Period,
        items: &[PraiseItem],
    ) -> Result<(), LedgerError> {
        let (previous, stored) = futures::try_join!(
            self.get_period(&period.id),
            self.get_praise_items_for_period(&period.id),
        )?;

        self.save_period(period).await?;
        let Err(err) = self.save_praise_items(&period.id, items).await else {
            return Ok(());
        };

        if let Some(previous) = previous {
            if let Err(restore) = self.save_period(&previous).await {
                warn!(period_id = %period.id, error = %restore, "Failed to restore period");
            }
        }
        let touched: Vec<PraiseItem> = stored
            .into_iter()
            .filter(|old| items.iter().any(|new| new.id == old.id))
            .collect();
        if let Err(restore) = self.save_praise_items(&period.id, &touched).await {
            warn!(period_id = %period.id, error = %restore, "Failed to restore praise items");
        }
        Err(err)
    }
}
