//! In-memory ledger for tests and embedding.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use quantification::{Period, PeriodId, PraiseId, PraiseItem, UserId};
use tokio::sync::RwLock;

use super::traits::*;

/// `DashMap`-backed ledger.
///
/// Items are kept per period in insertion order.
pub struct InMemoryLedger {
    periods: DashMap<PeriodId, Period>,
    praise: DashMap<PeriodId, Vec<PraiseItem>>,
    praise_index: DashMap<PraiseId, PeriodId>,
    pool: RwLock<Vec<UserId>>,
    write_count: AtomicU32,
}

impl InMemoryLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self {
            periods: DashMap::new(),
            praise: DashMap::new(),
            praise_index: DashMap::new(),
            pool: RwLock::new(Vec::new()),
            write_count: AtomicU32::new(0),
        }
    }

    /// Seed a period together with its praise.
    pub fn with_period(self, period: Period, items: Vec<PraiseItem>) -> Self {
        for item in &items {
            self.praise_index.insert(item.id.clone(), period.id.clone());
        }
        self.praise.insert(period.id.clone(), items);
        self.periods.insert(period.id.clone(), period);
        self
    }

    /// Seed the quantifier pool.
    pub fn with_quantifier_pool(mut self, pool: impl IntoIterator<Item = UserId>) -> Self {
        self.pool = RwLock::new(pool.into_iter().collect());
        self
    }

    /// Replace the quantifier pool.
    pub async fn set_quantifier_pool(&self, pool: Vec<UserId>) {
        *self.pool.write().await = pool;
    }

    /// Number of save calls so far.
    pub fn write_count(&self) -> u32 {
        self.write_count.load(Ordering::SeqCst)
    }

    fn upsert_items(&self, period_id: &PeriodId, items: &[PraiseItem]) {
        let mut stored = self.praise.entry(period_id.clone()).or_default();
        for item in items {
            match stored.iter_mut().find(|existing| existing.id == item.id) {
                Some(existing) => *existing = item.clone(),
                None => {
                    self.praise_index.insert(item.id.clone(), period_id.clone());
                    stored.push(item.clone());
                }
            }
        }
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PraiseLedger for InMemoryLedger {
    async fn get_period(&self, period_id: &PeriodId) -> Result<Option<Period>, LedgerError> {
        Ok(self.periods.get(period_id).map(|p| p.value().clone()))
    }

    async fn get_praise_items_for_period(
        &self,
        period_id: &PeriodId,
    ) -> Result<Vec<PraiseItem>, LedgerError> {
        Ok(self
            .praise
            .get(period_id)
            .map(|items| items.value().clone())
            .unwrap_or_default())
    }

    async fn get_receiver_count(&self, period_id: &PeriodId) -> Result<usize, LedgerError> {
        let mut receivers: BTreeSet<UserId> = self
            .periods
            .get(period_id)
            .map(|period| period.receivers.iter().cloned().collect())
            .unwrap_or_default();
        if let Some(items) = self.praise.get(period_id) {
            receivers.extend(items.iter().map(|item| item.receiver.clone()));
        }
        Ok(receivers.len())
    }

    async fn get_quantifier_pool(&self) -> Result<Vec<UserId>, LedgerError> {
        Ok(self.pool.read().await.clone())
    }

    async fn get_period_id_for_praise(
        &self,
        praise_id: &PraiseId,
    ) -> Result<Option<PeriodId>, LedgerError> {
        Ok(self.praise_index.get(praise_id).map(|p| p.value().clone()))
    }

    async fn save_period(&self, period: &Period) -> Result<(), LedgerError> {
        self.write_count.fetch_add(1, Ordering::SeqCst);
        self.periods.insert(period.id.clone(), period.clone());
        Ok(())
    }

    async fn save_praise_items(
        &self,
        period_id: &PeriodId,
        items: &[PraiseItem],
    ) -> Result<(), LedgerError> {
        if !self.periods.contains_key(period_id) {
            return Err(LedgerError::NotFound(format!("period {}", period_id)));
        }
        self.write_count.fetch_add(1, Ordering::SeqCst);
        self.upsert_items(period_id, items);
        Ok(())
    }

    async fn save_period_and_items(
        &self,
        period: &Period,
        items: &[PraiseItem],
    ) -> Result<(), LedgerError> {
        self.write_count.fetch_add(1, Ordering::SeqCst);
        self.periods.insert(period.id.clone(), period.clone());
        self.upsert_items(&period.id, items);
        Ok(())
    }
}
