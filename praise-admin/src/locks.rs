//! Per-period mutual exclusion.

use std::sync::Arc;

use dashmap::DashMap;
use quantification::PeriodId;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per period.
///
/// Assignment, replacement, submissions and close all read, recompute and
/// write a period's praise; they hold the period's guard for the whole cycle.
#[derive(Default)]
pub struct PeriodLocks {
    locks: DashMap<PeriodId, Arc<Mutex<()>>>,
}

impl PeriodLocks {
    /// Create an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `period_id`.
    pub async fn lock(&self, period_id: &PeriodId) -> OwnedMutexGuard<()> {
        // Clone the Arc out so the map shard is not held across the await
        let lock = self
            .locks
            .entry(period_id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone();
        lock.lock_owned().await
    }

    /// Whether another task currently holds the period.
    pub fn is_locked(&self, period_id: &PeriodId) -> bool {
        self.locks
            .get(period_id)
            .map(|lock| lock.try_lock().is_err())
            .unwrap_or(false)
    }

    /// Number of periods with a lock entry.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Whether no period has been locked yet.
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
