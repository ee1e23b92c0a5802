//! QuantificationService - entry point for the administrative endpoints.
//!
//! Each operation loads a snapshot from the ledger, runs the engine and
//! writes the result back while holding the period lock. The engine refuses
//! before producing anything, so a refused operation never writes.

use std::collections::BTreeSet;
use std::sync::Arc;

use futures::future::try_join_all;
use quantification::{
    self as engine, AssignmentEngine, Period, PeriodId, PoolSizeReport, PraiseId, PraiseItem,
    QuantificationInput, QuantifierProgress, ReceiverTotal, UserId,
};
use tracing::{debug, info, warn};

use crate::audit::{AuditAction, AuditEntry, AuditLog, AuditOutcome};
use crate::config::AdminConfig;
use crate::dto::{
    AssignQuantifiersResponse, QuantifyMultipleRequest, ReplaceQuantifierRequest,
    ReplaceQuantifierResponse,
};
use crate::error::{AdminError, Result};
use crate::ledger::PraiseLedger;
use crate::locks::PeriodLocks;

/// Administrative front of the quantification engine.
pub struct QuantificationService {
    /// Configuration
    config: AdminConfig,
    /// Storage
    ledger: Arc<dyn PraiseLedger>,
    /// Per-period exclusion
    locks: PeriodLocks,
    /// Audit log
    audit: Arc<AuditLog>,
}

impl QuantificationService {
    /// Create a service over `ledger` with default configuration.
    pub fn new(ledger: Arc<dyn PraiseLedger>) -> Self {
        let config = AdminConfig::default();
        Self {
            audit: Arc::new(AuditLog::with_max_entries(config.audit.max_entries)),
            config,
            ledger,
            locks: PeriodLocks::new(),
        }
    }

    /// Create with configuration, rejecting invalid engine settings.
    pub fn with_config(mut self, config: AdminConfig) -> Result<Self> {
        config.quantification.validate()?;
        self.audit = Arc::new(AuditLog::with_max_entries(config.audit.max_entries));
        self.config = config;
        Ok(self)
    }

    /// Get the service ID.
    pub fn service_id(&self) -> &str {
        &self.config.service_id
    }

    /// Get the configuration.
    pub fn config(&self) -> &AdminConfig {
        &self.config
    }

    /// Get the audit log.
    pub fn audit(&self) -> Arc<AuditLog> {
        self.audit.clone()
    }

    /// `POST /periods/{id}/verifyQuantifierPoolSize`
    ///
    /// Receivers are counted exactly as assignment counts them.
    pub async fn verify_quantifier_pool_size(
        &self,
        period_id: &PeriodId,
        actor: &UserId,
    ) -> Result<PoolSizeReport> {
        let result = self.verify_pool(period_id).await;
        self.record(AuditAction::VerifyPoolSize, period_id, actor, &result, None)
            .await;
        result
    }

    /// `PATCH /periods/{id}/assignQuantifiers`
    pub async fn assign_quantifiers(
        &self,
        period_id: &PeriodId,
        actor: &UserId,
    ) -> Result<AssignQuantifiersResponse> {
        let _guard = self.locks.lock(period_id).await;
        let result = self.assign_locked(period_id).await;

        let digest = result.as_ref().ok().map(|r| r.digest.clone());
        self.record(AuditAction::AssignQuantifiers, period_id, actor, &result, digest)
            .await;
        result
    }

    /// `PATCH /periods/{id}/replaceQuantifier`
    pub async fn replace_quantifier(
        &self,
        period_id: &PeriodId,
        request: &ReplaceQuantifierRequest,
        actor: &UserId,
    ) -> Result<ReplaceQuantifierResponse> {
        let _guard = self.locks.lock(period_id).await;
        let result = self.replace_locked(period_id, request).await;

        self.record(AuditAction::ReplaceQuantifier, period_id, actor, &result, None)
            .await;
        result
    }

    /// `PATCH /praise/{id}/quantify`
    ///
    /// Returns the item plus any duplicates whose score followed it.
    pub async fn quantify(
        &self,
        praise_id: &PraiseId,
        quantifier: &UserId,
        input: &QuantificationInput,
    ) -> Result<Vec<PraiseItem>> {
        let period_id = self.period_of(praise_id).await?;
        self.submit(&period_id, std::slice::from_ref(praise_id), quantifier, input)
            .await
    }

    /// `PATCH /praise/quantify`
    ///
    /// All listed items must belong to the same period.
    pub async fn quantify_multiple(
        &self,
        quantifier: &UserId,
        request: &QuantifyMultipleRequest,
    ) -> Result<Vec<PraiseItem>> {
        let periods = try_join_all(request.praise_ids.iter().map(|id| self.period_of(id))).await?;
        let Some(first) = periods.first() else {
            return Ok(Vec::new());
        };
        if let Some(other) = periods.iter().find(|p| *p != first) {
            return Err(AdminError::MixedPeriods {
                first: first.clone(),
                second: other.clone(),
            });
        }

        self.submit(first, &request.praise_ids, quantifier, &request.input)
            .await
    }

    /// `PATCH /periods/{id}/close`
    pub async fn close_period(&self, period_id: &PeriodId, actor: &UserId) -> Result<Period> {
        let _guard = self.locks.lock(period_id).await;
        let result = self.close_locked(period_id).await;

        self.record(AuditAction::ClosePeriod, period_id, actor, &result, None)
            .await;
        result
    }

    /// `GET /periods/{id}/quantifiers`
    pub async fn quantifier_progress(&self, period_id: &PeriodId) -> Result<Vec<QuantifierProgress>> {
        let (period, items) = self.load(period_id).await?;
        Ok(engine::quantifier_progress(&period, &items))
    }

    /// `GET /periods/{id}/receivers`
    pub async fn receiver_totals(&self, period_id: &PeriodId) -> Result<Vec<ReceiverTotal>> {
        let (_, items) = self.load(period_id).await?;
        Ok(engine::receiver_totals(&items))
    }

    async fn submit(
        &self,
        period_id: &PeriodId,
        praise_ids: &[PraiseId],
        quantifier: &UserId,
        input: &QuantificationInput,
    ) -> Result<Vec<PraiseItem>> {
        let _guard = self.locks.lock(period_id).await;
        let result = self.submit_locked(period_id, praise_ids, quantifier, input).await;

        self.record(AuditAction::Quantify, period_id, quantifier, &result, None)
            .await;
        result
    }

    async fn verify_pool(&self, period_id: &PeriodId) -> Result<PoolSizeReport> {
        let ((period, items), pool) = futures::try_join!(self.load(period_id), self.pool())?;

        let pool_size = pool.iter().collect::<BTreeSet<_>>().len();
        let report = AssignmentEngine::from_settings(&self.config.quantification)
            .check_pool(&period, &items, pool_size);

        debug!(
            period_id = %period_id,
            pool_size,
            required = report.required_pool_size,
            deficit = report.deficit,
            "Verified quantifier pool"
        );
        Ok(report)
    }

    async fn assign_locked(&self, period_id: &PeriodId) -> Result<AssignQuantifiersResponse> {
        let ((period, items), pool) = futures::try_join!(self.load(period_id), self.pool())?;

        let outcome = AssignmentEngine::from_settings(&self.config.quantification)
            .assign(&period, &items, &pool)?;
        self.store(&outcome.period, &outcome.praise_items).await?;

        Ok(AssignQuantifiersResponse {
            period: outcome.period,
            praise_items: outcome.praise_items,
            digest: outcome.digest,
        })
    }

    async fn replace_locked(
        &self,
        period_id: &PeriodId,
        request: &ReplaceQuantifierRequest,
    ) -> Result<ReplaceQuantifierResponse> {
        let (period, items) = self.load(period_id).await?;
        let outcome = engine::replace_quantifier(
            &period,
            &request.current_quantifier_id,
            &request.new_quantifier_id,
            &items,
            &self.config.quantification,
        )?;
        self.store(&outcome.period, &outcome.praise_items).await?;

        info!(
            period_id = %period_id,
            current = %request.current_quantifier_id,
            replacement = %request.new_quantifier_id,
            transferred = outcome.transferred,
            retained = outcome.retained,
            "Quantifier replaced"
        );
        Ok(ReplaceQuantifierResponse {
            period: outcome.period,
            praise_items: outcome.praise_items,
        })
    }

    async fn submit_locked(
        &self,
        period_id: &PeriodId,
        praise_ids: &[PraiseId],
        quantifier: &UserId,
        input: &QuantificationInput,
    ) -> Result<Vec<PraiseItem>> {
        let (period, items) = self.load(period_id).await?;
        let changed = engine::apply_quantifications(
            &period,
            &items,
            praise_ids,
            quantifier,
            input,
            &self.config.quantification,
        )?;
        self.ledger.save_praise_items(period_id, &changed).await?;

        debug!(
            period_id = %period_id,
            quantifier = %quantifier,
            submitted = praise_ids.len(),
            changed = changed.len(),
            "Quantification stored"
        );
        Ok(changed)
    }

    async fn close_locked(&self, period_id: &PeriodId) -> Result<Period> {
        let (period, items) = self.load(period_id).await?;
        let closed = engine::close_period(&period, &items)?;
        self.ledger.save_period(&closed).await?;
        Ok(closed)
    }

    async fn load(&self, period_id: &PeriodId) -> Result<(Period, Vec<PraiseItem>)> {
        let (period, items) = futures::try_join!(
            self.ledger.get_period(period_id),
            self.ledger.get_praise_items_for_period(period_id),
        )?;
        let period = period.ok_or_else(|| AdminError::PeriodNotFound(period_id.clone()))?;
        Ok((period, items))
    }

    async fn pool(&self) -> Result<Vec<UserId>> {
        Ok(self.ledger.get_quantifier_pool().await?)
    }

    async fn store(&self, period: &Period, items: &[PraiseItem]) -> Result<()> {
        Ok(self.ledger.save_period_and_items(period, items).await?)
    }

    async fn period_of(&self, praise_id: &PraiseId) -> Result<PeriodId> {
        self.ledger
            .get_period_id_for_praise(praise_id)
            .await?
            .ok_or_else(|| AdminError::PraiseNotFound(praise_id.clone()))
    }

    async fn record<T>(
        &self,
        action: AuditAction,
        period_id: &PeriodId,
        actor: &UserId,
        result: &Result<T>,
        digest: Option<String>,
    ) {
        if let Err(err) = result {
            warn!(period_id = %period_id, actor = %actor, %action, error = %err, "Action refused");
        }
        if !self.config.audit.enabled {
            return;
        }

        let mut entry = AuditEntry::new(
            action,
            period_id.clone(),
            actor.clone(),
            AuditOutcome::from_result(result),
        );
        if let Some(digest) = digest {
            entry = entry.with_digest(digest);
        }
        self.audit.record(entry).await;
    }
}
