//! Period lifecycle transitions outside of assignment.

use tracing::info;

use crate::error::Result;
use crate::types::{Period, PeriodStatus, PraiseItem};

/// Close a QUANTIFY period, freezing its scores.
///
/// Pending items stay at a realized score of 0.
pub fn close_period(period: &Period, items: &[PraiseItem]) -> Result<Period> {
    let mut closed = period.clone();
    closed.advance_to(PeriodStatus::Closed)?;

    let pending = items.iter().filter(|item| item.is_pending()).count();
    info!(
        period_id = %period.id,
        praise = items.len(),
        pending,
        "Period closed"
    );
    Ok(closed)
}
