//! Quantifier pool sizing.

use serde::{Deserialize, Serialize};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Outcome of a pool size check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct PoolSizeReport {
    /// Quantifiers available
    pub quantifier_pool_size: usize,
    /// Quantifiers needed for the redundancy factor
    pub required_pool_size: usize,
    /// How many more quantifiers are needed, 0 when sufficient
    pub deficit: usize,
}

impl PoolSizeReport {
    /// Whether the pool can satisfy the redundancy factor.
    pub fn is_sufficient(&self) -> bool {
        self.deficit == 0
    }
}

/// Check whether a quantifier pool is large enough.
///
/// `required = ceil(receivers * redundancy / max_items_per_quantifier)`.
/// A zero `max_items_per_quantifier` is treated as 1.
pub fn check_pool_size(
    receiver_count: usize,
    quantifier_count: usize,
    redundancy: usize,
    max_items_per_quantifier: usize,
) -> PoolSizeReport {
    let per_quantifier = max_items_per_quantifier.max(1);
    let slots = receiver_count.saturating_mul(redundancy);
    let required_pool_size = slots.div_ceil(per_quantifier);

    PoolSizeReport {
        quantifier_pool_size: quantifier_count,
        required_pool_size,
        deficit: required_pool_size.saturating_sub(quantifier_count),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_period_needs_one_quantifier() {
        let report = check_pool_size(3, 2, 2, 10);
        assert_eq!(report.required_pool_size, 1);
        assert_eq!(report.deficit, 0);
        assert!(report.is_sufficient());
    }

    #[test]
    fn test_rounds_up() {
        assert_eq!(check_pool_size(10, 0, 3, 10).required_pool_size, 3);
        assert_eq!(check_pool_size(11, 0, 3, 10).required_pool_size, 4);
    }

    #[test]
    fn test_no_receivers_never_short() {
        for quantifiers in [0, 1, 50] {
            let report = check_pool_size(0, quantifiers, 3, 20);
            assert_eq!(report.required_pool_size, 0);
            assert_eq!(report.deficit, 0);
        }
    }

    #[test]
    fn test_empty_pool_deficit_is_requirement() {
        let report = check_pool_size(40, 0, 3, 20);
        assert_eq!(report.required_pool_size, 6);
        assert_eq!(report.deficit, 6);
    }

    #[test]
    fn test_zero_capacity_treated_as_one() {
        let report = check_pool_size(4, 1, 2, 0);
        assert_eq!(report.required_pool_size, 8);
        assert_eq!(report.deficit, 7);
    }
}
