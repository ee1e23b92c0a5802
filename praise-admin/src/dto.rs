//! Request and response bodies for the administrative endpoints.

use quantification::{Period, PraiseId, PraiseItem, QuantificationInput, UserId};
use serde::{Deserialize, Serialize};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Body of `PATCH /periods/{id}/assignQuantifiers`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct AssignQuantifiersResponse {
    /// Period, now in QUANTIFY
    pub period: Period,
    /// Every item with its placeholder quantifications
    pub praise_items: Vec<PraiseItem>,
    /// SHA-256 over the assigned (praise, quantifier) pairs
    pub digest: String,
}

/// Body of `PATCH /periods/{id}/replaceQuantifier`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct ReplaceQuantifierRequest {
    pub current_quantifier_id: UserId,
    pub new_quantifier_id: UserId,
}

/// Response of `PATCH /periods/{id}/replaceQuantifier`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct ReplaceQuantifierResponse {
    /// Period with the updated quantifier list
    pub period: Period,
    /// Only the items that changed
    pub praise_items: Vec<PraiseItem>,
}

/// Body of `PATCH /praise/quantify`: one submission applied to several items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct QuantifyMultipleRequest {
    pub praise_ids: Vec<PraiseId>,
    #[serde(flatten)]
    pub input: QuantificationInput,
}
