//! Top-k when less than k present.

use super::runner::{DetectionInput, OversightDetector};
use super::{OversightKind, Suggestion};
use crate::error::Result;
use crate::table::Table;

/// Fires when a bounded top-k returned fewer than `k` rows.
pub fn topk_when_less_than_k(result: &Table, k: i64) -> Option<Suggestion> {
    let rows = result.num_rows();
    if k == -1 || rows as i64 >= k {
        return None;
    }
    Some(Suggestion::new(
        OversightKind::TopkWhenLessThanKPresent,
        format!("Instead of {k} only {rows} rows are present in the results"),
    ))
}

#[derive(Debug, Clone, Copy)]
pub struct TopkWhenLessThanK {
    k: i64,
}

impl TopkWhenLessThanK {
    pub fn new(k: i64) -> Self {
        Self { k }
    }
}

impl OversightDetector for TopkWhenLessThanK {
    fn kind(&self) -> OversightKind {
        OversightKind::TopkWhenLessThanKPresent
    }

    fn detect(&self, input: &DetectionInput<'_>) -> Result<Vec<Suggestion>> {
        Ok(topk_when_less_than_k(input.result, self.k).into_iter().collect())
    }
}
