//! More than just top-k.
//!
//! When the rows right after the kth are practically tied with it, the cut
//! at k is arbitrary and the user is better served by a larger k.

use super::runner::{DetectionInput, OversightDetector};
use super::similarity::relation;
use super::{OversightKind, Suggestion};
use crate::error::Result;
use crate::table::Table;

/// Checks the full ordered ranking for rows tied with the kth one.
///
/// The suggestion proposes `k + extra` and its confidence is one minus the
/// largest relation among the extra rows.
pub fn more_than_just_topk(
    ranking: &Table,
    k: i64,
    metric: &str,
    threshold: f64,
) -> Result<Option<Suggestion>> {
    let rows = ranking.num_rows();
    if k <= 0 || k as usize >= rows {
        return Ok(None);
    }
    let k = k as usize;
    let values = &ranking.column(metric)?.values;
    let Some(kth) = values[k - 1].as_f64() else {
        return Ok(None);
    };

    let mut extra = 0;
    let mut max_relation: f64 = 0.0;
    for value in &values[k..] {
        let Some(x) = value.as_f64() else { break };
        let r = relation(kth, x);
        if r >= threshold {
            break;
        }
        extra += 1;
        max_relation = max_relation.max(r);
    }
    if extra == 0 {
        return Ok(None);
    }

    Ok(Some(
        Suggestion::new(
            OversightKind::MoreThanJustTopk,
            format!("value of {metric} in some rows after the top-k is similar to the Kth row"),
        )
        .with_change("k", (k + extra) as f64)
        .with_confidence(1.0 - max_relation),
    ))
}

#[derive(Debug, Clone, Copy)]
pub struct MoreThanJustTopk {
    k: i64,
}

impl MoreThanJustTopk {
    pub fn new(k: i64) -> Self {
        Self { k }
    }
}

impl OversightDetector for MoreThanJustTopk {
    fn kind(&self) -> OversightKind {
        OversightKind::MoreThanJustTopk
    }

    fn detect(&self, input: &DetectionInput<'_>) -> Result<Vec<Suggestion>> {
        let ranking = input.full_result.unwrap_or(input.result);
        let metric = input.query.metric_name()?;
        Ok(more_than_just_topk(
            ranking,
            self.k,
            metric,
            input.config.more_than_just_topk_threshold,
        )?
        .into_iter()
        .collect())
    }
}
