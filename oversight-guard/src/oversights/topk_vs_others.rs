//! Top-k vs others.
//!
//! Ranking the top k says little when the rows left out together outweigh
//! them, or when they pull the total in the opposite direction.

use super::runner::{DetectionInput, OversightDetector};
use super::{OversightKind, Suggestion};
use crate::error::Result;
use crate::table::Table;

/// Compares the metric sum of the first `k` rows of the ranking with the rest.
///
/// The ratio `sum(top-k) / sum(rest)` is the confidence. Nothing is reported
/// when the rest sums to zero.
pub fn topk_vs_others(
    ranking: &Table,
    k: i64,
    metric: &str,
    threshold: f64,
) -> Result<Option<Suggestion>> {
    let rows = ranking.num_rows();
    if k <= 0 || k as usize >= rows {
        return Ok(None);
    }
    let values = ranking.column(metric)?.numbers_by_row()?;
    let (top, rest) = values.split_at(k as usize);
    let sum_top: f64 = top.iter().flatten().sum();
    let sum_rest: f64 = rest.iter().flatten().sum();
    if sum_rest == 0.0 {
        return Ok(None);
    }
    let ratio = sum_top / sum_rest;

    let message = if sum_top > 0.0 && sum_rest < 0.0 {
        format!(
            "The sum of {metric} in top-k rows is positive whereas sum of rows not in top-k is negative"
        )
    } else if sum_top < 0.0 && sum_rest > 0.0 {
        format!(
            "The sum of {metric} in top-k rows is negative whereas sum of rows not in top-k is positive"
        )
    } else if ratio > 0.0 && ratio < threshold {
        format!("The rows NOT in the top-k have a much larger sum over {metric} than the rows in top-k")
    } else {
        return Ok(None);
    };

    Ok(Some(
        Suggestion::new(OversightKind::TopkVsOthers, message)
            .with_change("topKLimit", rows as f64)
            .with_confidence(ratio),
    ))
}

#[derive(Debug, Clone, Copy)]
pub struct TopkVsOthers {
    k: i64,
}

impl TopkVsOthers {
    pub fn new(k: i64) -> Self {
        Self { k }
    }
}

impl OversightDetector for TopkVsOthers {
    fn kind(&self) -> OversightKind {
        OversightKind::TopkVsOthers
    }

    fn detect(&self, input: &DetectionInput<'_>) -> Result<Vec<Suggestion>> {
        let ranking = input.full_result.unwrap_or(input.result);
        let metric = input.query.metric_name()?;
        Ok(
            topk_vs_others(ranking, self.k, metric, input.config.topk_vs_others_threshold)?
                .into_iter()
                .collect(),
        )
    }
}
