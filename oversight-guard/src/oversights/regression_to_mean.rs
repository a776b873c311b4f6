//! Regression to the mean.
//!
//! Entities that are extreme over one window tend to be closer to average
//! over the next. When the top-k over the queried window shares few members
//! with the top-k over the window right before it, or ranks them very
//! differently, the current ranking is likely luck as much as merit.

use std::collections::{BTreeMap, HashSet};

use super::duplicates_in_topk::duplicates_in_topk;
use super::runner::{DetectionInput, OversightDetector};
use super::similarity::angle_degrees;
use super::{OversightKind, Suggestion};
use crate::aspects::SummaryOperator;
use crate::config::OversightConfig;
use crate::error::Result;
use crate::intents::topk::topk_results;
use crate::intents::Query;
use crate::table::{Table, Value};

/// Compares the top-k `current` result with the top-k over the previous window.
///
/// `table` is the table the query ran on. Only applies to queries with a date
/// range and dimensions whose result has no duplicate rows.
pub fn regression_to_mean(
    table: &Table,
    current: &Table,
    query: &Query,
    k: i64,
    ascending: bool,
    config: &OversightConfig,
) -> Result<Option<Suggestion>> {
    let Some(range) = query.date_range.as_ref() else {
        return Ok(None);
    };
    if query.dimensions.is_empty() || current.is_empty() {
        return Ok(None);
    }
    if duplicates_in_topk(current, &query.dimensions)?.is_some() {
        return Ok(None);
    }

    // the previous window may repeat a dimension value, so it is always grouped
    let operator = query.summary_operator.unwrap_or(if ascending {
        SummaryOperator::Min
    } else {
        SummaryOperator::Max
    });
    let previous_query = query
        .clone()
        .with_date_range(range.previous_window(query.day_first)?)
        .with_summary_operator(operator);
    let previous = topk_results(table, &previous_query, k, ascending, config)?.table;

    let current_ranks = rank_vector(current, &query.dimensions)?;
    let previous_ranks = rank_vector(&previous, &query.dimensions)?;

    let current_set: HashSet<&Vec<Value>> = current_ranks.keys().collect();
    let previous_set: HashSet<&Vec<Value>> = previous_ranks.keys().collect();
    let common = current_set.intersection(&previous_set).count();
    let union = current_set.union(&previous_set).count();
    let score = if union == 0 { 0.0 } else { common as f64 / union as f64 };

    let message = if score == 0.0 {
        "None of the top-k in the given date range will be in the previous window's top-k"
    } else if score <= config.rtm_set_intersection_cutoff {
        "very few of the top-k in the given date range will be in the previous window's top-k"
    } else {
        let (a, b): (Vec<f64>, Vec<f64>) = current_ranks
            .iter()
            .filter_map(|(key, rank)| previous_ranks.get(key).map(|other| (*rank, *other)))
            .unzip();
        if angle_degrees(&a, &b) < config.rtm_rank_angle_degrees {
            return Ok(None);
        }
        "The ranks of the top-k in the date range differs much from the previous window's top-k"
    };
    Ok(Some(Suggestion::new(OversightKind::RegressionToTheMean, message)))
}

/// `ln(2 + rank)` per dimension tuple, rank being the 0-based row.
fn rank_vector(result: &Table, dimensions: &[String]) -> Result<BTreeMap<Vec<Value>, f64>> {
    Ok(result
        .key_tuples(dimensions)?
        .into_iter()
        .enumerate()
        .map(|(rank, key)| (key, (2.0 + rank as f64).ln()))
        .collect())
}

#[derive(Debug, Clone, Copy)]
pub struct RegressionToMean {
    k: i64,
    ascending: bool,
}

impl RegressionToMean {
    pub fn new(k: i64, ascending: bool) -> Self {
        Self { k, ascending }
    }
}

impl OversightDetector for RegressionToMean {
    fn kind(&self) -> OversightKind {
        OversightKind::RegressionToTheMean
    }

    fn detect(&self, input: &DetectionInput<'_>) -> Result<Vec<Suggestion>> {
        Ok(regression_to_mean(
            input.table,
            input.result,
            input.query,
            self.k,
            self.ascending,
            input.config,
        )?
        .into_iter()
        .collect())
    }
}
