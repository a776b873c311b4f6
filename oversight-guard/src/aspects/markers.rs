//! Per-row markers over the input table.
//!
//! A caller that shows the source data next to a result can use these to
//! highlight the rows that fed it.

use std::collections::HashSet;

use super::{date_mask, slice_mask, SummaryOperator};
use crate::config::OversightConfig;
use crate::error::Result;
use crate::intents::topk::{topk_results, validate_k, UNBOUNDED};
use crate::intents::Query;
use crate::table::{Table, Value};

/// Whether each row survives the query's date range and slices.
pub fn slice_membership(table: &Table, query: &Query) -> Result<Vec<bool>> {
    let mut mask = slice_mask(table, &query.slices)?;
    if let Some(range) = query.date_range.as_ref() {
        let in_range = date_mask(table, range, &query.date_column, query.day_first)?;
        for (keep, inside) in mask.iter_mut().zip(in_range) {
            *keep &= inside;
        }
    }
    Ok(mask)
}

/// Whether each row survives the query and belongs to one of the top-k groups.
///
/// Without dimensions every surviving row is its own entry: rows whose metric
/// is at least the kth largest (at most the kth smallest when `ascending`)
/// are marked, ties with the kth value included.
pub fn topk_membership(
    table: &Table,
    query: &Query,
    k: i64,
    ascending: bool,
    config: &OversightConfig,
) -> Result<Vec<bool>> {
    validate_k(k)?;
    let mut mask = slice_membership(table, query)?;
    if query.dimensions.is_empty() {
        return ranked_rows(table, query, mask, k, ascending);
    }

    // raw rows are not grouped by the top-k itself, so group them here
    let grouped_query = match query.summary_operator {
        Some(_) => query.clone(),
        None => query.clone().with_summary_operator(if ascending {
            SummaryOperator::Min
        } else {
            SummaryOperator::Max
        }),
    };
    let top = topk_results(table, &grouped_query, k, ascending, config)?.table;
    let winners: HashSet<Vec<Value>> = top.key_tuples(&query.dimensions)?.into_iter().collect();

    for (keep, key) in mask.iter_mut().zip(table.key_tuples(&query.dimensions)?) {
        *keep &= winners.contains(&key);
    }
    Ok(mask)
}

/// Marks surviving rows whose metric reaches the kth value. Null metrics are never marked.
fn ranked_rows(table: &Table, query: &Query, mask: Vec<bool>, k: i64, ascending: bool) -> Result<Vec<bool>> {
    let values = table.column(query.metric_name()?)?.numbers_by_row()?;
    let mut surviving: Vec<f64> = mask
        .iter()
        .zip(&values)
        .filter_map(|(keep, value)| if *keep { *value } else { None })
        .collect();
    surviving.sort_by(|a, b| if ascending { a.total_cmp(b) } else { b.total_cmp(a) });

    let cutoff = if k == UNBOUNDED {
        surviving.last().copied()
    } else if k == 0 {
        None
    } else {
        surviving.get(k as usize - 1).or(surviving.last()).copied()
    };
    let Some(cutoff) = cutoff else {
        return Ok(vec![false; mask.len()]);
    };

    Ok(mask
        .into_iter()
        .zip(values)
        .map(|(keep, value)| {
            keep && value.is_some_and(|v| if ascending { v <= cutoff } else { v >= cutoff })
        })
        .collect())
}
