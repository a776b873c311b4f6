//! Benchmark set too different.
//!
//! Comparing one slice against everything only makes sense when the slice
//! is otherwise like the rest. When it also differs on the other metrics,
//! those differences may explain the gap on the queried metric.

use super::comparison::{pair_slices, SlicePair};
use super::runner::{DetectionInput, OversightDetector};
use super::similarity::relation;
use super::{OversightKind, RowConfidence, Suggestion};
use crate::aspects::{columns_with, group_by, project_columns, SummaryOperator};
use crate::config::OversightConfig;
use crate::error::Result;
use crate::table::{Table, Value};

/// Checks every other metric of a slice-vs-all comparison.
///
/// `union` holds the rows of `slice1` followed by every row relabelled as the
/// benchmark slice, with `column` carrying the label.
/// Dimension tuples where only one side has rows are never flagged.
#[allow(clippy::too_many_arguments)]
pub fn benchmark_set_too_different(
    union: &Table,
    dimensions: &[String],
    column: &str,
    slice1: &Value,
    metric: &str,
    all_metrics: &[String],
    operator: SummaryOperator,
    config: &OversightConfig,
) -> Result<Vec<Suggestion>> {
    let others: Vec<&String> = all_metrics.iter().filter(|m| *m != metric).collect();
    if others.is_empty() {
        return Ok(Vec::new());
    }
    let grouping = columns_with(dimensions, &[column]);
    let mut keep = columns_with(&grouping, &[metric]);
    for other in &others {
        if !keep.contains(other) {
            keep.push(other.to_string());
        }
    }
    let projected = project_columns(union, &keep)?;
    let grouped = group_by(&projected, &grouping, Some(operator), config)?.table;

    let threshold = config.benchmark_dissimilarity_threshold;
    let on_metric = pair_slices(&grouped, dimensions, column, metric, slice1)?;

    let mut suggestions = Vec::new();
    for other in others {
        let on_other = pair_slices(&grouped, dimensions, column, other, slice1)?;
        let rows: Vec<RowConfidence> = on_metric
            .iter()
            .zip(&on_other)
            .filter(|(m, o)| m.is_complete() && o.is_complete())
            .filter(|(m, o)| {
                let differs = |p: &SlicePair| {
                    relation(p.first.unwrap_or(0.0), p.second.unwrap_or(0.0)) >= threshold
                };
                differs(m) && differs(o)
            })
            .flat_map(|(m, _)| m.result_rows())
            .map(|row| RowConfidence {
                row,
                confidence_score: 100.0,
            })
            .collect();

        if !rows.is_empty() {
            suggestions.push(
                Suggestion::new(
                    OversightKind::BenchmarkSetTooDifferent,
                    format!(
                        "{slice1} looks different from others on {metric}. You might also want to look at {other} since {slice1} also looks different on this."
                    ),
                )
                .with_rows(rows),
            );
        }
    }
    Ok(suggestions)
}

/// Runs [`benchmark_set_too_different`] over the slice-vs-all table built by the intent.
#[derive(Debug, Clone, Copy)]
pub struct BenchmarkSetTooDifferent<'a> {
    union: &'a Table,
    column: &'a str,
    slice1: &'a Value,
    all_metrics: &'a [String],
}

impl<'a> BenchmarkSetTooDifferent<'a> {
    pub fn new(union: &'a Table, column: &'a str, slice1: &'a Value, all_metrics: &'a [String]) -> Self {
        Self {
            union,
            column,
            slice1,
            all_metrics,
        }
    }
}

impl OversightDetector for BenchmarkSetTooDifferent<'_> {
    fn kind(&self) -> OversightKind {
        OversightKind::BenchmarkSetTooDifferent
    }

    fn detect(&self, input: &DetectionInput<'_>) -> Result<Vec<Suggestion>> {
        let Some(operator) = input.query.summary_operator else {
            return Ok(Vec::new());
        };
        let dimensions: Vec<String> = input
            .query
            .dimensions
            .iter()
            .filter(|d| d.as_str() != self.column)
            .cloned()
            .collect();
        benchmark_set_too_different(
            self.union,
            &dimensions,
            self.column,
            self.slice1,
            input.query.metric_name()?,
            self.all_metrics,
            operator,
            input.config,
        )
    }
}
