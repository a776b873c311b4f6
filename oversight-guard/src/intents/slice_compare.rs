//! The slice-compare intent.
//!
//! Puts two values of one column side by side for every dimension tuple.
//! With the [`WILDCARD`] as the second slice, the first is compared against
//! every row at once, relabelled as [`ALL_SLICE_LABEL`].

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{Intent, Query, QueryResponse};
use crate::aspects::{
    columns_with, group_by, prepare, project_columns, slice_table, update_metric_column_name, Predicate,
    SummaryOperator,
};
use crate::config::OversightConfig;
use crate::error::Result;
use crate::oversights::{
    BenchmarkSetTooDifferent, CalendarVsExperience, ComparedSlices, DetectionInput, OversightRunner,
    SimpsonsParadox, TopDownError, WrongPoints,
};
use crate::table::{Column, Table, Value};

/// Second slice meaning "every row".
pub const WILDCARD: &str = "*";
/// Label of the synthetic slice holding every row.
pub const ALL_SLICE_LABEL: &str = "ALL";

/// What to compare, and the columns the detectors may split the comparison by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliceComparison {
    pub column: String,
    pub slice1: Value,
    pub slice2: Value,
    /// Every dimension column of the table.
    #[serde(default)]
    pub all_dimensions: Vec<String>,
    /// Every metric column of the table.
    #[serde(default)]
    pub all_metrics: Vec<String>,
}

impl SliceComparison {
    pub fn new(column: impl Into<String>, slice1: impl Into<Value>, slice2: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            slice1: slice1.into(),
            slice2: slice2.into(),
            all_dimensions: Vec::new(),
            all_metrics: Vec::new(),
        }
    }

    /// Compares `slice1` against every row.
    pub fn against_all(column: impl Into<String>, slice1: impl Into<Value>) -> Self {
        Self::new(column, slice1, WILDCARD)
    }

    pub fn with_all_dimensions<S: Into<String>>(mut self, dimensions: impl IntoIterator<Item = S>) -> Self {
        self.all_dimensions = dimensions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_all_metrics<S: Into<String>>(mut self, metrics: impl IntoIterator<Item = S>) -> Self {
        self.all_metrics = metrics.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_against_all(&self) -> bool {
        self.slice2.as_str() == Some(WILDCARD)
    }

    /// The query's dimensions without the compared column.
    fn dimensions(&self, query: &Query) -> Vec<String> {
        query
            .dimensions
            .iter()
            .filter(|d| **d != self.column)
            .cloned()
            .collect()
    }
}

/// Runs the slice-compare intent with its detectors.
#[instrument(skip(table, query, comparison, config), fields(rows = table.num_rows(), column = %comparison.column))]
pub fn slice_compare(
    table: &Table,
    query: &Query,
    comparison: &SliceComparison,
    config: &OversightConfig,
) -> Result<QueryResponse> {
    if comparison.is_against_all() {
        return compare_against_all(table, query, comparison, config);
    }
    let metric = query.metric_name()?;
    let dimensions = comparison.dimensions(query);
    let grouping = columns_with(&dimensions, &[comparison.column.as_str()]);

    let prepared = prepare(table, query)?;
    let in_slices = slice_table(
        &prepared,
        &[Predicate::is_in(
            comparison.column.as_str(),
            [comparison.slice1.clone(), comparison.slice2.clone()],
        )],
    )?;
    let mut frame_columns = columns_with(&grouping, &[metric]);
    for dimension in &comparison.all_dimensions {
        if !frame_columns.contains(dimension) {
            frame_columns.push(dimension.clone());
        }
    }
    let frame = project_columns(&in_slices, &frame_columns)?;
    let grouped = group_by(
        &project_columns(&frame, &columns_with(&grouping, &[metric]))?,
        &grouping,
        query.summary_operator,
        config,
    )?;
    debug!(groups = grouped.table.num_rows(), "Compared slices");

    let slices = ComparedSlices::new(
        comparison.column.as_str(),
        comparison.slice1.clone(),
        comparison.slice2.clone(),
    )
    .with_candidates(&comparison.all_dimensions);
    let input = DetectionInput::new(table, &grouped.table, query, config);
    let report = OversightRunner::new()
        .add(SimpsonsParadox::new(&frame, &slices))
        .add(TopDownError::new(&frame, &slices))
        .add(CalendarVsExperience::new(
            &comparison.column,
            &comparison.slice1,
            &comparison.slice2,
        ))
        .add(WrongPoints)
        .run(&input)?;

    let renamed = update_metric_column_name(&grouped.table, query.summary_operator, metric)?;
    Ok(QueryResponse::ranked(Intent::SliceCompare, renamed, grouped.suggestions, report))
}

fn compare_against_all(
    table: &Table,
    query: &Query,
    comparison: &SliceComparison,
    config: &OversightConfig,
) -> Result<QueryResponse> {
    let metric = query.metric_name()?;
    let column = comparison.column.as_str();
    let dimensions = comparison.dimensions(query);
    let grouping = columns_with(&dimensions, &[column]);

    let prepared = prepare(table, query)?;
    let mut keep = columns_with(&grouping, &[metric]);
    for other in &comparison.all_metrics {
        if !keep.contains(other) {
            keep.push(other.clone());
        }
    }
    let projected = project_columns(&prepared, &keep)?;
    let union = slice_against_all(&projected, column, &comparison.slice1)?;

    let grouped = group_by(
        &project_columns(&union, &columns_with(&grouping, &[metric]))?,
        &grouping,
        query.summary_operator,
        config,
    )?;
    debug!(groups = grouped.table.num_rows(), "Compared slice against all rows");

    let benchmarked = matches!(
        query.summary_operator,
        Some(SummaryOperator::Mean | SummaryOperator::Median)
    );
    let input = DetectionInput::new(table, &grouped.table, query, config);
    let report = OversightRunner::new()
        .add_if(
            benchmarked,
            BenchmarkSetTooDifferent::new(&union, column, &comparison.slice1, &comparison.all_metrics),
        )
        .add(WrongPoints)
        .run(&input)?;

    let renamed = update_metric_column_name(&grouped.table, query.summary_operator, metric)?;
    Ok(QueryResponse::ranked(Intent::SliceCompare, renamed, grouped.suggestions, report))
}

/// Every row relabelled as [`ALL_SLICE_LABEL`], followed by the rows of `slice1`.
fn slice_against_all(table: &Table, column: &str, slice1: &Value) -> Result<Table> {
    let everything = table.with_column(Column::text(
        column,
        std::iter::repeat(ALL_SLICE_LABEL).take(table.num_rows()),
    ))?;
    let ones = slice_table(table, &[Predicate::equal_to(column, slice1.clone())])?;
    Table::concat(&[everything, ones])
}
