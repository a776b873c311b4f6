//! The time-compare intent.
//!
//! Runs the same grouping over two date windows. Rows of each window have
//! their date replaced by the window's label, the two are stacked, and the
//! labels are then compared like two slices of the date column.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{Intent, Query, QueryResponse};
use crate::aspects::{apply_date_range, columns_with, group_by, prepare, project_columns, update_metric_column_name};
use crate::config::OversightConfig;
use crate::error::Result;
use crate::oversights::{ComparedSlices, DetectionInput, OversightRunner, SimpsonsParadox, TopDownError, WrongPoints};
use crate::table::{Column, DateRange, Table, Value};

/// The two windows and the columns the detectors may split the comparison by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeComparison {
    pub first: DateRange,
    pub second: DateRange,
    #[serde(default)]
    pub all_dimensions: Vec<String>,
}

impl TimeComparison {
    pub fn new(first: DateRange, second: DateRange) -> Self {
        Self {
            first,
            second,
            all_dimensions: Vec::new(),
        }
    }

    pub fn with_all_dimensions<S: Into<String>>(mut self, dimensions: impl IntoIterator<Item = S>) -> Self {
        self.all_dimensions = dimensions.into_iter().map(Into::into).collect();
        self
    }
}

/// Rows of `table` inside `range`, with the date column replaced by the range's label.
fn labelled_window(table: &Table, range: &DateRange, query: &Query) -> Result<Table> {
    let window = apply_date_range(table, Some(range), &query.date_column, query.day_first)?;
    let label = range.label();
    window.with_column(Column::text(
        query.date_column.as_str(),
        std::iter::repeat(label.as_str()).take(window.num_rows()),
    ))
}

/// Runs the time-compare intent with its detectors.
#[instrument(skip(table, query, comparison, config), fields(rows = table.num_rows()))]
pub fn time_compare(
    table: &Table,
    query: &Query,
    comparison: &TimeComparison,
    config: &OversightConfig,
) -> Result<QueryResponse> {
    let metric = query.metric_name()?;
    let date_column = query.date_column.as_str();
    let dimensions: Vec<String> = query
        .dimensions
        .iter()
        .filter(|d| d.as_str() != date_column)
        .cloned()
        .collect();
    let grouping = columns_with(&dimensions, &[date_column]);

    let mut keep = columns_with(&grouping, &[metric]);
    for dimension in &comparison.all_dimensions {
        if !keep.contains(dimension) {
            keep.push(dimension.clone());
        }
    }
    let prepared = project_columns(&prepare(table, query)?, &keep)?;
    let frame = Table::concat(&[
        labelled_window(&prepared, &comparison.first, query)?,
        labelled_window(&prepared, &comparison.second, query)?,
    ])?;

    let grouped = group_by(
        &project_columns(&frame, &columns_with(&grouping, &[metric]))?,
        &grouping,
        query.summary_operator,
        config,
    )?;
    debug!(
        windowed_rows = frame.num_rows(),
        groups = grouped.table.num_rows(),
        "Compared date windows"
    );

    let slices = ComparedSlices::new(
        date_column,
        Value::from(comparison.first.label()),
        Value::from(comparison.second.label()),
    )
    .with_candidates(&comparison.all_dimensions);
    let input = DetectionInput::new(table, &grouped.table, query, config);
    let report = OversightRunner::new()
        .add(SimpsonsParadox::new(&frame, &slices))
        .add(TopDownError::new(&frame, &slices))
        .add(WrongPoints)
        .run(&input)?;

    let renamed = update_metric_column_name(&grouped.table, query.summary_operator, metric)?;
    Ok(QueryResponse::ranked(Intent::TimeCompare, renamed, grouped.suggestions, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aspects::SummaryOperator;

    fn create_test_table() -> Table {
        Table::builder()
            .date("date", ["2020-01-05", "2020-01-20", "2020-02-03", "2020-02-10", "2020-03-01"])
            .text("city", ["Pune", "Delhi", "Pune", "Pune", "Delhi"])
            .numeric("sales", [10.0, 20.0, 30.0, 40.0, 50.0])
            .build()
            .unwrap()
    }

    #[test]
    fn test_windows_are_labelled() {
        let query = Query::new()
            .with_metric("sales")
            .with_dimensions(["city"])
            .with_summary_operator(SummaryOperator::Sum);
        let comparison = TimeComparison::new(
            DateRange::new("2020-01-01", "2020-01-31"),
            DateRange::new("2020-02-01", "2020-02-29"),
        )
        .with_all_dimensions(["city"]);
        let response = time_compare(&create_test_table(), &query, &comparison, &OversightConfig::default()).unwrap();

        assert_eq!(response.table.column_names(), vec!["city", "date", "Sum of sales"]);
        assert_eq!(
            response.table.column("date").unwrap().values,
            vec![
                Value::from("2020-01-01 - 2020-01-31"),
                Value::from("2020-01-01 - 2020-01-31"),
                Value::from("2020-02-01 - 2020-02-29"),
            ]
        );
        assert_eq!(response.table.column("Sum of sales").unwrap().numbers(), vec![20.0, 10.0, 70.0]);
    }

    #[test]
    fn test_unparseable_window_is_an_error() {
        let query = Query::new().with_metric("sales");
        let comparison = TimeComparison::new(
            DateRange::new("someday", "2020-01-31"),
            DateRange::new("2020-02-01", "2020-02-29"),
        );
        assert!(time_compare(&create_test_table(), &query, &comparison, &OversightConfig::default()).is_err());
    }
}
