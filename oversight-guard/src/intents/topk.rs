//! The top-k intent.
//!
//! Ranks groups (or raw rows, without a summary operator) by the metric and
//! keeps the first `k`. The detectors see both the truncated result and the
//! full ranking, since several of them are about what the cut leaves out.

use tracing::{debug, instrument};

use super::{Intent, Query, QueryResponse};
use crate::aspects::{columns_with, group_by, prepare, project_columns, update_metric_column_name, Grouped};
use crate::config::OversightConfig;
use crate::error::{OversightError, Result};
use crate::oversights::{
    remap_suggestions, DetectionInput, DuplicatesInTopk, LookingAtTails, MoreThanJustTopk, OversightRunner,
    RegressionToMean, TopkVsOthers, TopkWhenLessThanK, WrongPoints,
};
use crate::table::Table;

/// `k` meaning "keep every row".
pub const UNBOUNDED: i64 = -1;

pub(crate) fn validate_k(k: i64) -> Result<()> {
    if k < UNBOUNDED {
        return Err(OversightError::invalid_parameter(
            "k",
            format!("must be -1 or a non-negative row count, got {k}"),
        ));
    }
    Ok(())
}

/// The ordered result before the top-k cut.
fn ranking(table: &Table, query: &Query, ascending: bool, config: &OversightConfig) -> Result<Grouped> {
    let metric = query.metric_name()?;
    let prepared = prepare(table, query)?;
    let projected = project_columns(&prepared, &columns_with(&query.dimensions, &[metric]))?;
    let grouped = group_by(&projected, &query.dimensions, query.summary_operator, config)?;

    let (sorted, order) = grouped.table.sort_by_column(metric, ascending)?;
    Ok(Grouped {
        table: sorted,
        suggestions: remap_suggestions(grouped.suggestions, &order),
    })
}

fn truncate(ranked: &Grouped, k: i64) -> Grouped {
    if k == UNBOUNDED {
        return ranked.clone();
    }
    let kept: Vec<usize> = (0..ranked.table.num_rows().min(k as usize)).collect();
    Grouped {
        table: ranked.table.head(k as usize),
        suggestions: remap_suggestions(ranked.suggestions.clone(), &kept),
    }
}

/// Computes the top-k table and the grouping suggestions that survive the cut.
///
/// The metric column keeps its name; the caller-facing rename happens in
/// [`topk`]. `k = -1` keeps every row.
pub fn topk_results(
    table: &Table,
    query: &Query,
    k: i64,
    ascending: bool,
    config: &OversightConfig,
) -> Result<Grouped> {
    validate_k(k)?;
    Ok(truncate(&ranking(table, query, ascending, config)?, k))
}

/// Runs the top-k intent with its detectors.
#[instrument(skip(table, query, config), fields(rows = table.num_rows()))]
pub fn topk(
    table: &Table,
    query: &Query,
    k: i64,
    ascending: bool,
    config: &OversightConfig,
) -> Result<QueryResponse> {
    validate_k(k)?;
    let metric = query.metric_name()?;
    let full = ranking(table, query, ascending, config)?;
    let result = truncate(&full, k);
    debug!(ranked = full.table.num_rows(), kept = result.table.num_rows(), "Computed top-k");

    let input = DetectionInput::new(table, &result.table, query, config).with_full_result(&full.table);
    let report = OversightRunner::new()
        .add(DuplicatesInTopk)
        .add(RegressionToMean::new(k, ascending))
        .add(MoreThanJustTopk::new(k))
        .add(TopkVsOthers::new(k))
        .add(LookingAtTails::new(k))
        .add(TopkWhenLessThanK::new(k))
        .add(WrongPoints)
        .run(&input)?;

    let renamed = update_metric_column_name(&result.table, query.summary_operator, metric)?;
    Ok(QueryResponse::ranked(Intent::Topk, renamed, result.suggestions, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aspects::SummaryOperator;
    use crate::oversights::OversightKind;
    use crate::table::Value;

    fn create_test_table() -> Table {
        Table::builder()
            .text("batsman", ["a", "b", "c", "a", "b", "d"])
            .numeric("runs", [10.0, 40.0, 25.0, 20.0, 5.0, 1.0])
            .numeric("balls", [12.0, 30.0, 20.0, 22.0, 9.0, 4.0])
            .build()
            .unwrap()
    }

    fn create_test_query() -> Query {
        Query::new()
            .with_metric("runs")
            .with_dimensions(["batsman"])
            .with_summary_operator(SummaryOperator::Sum)
    }

    #[test]
    fn test_grouped_topk() {
        let grouped = topk_results(&create_test_table(), &create_test_query(), 2, false, &OversightConfig::default())
            .unwrap();
        assert_eq!(grouped.table.column_names(), vec!["batsman", "runs"]);
        assert_eq!(
            grouped.table.column("batsman").unwrap().values,
            vec![Value::from("b"), Value::from("a")]
        );
        assert_eq!(grouped.table.column("runs").unwrap().numbers(), vec![45.0, 30.0]);
    }

    #[test]
    fn test_ascending_and_unbounded() {
        let grouped = topk_results(
            &create_test_table(),
            &create_test_query(),
            UNBOUNDED,
            true,
            &OversightConfig::default(),
        )
        .unwrap();
        assert_eq!(grouped.table.column("runs").unwrap().numbers(), vec![1.0, 25.0, 30.0, 45.0]);
    }

    #[test]
    fn test_invalid_k() {
        let err = topk_results(&create_test_table(), &create_test_query(), -2, false, &OversightConfig::default())
            .unwrap_err();
        assert!(matches!(err, OversightError::InvalidParameter { .. }));
    }

    #[test]
    fn test_raw_rows_report_duplicates() {
        let query = Query::new().with_metric("runs").with_dimensions(["batsman"]);
        let response = topk(&create_test_table(), &query, 3, false, &OversightConfig::default()).unwrap();
        // 40 (b), 25 (c), 20 (a): no duplicate yet
        assert!(!response
            .suggestions
            .iter()
            .any(|s| s.oversight == OversightKind::DuplicatesInTopk));

        let response = topk(&create_test_table(), &query, 5, false, &OversightConfig::default()).unwrap();
        assert_eq!(response.suggestions[0].oversight, OversightKind::DuplicatesInTopk);
        assert!(response.table.has_column("runs"));
    }

    #[test]
    fn test_less_than_k_and_rename() {
        let response = topk(&create_test_table(), &create_test_query(), 10, false, &OversightConfig::default())
            .unwrap();
        assert_eq!(response.table.num_rows(), 4);
        assert!(response.table.has_column("Sum of runs"));
        assert!(response
            .suggestions
            .iter()
            .any(|s| s.oversight == OversightKind::TopkWhenLessThanKPresent
                && s.message == "Instead of 10 only 4 rows are present in the results"));
    }

    #[test]
    fn test_mean_suggestion_follows_sorted_row() {
        // group "x" is skewed and ends up second after sorting
        let table = Table::builder()
            .text("team", ["x", "x", "x", "x", "x", "x", "x", "x", "x", "x", "y"])
            .numeric("score", [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 100.0, 500.0])
            .build()
            .unwrap();
        let query = Query::new()
            .with_metric("score")
            .with_dimensions(["team"])
            .with_summary_operator(SummaryOperator::Mean);
        let response = topk(&table, &query, UNBOUNDED, false, &OversightConfig::default()).unwrap();
        let mean_vs_median = response
            .suggestions
            .iter()
            .find(|s| s.oversight == OversightKind::MeanVsMedian)
            .unwrap();
        assert_eq!(mean_vs_median.row_list.as_ref().unwrap()[0].row, 2);

        // cut away, the suggestion goes with it
        let response = topk(&table, &query, 1, false, &OversightConfig::default()).unwrap();
        assert!(!response
            .suggestions
            .iter()
            .any(|s| s.oversight == OversightKind::MeanVsMedian));
    }
}
