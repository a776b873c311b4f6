//! The correlation intent.

use tracing::instrument;

use super::{Intent, Query, QueryResponse};
use crate::aspects::grouping::{group_rows, key_columns};
use crate::aspects::{columns_with, prepare, project_columns};
use crate::config::OversightConfig;
use crate::error::Result;
use crate::oversights::similarity::pearson;
use crate::oversights::RunReport;
use crate::table::{Column, ColumnType, Table, Value};

/// Name of the result column, e.g. `correlation between "runs" , "balls"`.
pub fn correlation_column(metric1: &str, metric2: &str) -> String {
    format!("correlation between \"{metric1}\" , \"{metric2}\"")
}

/// Pearson correlation over the rows where both metrics are present.
fn pairwise_pearson(first: &[Option<f64>], second: &[Option<f64>], rows: &[usize]) -> Value {
    let (xs, ys): (Vec<f64>, Vec<f64>) = rows
        .iter()
        .filter_map(|&r| Some((first[r]?, second[r]?)))
        .unzip();
    pearson(&xs, &ys).into()
}

/// Correlation of two metrics, over the whole table or per dimension tuple.
///
/// No detector applies; a correlation that cannot be computed (fewer than
/// two pairs, or a constant metric) is null.
#[instrument(skip(table, query, _config), fields(rows = table.num_rows()))]
pub fn correlation(
    table: &Table,
    query: &Query,
    metric1: &str,
    metric2: &str,
    _config: &OversightConfig,
) -> Result<QueryResponse> {
    let projected = project_columns(&prepare(table, query)?, &columns_with(&query.dimensions, &[metric1, metric2]))?;
    let first = projected.column(metric1)?.numbers_by_row()?;
    let second = projected.column(metric2)?.numbers_by_row()?;

    let groups = group_rows(&projected, &query.dimensions)?;
    let mut columns = key_columns(&projected, &query.dimensions, &groups)?;
    columns.push(Column::new(
        correlation_column(metric1, metric2),
        ColumnType::Numeric,
        groups.values().map(|rows| pairwise_pearson(&first, &second, rows)).collect(),
    ));

    Ok(QueryResponse::ranked(
        Intent::Correlation,
        Table::new(columns)?,
        Vec::new(),
        RunReport::default(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_table() -> Table {
        Table::builder()
            .text("team", ["a", "a", "a", "b", "b", "b"])
            .numeric("runs", [10.0, 20.0, 30.0, 10.0, 20.0, 30.0])
            .numeric("balls", [5.0, 10.0, 15.0, 30.0, 20.0, 10.0])
            .build()
            .unwrap()
    }

    #[test]
    fn test_global_correlation() {
        let table = Table::builder()
            .numeric("runs", [1.0, 2.0, 3.0])
            .numeric("balls", [2.0, 4.0, 6.0])
            .build()
            .unwrap();
        let response = correlation(&table, &Query::new(), "runs", "balls", &OversightConfig::default()).unwrap();
        assert_eq!(response.table.column_names(), vec!["correlation between \"runs\" , \"balls\""]);
        let r = response.table.columns()[0].values[0].as_f64().unwrap();
        assert!((r - 1.0).abs() < 1e-12);
        assert!(response.suggestions.is_empty());
    }

    #[test]
    fn test_per_group_correlation() {
        let query = Query::new().with_dimensions(["team"]);
        let response = correlation(&create_test_table(), &query, "runs", "balls", &OversightConfig::default()).unwrap();
        let values = response.table.column(&correlation_column("runs", "balls")).unwrap().numbers();
        assert_eq!(values.len(), 2);
        assert!((values[0] - 1.0).abs() < 1e-12);
        assert!((values[1] + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_constant_metric_is_null() {
        let table = Table::builder()
            .numeric("runs", [1.0, 1.0, 1.0])
            .numeric("balls", [2.0, 4.0, 6.0])
            .build()
            .unwrap();
        let response = correlation(&table, &Query::new(), "runs", "balls", &OversightConfig::default()).unwrap();
        assert!(response.table.columns()[0].values[0].is_null());
    }
}
