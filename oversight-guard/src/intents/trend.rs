//! The trend intent.

use tracing::instrument;

use super::{Intent, Query, QueryResponse};
use crate::aspects::{group_by, prepare, project_columns, update_metric_column_name};
use crate::config::OversightConfig;
use crate::error::{OversightError, Result};
use crate::oversights::{remap_suggestions, DetectionInput, OversightRunner, WrongPoints};
use crate::table::{format_date, parse_date, Column, ColumnType, Granularity, Table, Value};

/// Replaces every date with the start of its period.
fn truncate_dates(table: &Table, query: &Query, granularity: Granularity) -> Result<Table> {
    let dates = table.column(&query.date_column)?;
    let values = dates
        .values
        .iter()
        .map(|value| match value {
            Value::Null => Ok(Value::Null),
            Value::Text(text) => {
                let date = parse_date(text, query.day_first)?;
                Ok(Value::Text(format_date(&granularity.truncate(&date))))
            }
            other => Err(OversightError::date_parse(other.to_string(), query.day_first)),
        })
        .collect::<Result<Vec<_>>>()?;
    table.with_column(Column::new(query.date_column.as_str(), ColumnType::Date, values))
}

/// The metric per period, oldest first.
#[instrument(skip(table, query, config), fields(rows = table.num_rows()))]
pub fn trend(
    table: &Table,
    query: &Query,
    granularity: Granularity,
    config: &OversightConfig,
) -> Result<QueryResponse> {
    let metric = query.metric_name()?;
    let date_column = query.date_column.clone();
    let projected = project_columns(&prepare(table, query)?, &[date_column.clone(), metric.to_string()])?;
    let truncated = truncate_dates(&projected, query, granularity)?;

    let grouped = group_by(&truncated, &[date_column.clone()], query.summary_operator, config)?;
    let (sorted, order) = grouped.table.sort_by_column(&date_column, true)?;
    let suggestions = remap_suggestions(grouped.suggestions, &order);

    let input = DetectionInput::new(table, &sorted, query, config);
    let report = OversightRunner::new().add(WrongPoints).run(&input)?;

    let renamed = update_metric_column_name(&sorted, query.summary_operator, metric)?;
    Ok(QueryResponse::ranked(Intent::Trend, renamed, suggestions, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aspects::SummaryOperator;

    fn create_test_table() -> Table {
        Table::builder()
            .date("date", ["2020-03-15", "2020-01-02", "2020-01-30", "2021-01-01", "2020-03-01"])
            .numeric("sales", [1.0, 2.0, 3.0, 4.0, 5.0])
            .build()
            .unwrap()
    }

    #[test]
    fn test_monthly_trend() {
        let query = Query::new()
            .with_metric("sales")
            .with_summary_operator(SummaryOperator::Sum);
        let response = trend(&create_test_table(), &query, Granularity::Monthly, &OversightConfig::default()).unwrap();
        assert_eq!(response.table.column_names(), vec!["date", "Sum of sales"]);
        assert_eq!(
            response.table.column("date").unwrap().values,
            vec![
                Value::from("2020-01-01"),
                Value::from("2020-03-01"),
                Value::from("2021-01-01"),
            ]
        );
        assert_eq!(response.table.column("Sum of sales").unwrap().numbers(), vec![5.0, 6.0, 4.0]);
    }

    #[test]
    fn test_annual_trend() {
        let query = Query::new()
            .with_metric("sales")
            .with_summary_operator(SummaryOperator::Count);
        let response = trend(&create_test_table(), &query, Granularity::Annually, &OversightConfig::default()).unwrap();
        assert_eq!(response.table.column("Count of sales").unwrap().numbers(), vec![4.0, 1.0]);
    }

    #[test]
    fn test_bad_date_is_fatal() {
        let table = Table::builder()
            .date("date", ["2020-01-01", "not a date"])
            .numeric("sales", [1.0, 2.0])
            .build()
            .unwrap();
        let query = Query::new().with_metric("sales");
        let err = trend(&table, &query, Granularity::Daily, &OversightConfig::default()).unwrap_err();
        assert!(matches!(err, OversightError::DateParse { .. }));
    }
}
