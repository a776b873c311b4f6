//! Table transforms shared by every intent.
//!
//! Intents are assembled from the same few steps: filter by date range,
//! slice by predicates, project the needed columns, then group. Each step is
//! a whole-table function returning a new [`Table`].

pub mod grouping;
pub mod markers;
pub mod predicate;
pub mod summary;

pub use grouping::{group_by, Grouped};
pub use predicate::{Filter, Operand, Predicate};
pub use summary::SummaryOperator;

use tracing::debug;

use crate::error::{OversightError, Result};
use crate::intents::Query;
use crate::table::{parse_date, DateRange, Table, Value};

/// Keeps the rows whose date lies within `range`, bounds included.
///
/// A missing range keeps every row. Null dates never match; any other value
/// that does not parse as a date is an error.
pub fn apply_date_range(
    table: &Table,
    range: Option<&DateRange>,
    date_column: &str,
    day_first: bool,
) -> Result<Table> {
    let Some(range) = range else {
        return Ok(table.clone());
    };
    let mask = date_mask(table, range, date_column, day_first)?;
    let filtered = table.filter_rows(&mask);
    debug!(
        before = table.num_rows(),
        after = filtered.num_rows(),
        range = %range.label(),
        "Applied date range"
    );
    Ok(filtered)
}

/// Whether each row's date lies within `range`, bounds included.
pub(crate) fn date_mask(table: &Table, range: &DateRange, date_column: &str, day_first: bool) -> Result<Vec<bool>> {
    let (start, end) = range.bounds(day_first)?;
    table
        .column(date_column)?
        .values
        .iter()
        .map(|value| match value {
            Value::Null => Ok(false),
            Value::Text(text) => {
                let date = parse_date(text, day_first)?;
                Ok(start <= date && date <= end)
            }
            other => Err(OversightError::date_parse(other.to_string(), day_first)),
        })
        .collect()
}

/// Keeps the rows that satisfy every predicate.
pub fn slice_table(table: &Table, predicates: &[Predicate]) -> Result<Table> {
    if predicates.is_empty() {
        return Ok(table.clone());
    }
    let mask = slice_mask(table, predicates)?;
    Ok(table.filter_rows(&mask))
}

pub(crate) fn slice_mask(table: &Table, predicates: &[Predicate]) -> Result<Vec<bool>> {
    let mut mask = vec![true; table.num_rows()];
    for predicate in predicates {
        for (keep, matched) in mask.iter_mut().zip(predicate.mask(table)?) {
            *keep &= matched;
        }
    }
    Ok(mask)
}

/// Keeps the listed columns, in the table's own column order.
pub fn project_columns(table: &Table, keep: &[String]) -> Result<Table> {
    if let Some(missing) = keep.iter().find(|name| !table.has_column(name)) {
        return Err(OversightError::column_not_found(missing.as_str()));
    }
    let ordered: Vec<String> = table
        .column_names()
        .into_iter()
        .filter(|name| keep.iter().any(|k| k == name))
        .map(str::to_string)
        .collect();
    table.select_columns(&ordered)
}

/// Renames the metric column to `"<operator> of <metric>"`.
///
/// Without an operator the table is returned as is.
pub fn update_metric_column_name(
    table: &Table,
    operator: Option<SummaryOperator>,
    metric: &str,
) -> Result<Table> {
    match operator {
        Some(op) => table.rename_column(metric, metric_column_label(op, metric)),
        None => Ok(table.clone()),
    }
}

pub(crate) fn metric_column_label(operator: SummaryOperator, metric: &str) -> String {
    format!("{} of {}", operator.name(), metric)
}

/// Date range filter followed by the query's slices.
pub fn prepare(table: &Table, query: &Query) -> Result<Table> {
    let in_range = apply_date_range(
        table,
        query.date_range.as_ref(),
        &query.date_column,
        query.day_first,
    )?;
    slice_table(&in_range, &query.slices)
}

/// `dimensions` followed by `extra`, without repeats.
pub fn columns_with(dimensions: &[String], extra: &[&str]) -> Vec<String> {
    let mut columns = dimensions.to_vec();
    for name in extra {
        if !columns.iter().any(|c| c == name) {
            columns.push(name.to_string());
        }
    }
    columns
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_table() -> Table {
        Table::builder()
            .date("date", ["2020-01-01", "2020-01-15", "2020-02-01", "2020-03-01"])
            .text("city", ["Pune", "Delhi", "Pune", "Agra"])
            .numeric("sales", [1.0, 2.0, 3.0, 4.0])
            .build()
            .unwrap()
    }

    #[test]
    fn test_date_range_inclusive() {
        let table = create_test_table();
        let range = DateRange::new("2020-01-15", "2020-02-01");
        let filtered = apply_date_range(&table, Some(&range), "date", false).unwrap();
        assert_eq!(filtered.column("sales").unwrap().numbers(), vec![2.0, 3.0]);

        let unchanged = apply_date_range(&table, None, "date", false).unwrap();
        assert_eq!(unchanged, table);
    }

    #[test]
    fn test_date_mask_skips_nulls() {
        let table = Table::builder()
            .column(crate::table::Column::new(
                "date",
                crate::table::ColumnType::Date,
                vec![Value::from("2020-01-10"), Value::Null, Value::from("2021-01-01")],
            ))
            .build()
            .unwrap();
        let range = DateRange::new("2020-01-01", "2020-12-31");
        assert_eq!(date_mask(&table, &range, "date", false).unwrap(), vec![true, false, false]);
    }

    #[test]
    fn test_date_range_bad_date_is_fatal() {
        let table = Table::builder().date("date", ["2020-01-01", "soon"]).build().unwrap();
        let range = DateRange::new("2020-01-01", "2020-12-31");
        assert!(matches!(
            apply_date_range(&table, Some(&range), "date", false),
            Err(OversightError::DateParse { .. })
        ));
    }

    #[test]
    fn test_slices_are_anded() {
        let table = create_test_table();
        let sliced = slice_table(
            &table,
            &[
                Predicate::equal_to("city", "Pune"),
                Predicate::greater_than("sales", 1),
            ],
        )
        .unwrap();
        assert_eq!(sliced.column("sales").unwrap().numbers(), vec![3.0]);
        assert_eq!(slice_table(&table, &[]).unwrap(), table);
    }

    #[test]
    fn test_project_keeps_table_order() {
        let table = create_test_table();
        let projected = project_columns(&table, &["sales".to_string(), "city".to_string()]).unwrap();
        assert_eq!(projected.column_names(), vec!["city", "sales"]);

        let err = project_columns(&table, &["profit".to_string()]).unwrap_err();
        assert!(matches!(err, OversightError::ColumnNotFound { .. }));
    }

    #[test]
    fn test_update_metric_column_name() {
        let table = create_test_table();
        let renamed = update_metric_column_name(&table, Some(SummaryOperator::Mean), "sales").unwrap();
        assert!(renamed.has_column("Mean of sales"));
        let same = update_metric_column_name(&table, None, "sales").unwrap();
        assert!(same.has_column("sales"));
    }

    #[test]
    fn test_prepare_applies_range_then_slices() {
        let table = create_test_table();
        let query = Query::new()
            .with_date_range(DateRange::new("2020-01-01", "2020-02-28"))
            .with_slice(Predicate::equal_to("city", "Pune"));
        let prepared = prepare(&table, &query).unwrap();
        assert_eq!(prepared.column("sales").unwrap().numbers(), vec![1.0, 3.0]);
    }
}
