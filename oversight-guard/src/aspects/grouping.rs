//! Group-by with summary operators.
//!
//! Grouping is where two oversights are cheapest to spot: a MEAN reduction
//! already holds every value of the group, and so does a proportion. The
//! per-call [`GroupAccumulator`] collects those row-level suggestions while
//! the groups are reduced, so no state outlives a single [`group_by`] call.

use std::collections::BTreeMap;

use tracing::{debug, instrument, warn};

use super::summary::SummaryOperator;
use crate::config::OversightConfig;
use crate::error::Result;
use crate::log_pipeline;
use crate::oversights::attribution_with_hidden_negatives::hidden_negatives;
use crate::oversights::mean_vs_median::mean_vs_median;
use crate::oversights::Suggestion;
use crate::table::{Column, Table, Value};

/// A grouped table and the suggestions raised while reducing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Grouped {
    pub table: Table,
    pub suggestions: Vec<Suggestion>,
}

impl Grouped {
    pub fn new(table: Table) -> Self {
        Self {
            table,
            suggestions: Vec::new(),
        }
    }
}

/// Suggestions raised so far, and the group being reduced.
struct GroupAccumulator<'a> {
    /// 1-based position of the current group in the output.
    position: usize,
    suggestions: Vec<Suggestion>,
    config: &'a OversightConfig,
}

impl<'a> GroupAccumulator<'a> {
    fn new(config: &'a OversightConfig) -> Self {
        Self {
            position: 0,
            suggestions: Vec::new(),
            config,
        }
    }

    fn next_group(&mut self) {
        self.position += 1;
    }

    /// Runs the aggregation-coupled checks for one column of the current group.
    fn observe(&mut self, operator: SummaryOperator, values: &[&Value]) {
        let found = match operator {
            SummaryOperator::Mean => {
                let numbers: Vec<f64> = values.iter().filter_map(|v| v.as_f64()).collect();
                mean_vs_median(&numbers, self.config.mean_vs_median_skew_bound)
            }
            op if op.is_proportion() => hidden_negatives(values),
            _ => None,
        };
        if let Some(suggestion) = found {
            let confidence = suggestion.confidence_score.unwrap_or(1.0);
            self.suggestions.push(suggestion.at_row(self.position, confidence));
        }
    }
}

/// Row positions of `table` per distinct dimension tuple, in ascending key order.
///
/// With no dimensions there is exactly one group, even over an empty table.
pub(crate) fn group_rows(table: &Table, dimensions: &[String]) -> Result<BTreeMap<Vec<Value>, Vec<usize>>> {
    let mut groups: BTreeMap<Vec<Value>, Vec<usize>> = BTreeMap::new();
    for (row, key) in table.key_tuples(dimensions)?.into_iter().enumerate() {
        groups.entry(key).or_default().push(row);
    }
    if dimensions.is_empty() && groups.is_empty() {
        groups.insert(Vec::new(), Vec::new());
    }
    Ok(groups)
}

/// One output column per dimension, holding the group keys in order.
pub(crate) fn key_columns(
    table: &Table,
    dimensions: &[String],
    groups: &BTreeMap<Vec<Value>, Vec<usize>>,
) -> Result<Vec<Column>> {
    dimensions
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let source = table.column(name)?;
            let values = groups.keys().map(|key| key[i].clone()).collect();
            Ok(Column::new(name.as_str(), source.column_type, values))
        })
        .collect()
}

/// Groups `table` by `dimensions` and reduces every other column with `operator`.
///
/// Without an operator the table is returned unchanged. Output rows are
/// ordered by ascending dimension tuple, dimension columns come first in
/// caller order. With no dimensions the whole table is a single group.
#[instrument(skip(table, config), fields(rows = table.num_rows()))]
pub fn group_by(
    table: &Table,
    dimensions: &[String],
    operator: Option<SummaryOperator>,
    config: &OversightConfig,
) -> Result<Grouped> {
    let Some(operator) = operator else {
        return Ok(Grouped::new(table.clone()));
    };

    let groups = group_rows(table, dimensions)?;
    debug!(groups = groups.len(), operator = %operator, "Grouping table");

    let mut columns = key_columns(table, dimensions, &groups)?;

    let measures: Vec<&Column> = table
        .columns()
        .iter()
        .filter(|c| !dimensions.contains(&c.name))
        .collect();

    let mut accumulator = GroupAccumulator::new(config);
    let mut reduced: Vec<Vec<Value>> = vec![Vec::with_capacity(groups.len()); measures.len()];
    for rows in groups.values() {
        accumulator.next_group();
        for (measure, output) in measures.iter().zip(reduced.iter_mut()) {
            let values: Vec<&Value> = rows.iter().map(|&r| &measure.values[r]).collect();
            output.push(operator.reduce(&measure.name, &values)?);
            accumulator.observe(operator, &values);
        }
    }

    for (measure, mut values) in measures.into_iter().zip(reduced) {
        if operator.is_proportion() {
            normalize(&measure.name, &mut values);
        }
        columns.push(Column::new(
            measure.name.clone(),
            operator.output_type(measure.column_type),
            values,
        ));
    }

    let grouped = Table::new(columns)?;
    log_pipeline!(
        config.log,
        rows = grouped.num_rows(),
        suggestions = accumulator.suggestions.len(),
        "Grouped table"
    );
    Ok(Grouped {
        table: grouped,
        suggestions: accumulator.suggestions,
    })
}

/// Divides per-group sums or counts by their grand total.
fn normalize(column: &str, values: &mut [Value]) {
    let total: f64 = values.iter().filter_map(Value::as_f64).sum();
    if total == 0.0 {
        warn!(column, "Proportion over a zero total, leaving the column empty");
        values.iter_mut().for_each(|v| *v = Value::Null);
        return;
    }
    for value in values.iter_mut() {
        if let Some(x) = value.as_f64() {
            *value = Value::Number(x / total);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oversights::OversightKind;

    fn create_test_table() -> Table {
        Table::builder()
            .text("city", ["Pune", "Delhi", "Pune", "Delhi", "Agra"])
            .text("shop", ["a", "b", "c", "d", "e"])
            .numeric("sales", [10.0, 20.0, 30.0, 40.0, 50.0])
            .build()
            .unwrap()
    }

    fn dims(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_group_rows_and_key_columns() {
        let table = create_test_table();
        let groups = group_rows(&table, &dims(&["city"])).unwrap();
        let rows: Vec<&Vec<usize>> = groups.values().collect();
        assert_eq!(rows, vec![&vec![4], &vec![1, 3], &vec![0, 2]]);

        let keys = key_columns(&table, &dims(&["city"]), &groups).unwrap();
        assert_eq!(keys.len(), 1);
        assert_eq!(
            keys[0].values,
            vec![Value::from("Agra"), Value::from("Delhi"), Value::from("Pune")]
        );

        let empty = table.filter_rows(&[false; 5]);
        assert_eq!(group_rows(&empty, &[]).unwrap().len(), 1);
    }

    #[test]
    fn test_no_operator_is_identity() {
        let table = create_test_table();
        let grouped = group_by(&table, &dims(&["city"]), None, &OversightConfig::default()).unwrap();
        assert_eq!(grouped.table, table);
        assert!(grouped.suggestions.is_empty());
    }

    #[test]
    fn test_sum_sorted_by_key() {
        let table = create_test_table().select_columns(&dims(&["city", "sales"])).unwrap();
        let grouped = group_by(
            &table,
            &dims(&["city"]),
            Some(SummaryOperator::Sum),
            &OversightConfig::default(),
        )
        .unwrap();
        let cities: Vec<String> = grouped.table.column("city").unwrap().values.iter().map(|v| v.to_string()).collect();
        assert_eq!(cities, vec!["Agra", "Delhi", "Pune"]);
        assert_eq!(grouped.table.column("sales").unwrap().numbers(), vec![50.0, 60.0, 40.0]);
    }

    #[test]
    fn test_dimensions_lead() {
        let table = Table::builder()
            .numeric("sales", [1.0, 2.0])
            .text("city", ["x", "y"])
            .build()
            .unwrap();
        let grouped = group_by(
            &table,
            &dims(&["city"]),
            Some(SummaryOperator::Max),
            &OversightConfig::default(),
        )
        .unwrap();
        assert_eq!(grouped.table.column_names(), vec!["city", "sales"]);
    }

    #[test]
    fn test_count_distinct_and_text_columns() {
        let table = create_test_table();
        let grouped = group_by(
            &table,
            &dims(&["city"]),
            Some(SummaryOperator::Distinct),
            &OversightConfig::default(),
        )
        .unwrap();
        assert_eq!(grouped.table.column("shop").unwrap().numbers(), vec![1.0, 2.0, 2.0]);
    }

    #[test]
    fn test_proportion_sums_to_one() {
        let table = create_test_table().select_columns(&dims(&["city", "sales"])).unwrap();
        let grouped = group_by(
            &table,
            &dims(&["city"]),
            Some(SummaryOperator::ProportionOfSum),
            &OversightConfig::default(),
        )
        .unwrap();
        let total: f64 = grouped.table.column("sales").unwrap().numbers().iter().sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_proportion_of_zero_total_is_null() {
        let table = Table::builder()
            .text("k", ["a", "b"])
            .numeric("v", [1.0, -1.0])
            .build()
            .unwrap();
        let grouped = group_by(
            &table,
            &dims(&["k"]),
            Some(SummaryOperator::ProportionOfSum),
            &OversightConfig::default(),
        )
        .unwrap();
        assert!(grouped.table.column("v").unwrap().values.iter().all(Value::is_null));
        // the negative contribution is flagged on its own group
        assert_eq!(grouped.suggestions.len(), 1);
        assert_eq!(grouped.suggestions[0].row_list.as_ref().unwrap()[0].row, 2);
    }

    #[test]
    fn test_mean_flags_skewed_group() {
        let mut keys = vec!["flat"; 5];
        keys.extend(vec!["tail"; 21]);
        let mut values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        values.extend(vec![1.0; 20]);
        values.push(1000.0);
        let table = Table::builder().text("k", keys).numeric("v", values).build().unwrap();

        let grouped = group_by(
            &table,
            &dims(&["k"]),
            Some(SummaryOperator::Mean),
            &OversightConfig::default(),
        )
        .unwrap();
        assert_eq!(grouped.suggestions.len(), 1);
        let suggestion = &grouped.suggestions[0];
        assert_eq!(suggestion.oversight, OversightKind::MeanVsMedian);
        let row = &suggestion.row_list.as_ref().unwrap()[0];
        assert_eq!(row.row, 2);
        assert_eq!(Some(row.confidence_score), suggestion.confidence_score);
    }

    #[test]
    fn test_no_dimensions_single_group() {
        let table = create_test_table().select_columns(&dims(&["sales"])).unwrap();
        let grouped = group_by(&table, &[], Some(SummaryOperator::Sum), &OversightConfig::default()).unwrap();
        assert_eq!(grouped.table.num_rows(), 1);
        assert_eq!(grouped.table.column("sales").unwrap().numbers(), vec![150.0]);
    }

    #[test]
    fn test_numeric_operator_on_text_fails() {
        let table = create_test_table();
        let err = group_by(
            &table,
            &dims(&["city"]),
            Some(SummaryOperator::Sum),
            &OversightConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, crate::error::OversightError::TypeMismatch { .. }));
    }
}
