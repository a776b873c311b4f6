//! The weighted-mean intent.

use tracing::{instrument, warn};

use super::{Intent, Query, QueryResponse};
use crate::aspects::grouping::{group_rows, key_columns};
use crate::aspects::{columns_with, prepare, project_columns};
use crate::config::OversightConfig;
use crate::error::Result;
use crate::oversights::{DetectionInput, OversightRunner, WeightedMeanWeights, WrongPoints};
use crate::table::{Column, ColumnType, Table, Value};

/// Name of the result column, e.g. `mean of price weighted by quantity`.
pub fn weighted_mean_column(metric: &str, weight: &str) -> String {
    format!("mean of {metric} weighted by {weight}")
}

/// `Σ(aᵢwᵢ) / Σwᵢ` over the rows where both are present; null when the weights sum to 0.
fn weighted_average(metric: &[Option<f64>], weight: &[Option<f64>], rows: &[usize]) -> Value {
    let (numerator, denominator) = rows
        .iter()
        .filter_map(|&r| Some((metric[r]?, weight[r]?)))
        .fold((0.0, 0.0), |(num, den), (a, w)| (num + a * w, den + w));
    if denominator == 0.0 {
        warn!("Weights sum to zero, leaving the weighted mean empty");
        return Value::Null;
    }
    Value::Number(numerator / denominator)
}

/// Mean of the metric weighted by `weight`, globally or per dimension tuple.
#[instrument(skip(table, query, config), fields(rows = table.num_rows()))]
pub fn weighted_mean(table: &Table, query: &Query, weight: &str, config: &OversightConfig) -> Result<QueryResponse> {
    let metric = query.metric_name()?;
    let projected = project_columns(&prepare(table, query)?, &columns_with(&query.dimensions, &[metric, weight]))?;
    let values = projected.column(metric)?.numbers_by_row()?;
    let weights = projected.column(weight)?.numbers_by_row()?;

    let groups = group_rows(&projected, &query.dimensions)?;
    let mut columns = key_columns(&projected, &query.dimensions, &groups)?;
    columns.push(Column::new(
        weighted_mean_column(metric, weight),
        ColumnType::Numeric,
        groups
            .values()
            .map(|rows| weighted_average(&values, &weights, rows))
            .collect(),
    ));
    let result = Table::new(columns)?;

    let input = DetectionInput::new(table, &result, query, config);
    let report = OversightRunner::new()
        .add(WeightedMeanWeights::excluding(weight))
        .add(WrongPoints)
        .run(&input)?;

    Ok(QueryResponse::ranked(Intent::WeightedMean, result, Vec::new(), report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oversights::OversightKind;

    fn create_test_table() -> Table {
        Table::builder()
            .text("shop", ["a", "a", "b", "b"])
            .numeric("price", [10.0, 20.0, 5.0, 7.0])
            .numeric("quantity", [1.0, 3.0, 0.0, 0.0])
            .numeric("share", [40.0, 30.0, 20.0, 10.0])
            .build()
            .unwrap()
    }

    #[test]
    fn test_global_weighted_mean() {
        let query = Query::new().with_metric("price");
        let response = weighted_mean(&create_test_table(), &query, "quantity", &OversightConfig::default()).unwrap();
        assert_eq!(response.table.column_names(), vec!["mean of price weighted by quantity"]);
        assert_eq!(response.table.columns()[0].numbers(), vec![17.5]);
    }

    #[test]
    fn test_zero_weights_give_null() {
        let query = Query::new().with_metric("price").with_dimensions(["shop"]);
        let response = weighted_mean(&create_test_table(), &query, "quantity", &OversightConfig::default()).unwrap();
        let column = response.table.column(&weighted_mean_column("price", "quantity")).unwrap();
        assert_eq!(column.values, vec![Value::from(17.5), Value::Null]);
    }

    #[test]
    fn test_suggests_other_weights() {
        let query = Query::new().with_metric("price");
        let response = weighted_mean(&create_test_table(), &query, "quantity", &OversightConfig::default()).unwrap();
        assert_eq!(
            response.suggestions[0].oversight,
            OversightKind::WeightedMeanWithDifferentWeights
        );
        assert_eq!(
            response.suggestions[0].message,
            "Consider using ['share'] as the weights for computing weighted mean."
        );
    }
}
