//! Wrong points.
//!
//! Looks at the table as handed to the intent, before any filter, for cells
//! that are probably not data: a single value (a column extreme or a known
//! sentinel such as `-99`) filling a large share of a column, or a maximum
//! larger than everything else in its column combined.

use super::runner::{DetectionInput, OversightDetector};
use super::{OversightKind, Suggestion};
use crate::config::OversightConfig;
use crate::error::Result;
use crate::table::{Column, Table, Value};

const NO_DATA_MESSAGE: &str = "Some cells in the table may be wrongly written, maybe to represent NO data";
const MISTYPED_MESSAGE: &str =
    "Some of the entry in the table may have been wrongly typed as they excede the sum of other entries";

/// Returns the first finding, checking for no-data sentinels across all columns before outliers.
pub fn wrong_points(table: &Table, config: &OversightConfig) -> Option<Suggestion> {
    let numeric: Vec<&Column> = table.columns().iter().filter(|c| c.is_numeric()).collect();
    numeric
        .iter()
        .find_map(|column| sentinel_share(column, config))
        .map(|share| Suggestion::new(OversightKind::WrongPoints, NO_DATA_MESSAGE).with_confidence(share))
        .or_else(|| {
            numeric
                .iter()
                .any(|column| has_dominant_maximum(column))
                .then(|| Suggestion::new(OversightKind::WrongPoints, MISTYPED_MESSAGE))
        })
}

/// Share of the first candidate value that fills more than the threshold of the column.
///
/// Nulls count towards the column length but never match.
fn sentinel_share(column: &Column, config: &OversightConfig) -> Option<f64> {
    let values = column.numbers();
    let min = values.iter().copied().reduce(f64::min)?;
    let max = values.iter().copied().reduce(f64::max)?;
    let total = column.len() as f64;

    [min, max]
        .into_iter()
        .chain(config.wrong_points_sentinels.iter().copied())
        .map(|candidate| {
            let occurrences = column
                .values
                .iter()
                .filter(|v| matches!(v, Value::Number(n) if *n == candidate))
                .count();
            occurrences as f64 / total
        })
        .find(|share| *share > config.wrong_points_threshold)
}

fn has_dominant_maximum(column: &Column) -> bool {
    let values = column.numbers();
    let Some(max) = values.iter().copied().reduce(f64::max) else {
        return false;
    };
    if values.iter().any(|v| *v < 0.0) {
        return false;
    }
    let rest: f64 = values.iter().sum::<f64>() - max;
    max > rest
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WrongPoints;

impl OversightDetector for WrongPoints {
    fn kind(&self) -> OversightKind {
        OversightKind::WrongPoints
    }

    fn detect(&self, input: &DetectionInput<'_>) -> Result<Vec<Suggestion>> {
        Ok(wrong_points(input.table, input.config).into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_values() {
        let table = Table::builder()
            .text("name", ["a", "b", "c", "d", "e"])
            .numeric("age", [-99.0, 31.0, -99.0, 45.0, -99.0])
            .build()
            .unwrap();
        let suggestion = wrong_points(&table, &OversightConfig::default()).unwrap();
        assert_eq!(suggestion.message, NO_DATA_MESSAGE);
        assert_eq!(suggestion.confidence_score, Some(0.6));
    }

    #[test]
    fn test_dominant_maximum() {
        let table = Table::builder()
            .numeric("sales", [10.0, 12.0, 11.0, 1300.0])
            .build()
            .unwrap();
        let suggestion = wrong_points(&table, &OversightConfig::default()).unwrap();
        assert_eq!(suggestion.message, MISTYPED_MESSAGE);
        assert_eq!(suggestion.confidence_score, None);
    }

    #[test]
    fn test_nulls_count_in_share() {
        // 2 of 5 rows hold the minimum, under 45%
        let table = Table::builder()
            .column(Column::new(
                "score",
                crate::table::ColumnType::Numeric,
                vec![
                    Value::Number(1.0),
                    Value::Number(1.0),
                    Value::Null,
                    Value::Number(2.0),
                    Value::Number(1.5),
                ],
            ))
            .build()
            .unwrap();
        assert!(wrong_points(&table, &OversightConfig::default()).is_none());
    }

    #[test]
    fn test_negative_column_skips_maximum_check() {
        let table = Table::builder()
            .numeric("delta", [-1.0, 2.0, 3.0, 100.0])
            .build()
            .unwrap();
        assert!(wrong_points(&table, &OversightConfig::default()).is_none());
    }

    #[test]
    fn test_text_columns_ignored() {
        let table = Table::builder().text("city", ["x", "x", "x"]).build().unwrap();
        assert!(wrong_points(&table, &OversightConfig::default()).is_none());
    }
}
