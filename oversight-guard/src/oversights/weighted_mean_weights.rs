//! Weighted mean with different weights.
//!
//! A non-negative column summing to exactly 1 or 100 is most likely a
//! proportion or a percentage, which makes it a candidate weight for the
//! metric's mean.

use super::runner::{DetectionInput, OversightDetector};
use super::{ColumnConfidence, OversightKind, Suggestion};
use crate::error::Result;
use crate::table::Table;

const WEIGHT_TOTALS: [f64; 2] = [1.0, 100.0];
const TOTAL_TOLERANCE: f64 = 1e-9;

/// Lists numeric columns, other than the metric and the current weight, that look like weights.
pub fn weighted_mean_weights(table: &Table, metric: &str, weight: Option<&str>) -> Option<Suggestion> {
    let candidates: Vec<&str> = table
        .columns()
        .iter()
        .filter(|c| c.is_numeric())
        .filter(|c| c.name != metric && Some(c.name.as_str()) != weight)
        .filter(|c| {
            let values = c.numbers();
            let non_negative = values.iter().all(|v| *v >= 0.0);
            let total: f64 = values.iter().sum();
            !values.is_empty()
                && non_negative
                && WEIGHT_TOTALS.iter().any(|t| (total - t).abs() < TOTAL_TOLERANCE)
        })
        .map(|c| c.name.as_str())
        .collect();

    if candidates.is_empty() {
        return None;
    }
    let listed: Vec<String> = candidates.iter().map(|c| format!("'{c}'")).collect();
    Some(
        Suggestion::new(
            OversightKind::WeightedMeanWithDifferentWeights,
            format!(
                "Consider using [{}] as the weights for computing weighted mean.",
                listed.join(", ")
            ),
        )
        .with_columns(
            candidates
                .into_iter()
                .map(|column| ColumnConfidence {
                    column: column.to_string(),
                    confidence_score: None,
                })
                .collect(),
        ),
    )
}

/// Looks for alternative weights in the table handed to the intent.
#[derive(Debug, Clone, Default)]
pub struct WeightedMeanWeights {
    weight: Option<String>,
}

impl WeightedMeanWeights {
    pub fn new() -> Self {
        Self::default()
    }

    /// Excludes the weight the query already uses.
    pub fn excluding(weight: impl Into<String>) -> Self {
        Self {
            weight: Some(weight.into()),
        }
    }
}

impl OversightDetector for WeightedMeanWeights {
    fn kind(&self) -> OversightKind {
        OversightKind::WeightedMeanWithDifferentWeights
    }

    fn detect(&self, input: &DetectionInput<'_>) -> Result<Vec<Suggestion>> {
        let metric = input.query.metric_name()?;
        Ok(weighted_mean_weights(input.table, metric, self.weight.as_deref())
            .into_iter()
            .collect())
    }
}
