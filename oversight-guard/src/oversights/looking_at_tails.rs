//! Looking at tails to find causes.
//!
//! A column whose values look the same inside and outside the top k cannot
//! explain why those rows are on top. Numeric columns compare spreads, text
//! and date columns compare category frequencies.

use std::collections::BTreeMap;

use super::runner::{DetectionInput, OversightDetector};
use super::similarity::{angle_degrees, cosine, pstdev};
use super::{ColumnConfidence, OversightKind, Suggestion};
use crate::config::OversightConfig;
use crate::error::Result;
use crate::table::{Column, ColumnType, Table, Value};

/// Checks every non-metric column of the full ranking, split at `k`.
pub fn looking_at_tails(
    ranking: &Table,
    k: i64,
    metric: &str,
    config: &OversightConfig,
) -> Result<Option<Suggestion>> {
    let rows = ranking.num_rows();
    if k <= 0 || k as usize >= rows {
        return Ok(None);
    }
    let k = k as usize;

    let mut flagged = Vec::new();
    for column in ranking.columns().iter().filter(|c| c.name != metric) {
        let confidence = match column.column_type {
            ColumnType::Numeric => numeric_similarity(column, k, config.tails_std_ratio_threshold)?,
            ColumnType::Text | ColumnType::Date => {
                categorical_similarity(column, k, config.tails_angle_degrees)
            }
        };
        if let Some(confidence_score) = confidence {
            flagged.push(ColumnConfidence {
                column: column.name.clone(),
                confidence_score: Some(confidence_score),
            });
        }
    }
    if flagged.is_empty() {
        return Ok(None);
    }

    let names: Vec<String> = flagged.iter().map(|c| format!("'{}'", c.column)).collect();
    Ok(Some(
        Suggestion::new(
            OversightKind::LookingAtTailsToFindCauses,
            format!(
                "Values in top-k rows of columns - {} are similar for other rows also",
                names.join(", ")
            ),
        )
        .with_columns(flagged),
    ))
}

/// Ratio of the smaller to the larger population standard deviation.
fn numeric_similarity(column: &Column, k: usize, threshold: f64) -> Result<Option<f64>> {
    let values = column.numbers_by_row()?;
    let (top, rest) = values.split_at(k);
    let top: Vec<f64> = top.iter().flatten().copied().collect();
    let rest: Vec<f64> = rest.iter().flatten().copied().collect();
    if top.is_empty() || rest.is_empty() {
        return Ok(None);
    }
    let (a, b) = (pstdev(&top), pstdev(&rest));
    let largest = a.max(b);
    if largest == 0.0 {
        return Ok(None);
    }
    let ratio = a.min(b) / largest;
    Ok((ratio >= threshold).then_some(ratio))
}

/// Cosine of the category-frequency vectors when they are within `max_angle`.
fn categorical_similarity(column: &Column, k: usize, max_angle: f64) -> Option<f64> {
    let mut frequencies: BTreeMap<&Value, (f64, f64)> = BTreeMap::new();
    for (row, value) in column.values.iter().enumerate() {
        let entry = frequencies.entry(value).or_default();
        if row < k {
            entry.0 += 1.0;
        } else {
            entry.1 += 1.0;
        }
    }
    // an identifier column has nothing to compare
    if frequencies.len() == column.len() {
        return None;
    }
    let (top, rest): (Vec<f64>, Vec<f64>) = frequencies.values().copied().unzip();
    let similarity = cosine(&top, &rest)?;
    (angle_degrees(&top, &rest) <= max_angle).then_some(similarity)
}

#[derive(Debug, Clone, Copy)]
pub struct LookingAtTails {
    k: i64,
}

impl LookingAtTails {
    pub fn new(k: i64) -> Self {
        Self { k }
    }
}

impl OversightDetector for LookingAtTails {
    fn kind(&self) -> OversightKind {
        OversightKind::LookingAtTailsToFindCauses
    }

    fn detect(&self, input: &DetectionInput<'_>) -> Result<Vec<Suggestion>> {
        let ranking = input.full_result.unwrap_or(input.result);
        let metric = input.query.metric_name()?;
        Ok(looking_at_tails(ranking, self.k, metric, input.config)?
            .into_iter()
            .collect())
    }
}
