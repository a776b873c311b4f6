//! Simpson's paradox.
//!
//! One slice can beat the other overall and yet lose in most subgroups once
//! another dimension is added to the grouping. For every candidate dimension
//! the direction of the comparison is recomputed per subgroup; when the share
//! of subgroups agreeing with the overall direction moves by at least the
//! configured number of percentage points, the pair of rows is flagged.

use std::collections::HashMap;

use super::comparison::{grouped_pairs, ComparedSlices};
use super::runner::{DetectionInput, OversightDetector};
use super::{OversightKind, RowConfidence, Suggestion};
use crate::aspects::{columns_with, SummaryOperator};
use crate::config::OversightConfig;
use crate::error::Result;
use crate::table::{Table, Value};

/// Checks each candidate dimension, returning one suggestion per dimension that flips a pair.
///
/// `frame` is the filtered table the comparison was grouped from.
pub fn simpsons_paradox(
    frame: &Table,
    dimensions: &[String],
    metric: &str,
    operator: Option<SummaryOperator>,
    slices: &ComparedSlices,
    config: &OversightConfig,
) -> Result<Vec<Suggestion>> {
    let Some(operator) = operator else {
        return Ok(Vec::new());
    };
    let initial = grouped_pairs(frame, dimensions, metric, operator, slices, config)?;

    let mut suggestions = Vec::new();
    for candidate in slices.candidates.iter().filter(|c| !dimensions.contains(c)) {
        let prefix = columns_with(dimensions, &[candidate.as_str()]);
        let split = grouped_pairs(frame, &prefix, metric, operator, slices, config)?;

        // (positive differences, subgroups) per initial dimension tuple
        let mut dominance: HashMap<&[Value], (usize, usize)> = HashMap::new();
        for pair in &split {
            let entry = dominance.entry(&pair.prefix[..dimensions.len()]).or_default();
            entry.1 += 1;
            if pair.difference() > 0.0 {
                entry.0 += 1;
            }
        }

        let rows: Vec<RowConfidence> = initial
            .iter()
            .filter(|pair| pair.is_complete())
            .filter(|pair| {
                let Some(&(positive, total)) = dominance.get(pair.prefix.as_slice()) else {
                    return false;
                };
                let new_percent = 100.0 * positive as f64 / total as f64;
                let initial_percent = if pair.difference() > 0.0 { 100.0 } else { 0.0 };
                (initial_percent - new_percent).abs() >= config.simpsons_dominant_percent_threshold
            })
            .flat_map(|pair| pair.result_rows())
            .map(|row| RowConfidence {
                row,
                confidence_score: 100.0,
            })
            .collect();

        if !rows.is_empty() {
            suggestions.push(
                Suggestion::new(
                    OversightKind::SimpsonsParadox,
                    format!(
                        "the relation between slices might changed a lot if you will consider {candidate} in grouping."
                    ),
                )
                .with_rows(rows),
            );
        }
    }
    Ok(suggestions)
}

/// Runs [`simpsons_paradox`] over a comparison frame prepared by the intent.
#[derive(Debug, Clone, Copy)]
pub struct SimpsonsParadox<'a> {
    frame: &'a Table,
    slices: &'a ComparedSlices,
}

impl<'a> SimpsonsParadox<'a> {
    pub fn new(frame: &'a Table, slices: &'a ComparedSlices) -> Self {
        Self { frame, slices }
    }
}

impl OversightDetector for SimpsonsParadox<'_> {
    fn kind(&self) -> OversightKind {
        OversightKind::SimpsonsParadox
    }

    fn detect(&self, input: &DetectionInput<'_>) -> Result<Vec<Suggestion>> {
        let dimensions: Vec<String> = input
            .query
            .dimensions
            .iter()
            .filter(|d| **d != self.slices.column)
            .cloned()
            .collect();
        simpsons_paradox(
            self.frame,
            &dimensions,
            input.query.metric_name()?,
            input.query.summary_operator,
            self.slices,
            input.config,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Men average higher overall, women higher in both departments.
    fn create_test_frame() -> Table {
        Table::builder()
            .text("gender", ["M", "M", "M", "M", "F", "M", "F", "F", "F", "F"])
            .text("dept", ["X", "X", "X", "X", "X", "Y", "Y", "Y", "Y", "Y"])
            .numeric("score", [90.0, 90.0, 90.0, 90.0, 95.0, 20.0, 25.0, 25.0, 25.0, 25.0])
            .build()
            .unwrap()
    }

    fn create_test_slices() -> ComparedSlices {
        ComparedSlices::new("gender", Value::from("M"), Value::from("F")).with_candidates(&["gender", "dept"])
    }

    #[test]
    fn test_reversal_is_flagged() {
        let suggestions = simpsons_paradox(
            &create_test_frame(),
            &[],
            "score",
            Some(SummaryOperator::Mean),
            &create_test_slices(),
            &OversightConfig::default(),
        )
        .unwrap();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(
            suggestions[0].message,
            "the relation between slices might changed a lot if you will consider dept in grouping."
        );
        let rows: Vec<usize> = suggestions[0].row_list.as_ref().unwrap().iter().map(|r| r.row).collect();
        assert_eq!(rows, vec![1, 2]);
    }

    #[test]
    fn test_consistent_direction_is_silent() {
        let frame = Table::builder()
            .text("gender", ["M", "F", "M", "F"])
            .text("dept", ["X", "X", "Y", "Y"])
            .numeric("score", [10.0, 5.0, 10.0, 5.0])
            .build()
            .unwrap();
        let suggestions = simpsons_paradox(
            &frame,
            &[],
            "score",
            Some(SummaryOperator::Sum),
            &create_test_slices(),
            &OversightConfig::default(),
        )
        .unwrap();
        assert!(suggestions.is_empty());
    }

    #[test]
    fn test_requires_operator() {
        let suggestions = simpsons_paradox(
            &create_test_frame(),
            &[],
            "score",
            None,
            &create_test_slices(),
            &OversightConfig::default(),
        )
        .unwrap();
        assert!(suggestions.is_empty());
    }
}
