//! Top-down error.
//!
//! Two slices that look alike overall can still differ widely inside the
//! subgroups of another dimension; the overall similarity then hides the
//! variation a finer grouping would show.

use std::collections::HashMap;

use super::comparison::{grouped_pairs, ComparedSlices};
use super::runner::{DetectionInput, OversightDetector};
use super::similarity::{relation, similarity};
use super::{OversightKind, RowConfidence, Suggestion};
use crate::aspects::{columns_with, SummaryOperator};
use crate::config::OversightConfig;
use crate::error::Result;
use crate::table::{Table, Value};

/// Flags pairs that are similar overall but dissimilar in some subgroup of a candidate dimension.
pub fn top_down_error(
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

        // largest relation between complete subgroup pairs per dimension tuple
        let mut widest: HashMap<&[Value], f64> = HashMap::new();
        for pair in split.iter().filter(|p| p.is_complete()) {
            let r = relation(pair.first.unwrap_or(0.0), pair.second.unwrap_or(0.0));
            let entry = widest.entry(&pair.prefix[..dimensions.len()]).or_default();
            *entry = entry.max(r);
        }

        let rows: Vec<RowConfidence> = initial
            .iter()
            .filter(|pair| pair.is_complete())
            .filter(|pair| {
                let overall = similarity(pair.first.unwrap_or(0.0), pair.second.unwrap_or(0.0));
                let split_similarity = 1.0 - widest.get(pair.prefix.as_slice()).copied().unwrap_or(0.0);
                overall >= config.top_down_similarity_threshold
                    && split_similarity <= config.top_down_dissimilarity_threshold
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
                    OversightKind::TopDownError,
                    format!("Some values are similar here but will vary if we add {candidate} for grouping"),
                )
                .with_rows(rows),
            );
        }
    }
    Ok(suggestions)
}

#[derive(Debug, Clone, Copy)]
pub struct TopDownError<'a> {
    frame: &'a Table,
    slices: &'a ComparedSlices,
}

impl<'a> TopDownError<'a> {
    pub fn new(frame: &'a Table, slices: &'a ComparedSlices) -> Self {
        Self { frame, slices }
    }
}

impl OversightDetector for TopDownError<'_> {
    fn kind(&self) -> OversightKind {
        OversightKind::TopDownError
    }

    fn detect(&self, input: &DetectionInput<'_>) -> Result<Vec<Suggestion>> {
        let dimensions: Vec<String> = input
            .query
            .dimensions
            .iter()
            .filter(|d| **d != self.slices.column)
            .cloned()
            .collect();
        top_down_error(
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

    fn create_test_slices() -> ComparedSlices {
        ComparedSlices::new("team", Value::from("A"), Value::from("B")).with_candidates(&["team", "season"])
    }

    #[test]
    fn test_hidden_variation_flagged() {
        // both teams total 100, but not in the same seasons
        let frame = Table::builder()
            .text("team", ["A", "A", "B", "B"])
            .text("season", ["s1", "s2", "s1", "s2"])
            .numeric("wins", [90.0, 10.0, 20.0, 80.0])
            .build()
            .unwrap();
        let suggestions = top_down_error(
            &frame,
            &[],
            "wins",
            Some(SummaryOperator::Sum),
            &create_test_slices(),
            &OversightConfig::default(),
        )
        .unwrap();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(
            suggestions[0].message,
            "Some values are similar here but will vary if we add season for grouping"
        );
        assert_eq!(suggestions[0].row_list.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn test_uniform_split_is_silent() {
        let frame = Table::builder()
            .text("team", ["A", "A", "B", "B"])
            .text("season", ["s1", "s2", "s1", "s2"])
            .numeric("wins", [50.0, 50.0, 51.0, 49.0])
            .build()
            .unwrap();
        let suggestions = top_down_error(
            &frame,
            &[],
            "wins",
            Some(SummaryOperator::Sum),
            &create_test_slices(),
            &OversightConfig::default(),
        )
        .unwrap();
        assert!(suggestions.is_empty());
    }

    #[test]
    fn test_different_overall_is_silent() {
        let frame = Table::builder()
            .text("team", ["A", "A", "B", "B"])
            .text("season", ["s1", "s2", "s1", "s2"])
            .numeric("wins", [90.0, 10.0, 5.0, 5.0])
            .build()
            .unwrap();
        let suggestions = top_down_error(
            &frame,
            &[],
            "wins",
            Some(SummaryOperator::Sum),
            &create_test_slices(),
            &OversightConfig::default(),
        )
        .unwrap();
        assert!(suggestions.is_empty());
    }
}
