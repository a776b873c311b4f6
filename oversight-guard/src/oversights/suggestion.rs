//! The suggestion data model shared by every detector.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::table::Value;

/// Kind of analytical pitfall a suggestion warns about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OversightKind {
    DuplicatesInTopk,
    TopkWhenLessThanKPresent,
    MoreThanJustTopk,
    RegressionToTheMean,
    LookingAtTailsToFindCauses,
    TopkVsOthers,
    MeanVsMedian,
    SimpsonsParadox,
    TopDownError,
    BenchmarkSetTooDifferent,
    AttributionWithHiddenNegatives,
    CalendarVsExperienceInTimeSeries,
    WrongPoints,
    WeightedMeanWithDifferentWeights,
}

impl OversightKind {
    /// Human readable name.
    pub fn name(&self) -> &'static str {
        match self {
            OversightKind::DuplicatesInTopk => "Duplicates in top-k",
            OversightKind::TopkWhenLessThanKPresent => "Top-k when less than k present",
            OversightKind::MoreThanJustTopk => "More than just top-k",
            OversightKind::RegressionToTheMean => "Regression to the mean",
            OversightKind::LookingAtTailsToFindCauses => "Looking at tails to find causes",
            OversightKind::TopkVsOthers => "Top-k vs others",
            OversightKind::MeanVsMedian => "Mean vs median",
            OversightKind::SimpsonsParadox => "Simpson's paradox",
            OversightKind::TopDownError => "Top-down error",
            OversightKind::BenchmarkSetTooDifferent => "Benchmark set too different",
            OversightKind::AttributionWithHiddenNegatives => "Attribution with hidden negatives",
            OversightKind::CalendarVsExperienceInTimeSeries => {
                "Calendar vs experience in time series"
            }
            OversightKind::WrongPoints => "Wrong points",
            OversightKind::WeightedMeanWithDifferentWeights => {
                "Weighted mean with different weights"
            }
        }
    }
}

impl fmt::Display for OversightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A result row implicated by a suggestion, 1-based in the returned table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowConfidence {
    pub row: usize,
    pub confidence_score: f64,
}

/// A column implicated by a suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnConfidence {
    pub column: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_score: Option<f64>,
}

/// A debiasing suggestion attached to a query response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub oversight: OversightKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_list: Option<Vec<RowConfidence>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub col_list: Option<Vec<ColumnConfidence>>,
    /// Query-parameter overrides that would address the oversight, e.g. `k`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_list: Option<BTreeMap<String, Value>>,
}

impl Suggestion {
    pub fn new(oversight: OversightKind, message: impl Into<String>) -> Self {
        Self {
            oversight,
            message: message.into(),
            confidence_score: None,
            row_list: None,
            col_list: None,
            change_list: None,
        }
    }

    pub fn with_confidence(mut self, confidence_score: f64) -> Self {
        self.confidence_score = Some(confidence_score);
        self
    }

    pub fn with_rows(mut self, rows: Vec<RowConfidence>) -> Self {
        self.row_list = Some(rows);
        self
    }

    /// Marks a single row with the given confidence.
    pub fn at_row(self, row: usize, confidence_score: f64) -> Self {
        self.with_rows(vec![RowConfidence {
            row,
            confidence_score,
        }])
    }

    pub fn with_columns(mut self, columns: Vec<ColumnConfidence>) -> Self {
        self.col_list = Some(columns);
        self
    }

    pub fn with_change(mut self, parameter: impl Into<String>, value: impl Into<Value>) -> Self {
        self.change_list
            .get_or_insert_with(BTreeMap::new)
            .insert(parameter.into(), value.into());
        self
    }

    pub fn is_row_level(&self) -> bool {
        self.row_list.is_some()
    }

    pub fn is_column_level(&self) -> bool {
        self.col_list.is_some()
    }

    /// Re-targets row positions after the result was reordered and truncated.
    ///
    /// `order[new] = old` (0-based). Rows that did not survive are removed;
    /// a row-level suggestion left without rows is dropped.
    pub fn remap_rows(mut self, order: &[usize]) -> Option<Self> {
        let Some(rows) = self.row_list.take() else {
            return Some(self);
        };
        let remapped: Vec<RowConfidence> = rows
            .into_iter()
            .filter_map(|entry| {
                let old = entry.row.checked_sub(1)?;
                order.iter().position(|&o| o == old).map(|new| RowConfidence {
                    row: new + 1,
                    confidence_score: entry.confidence_score,
                })
            })
            .collect();
        if remapped.is_empty() {
            None
        } else {
            self.row_list = Some(remapped);
            Some(self)
        }
    }
}

/// Applies [`Suggestion::remap_rows`] to a list.
pub fn remap_suggestions(suggestions: Vec<Suggestion>, order: &[usize]) -> Vec<Suggestion> {
    suggestions
        .into_iter()
        .filter_map(|s| s.remap_rows(order))
        .collect()
}
