//! Pairing of compared slices inside a grouped table.
//!
//! Slice-compare and time-compare results are grouped by the dimensions
//! followed by the compared column, so the row for each slice of one
//! dimension tuple sits next to the other's. The comparison detectors walk
//! those pairs.

use crate::aspects::{columns_with, group_by, project_columns, SummaryOperator};
use crate::config::OversightConfig;
use crate::error::Result;
use crate::table::{Table, Value};

/// The two sides of a comparison and the columns that may split it further.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparedSlices {
    /// Column holding the slice values.
    pub column: String,
    pub slice1: Value,
    pub slice2: Value,
    /// Dimensions that may be added to the grouping, the compared column excluded.
    pub candidates: Vec<String>,
}

impl ComparedSlices {
    pub fn new(column: impl Into<String>, slice1: Value, slice2: Value) -> Self {
        Self {
            column: column.into(),
            slice1,
            slice2,
            candidates: Vec::new(),
        }
    }

    pub fn with_candidates<S: AsRef<str>>(mut self, dimensions: &[S]) -> Self {
        self.candidates = dimensions
            .iter()
            .map(|d| d.as_ref().to_string())
            .filter(|d| *d != self.column)
            .collect();
        self
    }
}

/// The rows of one dimension tuple in a grouped comparison table.
#[derive(Debug, Clone, PartialEq)]
pub struct SlicePair {
    pub prefix: Vec<Value>,
    /// 0-based positions in the grouped table.
    pub rows: Vec<usize>,
    /// Metric value of the `slice1` row, if present.
    pub first: Option<f64>,
    /// Metric value of the other row, if present.
    pub second: Option<f64>,
}

impl SlicePair {
    /// Both slices are present.
    pub fn is_complete(&self) -> bool {
        self.first.is_some() && self.second.is_some()
    }

    /// `first - second`; a lone slice counts against an absent zero.
    pub fn difference(&self) -> f64 {
        self.first.unwrap_or(0.0) - self.second.unwrap_or(0.0)
    }

    /// 1-based rows as they appear in the returned table.
    pub fn result_rows(&self) -> impl Iterator<Item = usize> + '_ {
        self.rows.iter().map(|r| r + 1)
    }
}

/// Walks a table already grouped by `prefix` followed by `column`.
pub fn pair_slices(
    grouped: &Table,
    prefix: &[String],
    column: &str,
    metric: &str,
    slice1: &Value,
) -> Result<Vec<SlicePair>> {
    let keys = grouped.key_tuples(prefix)?;
    let slices = &grouped.column(column)?.values;
    let values = &grouped.column(metric)?.values;

    let mut pairs: Vec<SlicePair> = Vec::new();
    for (row, key) in keys.into_iter().enumerate() {
        if pairs.last().map_or(true, |last| last.prefix != key) {
            pairs.push(SlicePair {
                prefix: key,
                rows: Vec::new(),
                first: None,
                second: None,
            });
        }
        let Some(pair) = pairs.last_mut() else { continue };
        let value = values[row].as_f64().unwrap_or(0.0);
        pair.rows.push(row);
        if &slices[row] == slice1 {
            pair.first = Some(value);
        } else {
            pair.second = Some(value);
        }
    }
    Ok(pairs)
}

/// Projects `frame`, groups it by `prefix + [column]` and pairs the slices.
pub fn grouped_pairs(
    frame: &Table,
    prefix: &[String],
    metric: &str,
    operator: SummaryOperator,
    slices: &ComparedSlices,
    config: &OversightConfig,
) -> Result<Vec<SlicePair>> {
    let grouping = columns_with(prefix, &[slices.column.as_str()]);
    let projected = project_columns(frame, &columns_with(&grouping, &[metric]))?;
    let grouped = group_by(&projected, &grouping, Some(operator), config)?;
    pair_slices(&grouped.table, prefix, &slices.column, metric, &slices.slice1)
}
