//! Summary operators and the reductions they dispatch to.
//!
//! [`SummaryOperator::reduce`] is the only place an operator is mapped to a
//! reduction; grouping, detectors and intents all go through it.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{OversightError, Result};
use crate::table::{ColumnType, Value};

/// Reduction applied to every non-dimension column of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SummaryOperator {
    Sum,
    Mean,
    Median,
    Count,
    Max,
    Min,
    Std,
    Var,
    First,
    Last,
    Distinct,
    ProportionOfSum,
    ProportionOfCount,
}

impl SummaryOperator {
    /// User-facing name, as accepted by [`FromStr`].
    pub fn name(&self) -> &'static str {
        match self {
            SummaryOperator::Sum => "Sum",
            SummaryOperator::Mean => "Mean",
            SummaryOperator::Median => "Median",
            SummaryOperator::Count => "Count",
            SummaryOperator::Max => "Maximum",
            SummaryOperator::Min => "Minimum",
            SummaryOperator::Std => "Standard Deviation",
            SummaryOperator::Var => "Variance",
            SummaryOperator::First => "First",
            SummaryOperator::Last => "Last",
            SummaryOperator::Distinct => "Count Distinct",
            SummaryOperator::ProportionOfSum => "Proportion Of Sum",
            SummaryOperator::ProportionOfCount => "Proportion Of Count",
        }
    }

    pub fn is_proportion(&self) -> bool {
        matches!(
            self,
            SummaryOperator::ProportionOfSum | SummaryOperator::ProportionOfCount
        )
    }

    /// Whether the reduction needs numeric input.
    pub fn requires_numbers(&self) -> bool {
        matches!(
            self,
            SummaryOperator::Sum
                | SummaryOperator::Mean
                | SummaryOperator::Median
                | SummaryOperator::Std
                | SummaryOperator::Var
                | SummaryOperator::ProportionOfSum
        )
    }

    /// Type of the reduced column given the input column's type.
    pub fn output_type(&self, input: ColumnType) -> ColumnType {
        match self {
            SummaryOperator::Max
            | SummaryOperator::Min
            | SummaryOperator::First
            | SummaryOperator::Last => input,
            _ => ColumnType::Numeric,
        }
    }

    /// Reduces one group's values of one column.
    ///
    /// Nulls are skipped. Proportion operators return the raw sum or count;
    /// normalising by the grand total is done by the caller, which sees every
    /// group.
    pub fn reduce(&self, column: &str, values: &[&Value]) -> Result<Value> {
        let present: Vec<&Value> = values.iter().copied().filter(|v| !v.is_null()).collect();

        if self.requires_numbers() {
            let numbers = present
                .iter()
                .map(|v| {
                    v.as_f64()
                        .ok_or_else(|| OversightError::type_mismatch(column, "number", v.type_name()))
                })
                .collect::<Result<Vec<f64>>>()?;
            return Ok(match self {
                SummaryOperator::Sum | SummaryOperator::ProportionOfSum => {
                    Value::Number(numbers.iter().sum())
                }
                SummaryOperator::Mean => mean(&numbers).into(),
                SummaryOperator::Median => median(&numbers).into(),
                SummaryOperator::Std => sample_variance(&numbers).map(f64::sqrt).into(),
                SummaryOperator::Var => sample_variance(&numbers).into(),
                _ => unreachable!("non-numeric operators are handled below"),
            });
        }

        Ok(match self {
            SummaryOperator::Count | SummaryOperator::ProportionOfCount => {
                Value::Number(present.len() as f64)
            }
            SummaryOperator::Distinct => {
                let distinct: HashSet<&Value> = present.iter().copied().collect();
                Value::Number(distinct.len() as f64)
            }
            SummaryOperator::Max => present.iter().max().map_or(Value::Null, |v| (*v).clone()),
            SummaryOperator::Min => present.iter().min().map_or(Value::Null, |v| (*v).clone()),
            SummaryOperator::First => present.first().map_or(Value::Null, |v| (*v).clone()),
            SummaryOperator::Last => present.last().map_or(Value::Null, |v| (*v).clone()),
            _ => unreachable!("numeric operators are handled above"),
        })
    }
}

impl fmt::Display for SummaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SummaryOperator {
    type Err = OversightError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase();
        let operator = match normalized.as_str() {
            "sum" => SummaryOperator::Sum,
            "mean" | "average" => SummaryOperator::Mean,
            "median" => SummaryOperator::Median,
            "count" => SummaryOperator::Count,
            "maximum" | "max" => SummaryOperator::Max,
            "minimum" | "min" => SummaryOperator::Min,
            "standard deviation" | "std" => SummaryOperator::Std,
            "variance" | "var" => SummaryOperator::Var,
            "first" => SummaryOperator::First,
            "last" => SummaryOperator::Last,
            "count distinct" | "distinct" => SummaryOperator::Distinct,
            "proportion of sum" => SummaryOperator::ProportionOfSum,
            "proportion of count" => SummaryOperator::ProportionOfCount,
            _ => return Err(OversightError::UnknownSummaryOperator(s.to_string())),
        };
        Ok(operator)
    }
}

pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

pub(crate) fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    Some(if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    })
}

/// Variance with `n - 1` in the denominator; undefined below two values.
pub(crate) fn sample_variance(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mu = mean(values)?;
    let squares: f64 = values.iter().map(|x| (x - mu).powi(2)).sum();
    Some(squares / (values.len() - 1) as f64)
}
