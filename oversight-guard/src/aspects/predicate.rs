//! Row predicates used to slice tables.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{OversightError, Result};
use crate::table::{Table, Value};

/// Comparison applied by a [`Predicate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Filter {
    EqualTo,
    NotEqualTo,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
    In,
    NotIn,
}

impl Filter {
    /// User-facing name, as accepted by [`FromStr`].
    pub fn name(&self) -> &'static str {
        match self {
            Filter::EqualTo => "Equal to",
            Filter::NotEqualTo => "Not equal to",
            Filter::LessThan => "Less than",
            Filter::LessThanEqual => "Less than equal to",
            Filter::GreaterThan => "Greater than",
            Filter::GreaterThanEqual => "Greater than equal to",
            Filter::In => "In",
            Filter::NotIn => "Not In",
        }
    }

    pub fn takes_set(&self) -> bool {
        matches!(self, Filter::In | Filter::NotIn)
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Filter {
    type Err = OversightError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "equal to" => Ok(Filter::EqualTo),
            "not equal to" => Ok(Filter::NotEqualTo),
            "less than" => Ok(Filter::LessThan),
            "less than equal to" => Ok(Filter::LessThanEqual),
            "greater than" => Ok(Filter::GreaterThan),
            "greater than equal to" => Ok(Filter::GreaterThanEqual),
            "in" => Ok(Filter::In),
            "not in" => Ok(Filter::NotIn),
            _ => Err(OversightError::UnknownFilter(s.to_string())),
        }
    }
}

/// Right-hand side of a predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Operand {
    Scalar(Value),
    Set(Vec<Value>),
}

/// `(column, filter, operand)`; a list of predicates is AND-ed.
///
/// Deserializing checks the operand shape like [`Predicate::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPredicate")]
pub struct Predicate {
    pub column: String,
    pub filter: Filter,
    pub operand: Operand,
}

#[derive(Deserialize)]
struct RawPredicate {
    column: String,
    filter: Filter,
    operand: Operand,
}

impl TryFrom<RawPredicate> for Predicate {
    type Error = OversightError;

    fn try_from(raw: RawPredicate) -> Result<Self> {
        Predicate::new(raw.column, raw.filter, raw.operand)
    }
}

impl Predicate {
    /// Creates a predicate, checking that the operand shape fits the filter.
    pub fn new(column: impl Into<String>, filter: Filter, operand: Operand) -> Result<Self> {
        let predicate = Self {
            column: column.into(),
            filter,
            operand,
        };
        predicate.check_shape()?;
        Ok(predicate)
    }

    /// `IN`/`NOT IN` take a set, every other filter a single value.
    pub fn check_shape(&self) -> Result<()> {
        let shape_ok = match self.operand {
            Operand::Set(_) => self.filter.takes_set(),
            Operand::Scalar(_) => !self.filter.takes_set(),
        };
        if !shape_ok {
            return Err(OversightError::invalid_parameter(
                "operand",
                format!(
                    "'{}' on column '{}' got the wrong operand shape",
                    self.filter, self.column
                ),
            ));
        }
        Ok(())
    }

    pub fn equal_to(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::scalar(column, Filter::EqualTo, value)
    }

    pub fn not_equal_to(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::scalar(column, Filter::NotEqualTo, value)
    }

    pub fn less_than(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::scalar(column, Filter::LessThan, value)
    }

    pub fn greater_than(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::scalar(column, Filter::GreaterThan, value)
    }

    pub fn is_in<V: Into<Value>>(column: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        Self::set(column, Filter::In, values)
    }

    pub fn not_in<V: Into<Value>>(column: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        Self::set(column, Filter::NotIn, values)
    }

    fn scalar(column: impl Into<String>, filter: Filter, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            filter,
            operand: Operand::Scalar(value.into()),
        }
    }

    fn set<V: Into<Value>>(column: impl Into<String>, filter: Filter, values: impl IntoIterator<Item = V>) -> Self {
        Self {
            column: column.into(),
            filter,
            operand: Operand::Set(values.into_iter().map(Into::into).collect()),
        }
    }

    /// Evaluates the predicate against one cell.
    ///
    /// Comparisons are typed: a number never equals its text spelling and
    /// ordering filters never match across types or against nulls.
    pub fn matches(&self, cell: &Value) -> bool {
        match (&self.filter, &self.operand) {
            (Filter::In, Operand::Set(values)) => values.iter().any(|v| cell.compare(v) == Some(Ordering::Equal)),
            (Filter::NotIn, Operand::Set(values)) => {
                !values.iter().any(|v| cell.compare(v) == Some(Ordering::Equal))
            }
            (filter, Operand::Scalar(operand)) => {
                let ordering = cell.compare(operand);
                match filter {
                    Filter::EqualTo => ordering == Some(Ordering::Equal),
                    Filter::NotEqualTo => ordering != Some(Ordering::Equal),
                    Filter::LessThan => ordering == Some(Ordering::Less),
                    Filter::LessThanEqual => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
                    Filter::GreaterThan => ordering == Some(Ordering::Greater),
                    Filter::GreaterThanEqual => {
                        matches!(ordering, Some(Ordering::Greater | Ordering::Equal))
                    }
                    Filter::In | Filter::NotIn => false,
                }
            }
            (_, Operand::Set(_)) => false,
        }
    }

    /// Evaluates the predicate for every row of `table`.
    ///
    /// A predicate built by hand with the wrong operand shape is rejected here.
    pub fn mask(&self, table: &Table) -> Result<Vec<bool>> {
        self.check_shape()?;
        let column = table.column(&self.column)?;
        Ok(column.values.iter().map(|cell| self.matches(cell)).collect())
    }
}
