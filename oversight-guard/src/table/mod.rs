//! In-memory columnar tables.
//!
//! A [`Table`] is an ordered list of named, typed [`Column`]s of equal
//! length. Every operation returns a new table; nothing is mutated in place,
//! so a row position is only meaningful for the table it was read from.
//!
//! ```rust
//! use oversight_guard::table::Table;
//!
//! let table = Table::builder()
//!     .text("city", ["Pune", "Delhi", "Pune"])
//!     .numeric("sales", [10.0, 20.0, 5.0])
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(table.num_rows(), 3);
//! assert_eq!(table.column_names(), vec!["city", "sales"]);
//! ```

pub mod date;
mod value;

pub use date::{format_date, parse_date, DateRange, Granularity};
pub use value::Value;

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{OversightError, Result};

/// Semantic type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Numeric,
    Text,
    /// Text values that parse as dates under the caller's day-first convention.
    Date,
}

impl ColumnType {
    pub fn name(&self) -> &'static str {
        match self {
            ColumnType::Numeric => "numeric",
            ColumnType::Text => "text",
            ColumnType::Date => "date",
        }
    }
}

/// A named, typed column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            column_type,
            values,
        }
    }

    /// Creates a numeric column.
    pub fn numeric(name: impl Into<String>, values: impl IntoIterator<Item = f64>) -> Self {
        Self::new(
            name,
            ColumnType::Numeric,
            values.into_iter().map(Value::Number).collect(),
        )
    }

    /// Creates a text column.
    pub fn text<S: Into<String>>(name: impl Into<String>, values: impl IntoIterator<Item = S>) -> Self {
        Self::new(
            name,
            ColumnType::Text,
            values.into_iter().map(|s| Value::Text(s.into())).collect(),
        )
    }

    /// Creates a date column from date strings.
    pub fn date<S: Into<String>>(name: impl Into<String>, values: impl IntoIterator<Item = S>) -> Self {
        Self::new(
            name,
            ColumnType::Date,
            values.into_iter().map(|s| Value::Text(s.into())).collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_numeric(&self) -> bool {
        self.column_type == ColumnType::Numeric
    }

    /// Non-null numeric values in row order.
    pub fn numbers(&self) -> Vec<f64> {
        self.values.iter().filter_map(Value::as_f64).collect()
    }

    /// Numeric values in row order, failing on anything that is not a number or null.
    pub fn require_numbers(&self) -> Result<Vec<f64>> {
        self.values
            .iter()
            .filter(|v| !v.is_null())
            .map(|v| {
                v.as_f64()
                    .ok_or_else(|| OversightError::type_mismatch(&self.name, "number", v.type_name()))
            })
            .collect()
    }

    /// Numeric values aligned with rows, `None` for nulls, failing on anything else.
    pub fn numbers_by_row(&self) -> Result<Vec<Option<f64>>> {
        self.values
            .iter()
            .map(|v| match v {
                Value::Null => Ok(None),
                Value::Number(x) => Ok(Some(*x)),
                other => Err(OversightError::type_mismatch(&self.name, "number", other.type_name())),
            })
            .collect()
    }

    fn take(&self, rows: &[usize]) -> Column {
        Column {
            name: self.name.clone(),
            column_type: self.column_type,
            values: rows.iter().map(|&r| self.values[r].clone()).collect(),
        }
    }
}

/// An immutable, ordered collection of equally long columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    columns: Vec<Column>,
    num_rows: usize,
}

impl Table {
    /// Creates a table, checking that names are unique and lengths agree.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let num_rows = columns.first().map_or(0, Column::len);
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(OversightError::DuplicateColumn {
                    column: column.name.clone(),
                });
            }
            if column.len() != num_rows {
                return Err(OversightError::ColumnLengthMismatch {
                    column: column.name.clone(),
                    expected: num_rows,
                    found: column.len(),
                });
            }
        }
        Ok(Self { columns, num_rows })
    }

    /// Creates a table from a header, per-column types and row-major data.
    pub fn from_rows(
        header: Vec<String>,
        types: Vec<ColumnType>,
        rows: Vec<Vec<Value>>,
    ) -> Result<Self> {
        if header.len() != types.len() {
            return Err(OversightError::invalid_parameter(
                "types",
                format!("{} names but {} types", header.len(), types.len()),
            ));
        }
        let mut columns: Vec<Column> = header
            .into_iter()
            .zip(types)
            .map(|(name, column_type)| Column::new(name, column_type, Vec::with_capacity(rows.len())))
            .collect();
        for (index, row) in rows.into_iter().enumerate() {
            if row.len() != columns.len() {
                return Err(OversightError::invalid_parameter(
                    "rows",
                    format!("row {index} has {} cells, expected {}", row.len(), columns.len()),
                ));
            }
            for (column, value) in columns.iter_mut().zip(row) {
                column.values.push(value);
            }
        }
        Self::new(columns)
    }

    pub fn builder() -> TableBuilder {
        TableBuilder::default()
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Looks up a column by name.
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| OversightError::column_not_found(name))
    }

    /// Returns the cells of one row.
    pub fn row(&self, index: usize) -> Vec<&Value> {
        self.columns.iter().map(|c| &c.values[index]).collect()
    }

    /// Returns the value at `(row, column)`.
    pub fn value(&self, row: usize, column: &str) -> Result<&Value> {
        let column = self.column(column)?;
        column.values.get(row).ok_or_else(|| {
            OversightError::invalid_parameter("row", format!("{row} is out of range"))
        })
    }

    /// Builds the tuple of `columns` values for every row.
    pub fn key_tuples(&self, columns: &[String]) -> Result<Vec<Vec<Value>>> {
        let selected = columns
            .iter()
            .map(|name| self.column(name))
            .collect::<Result<Vec<_>>>()?;
        Ok((0..self.num_rows)
            .map(|row| selected.iter().map(|c| c.values[row].clone()).collect())
            .collect())
    }

    /// Gathers the given rows, in the given order.
    pub fn take_rows(&self, rows: &[usize]) -> Table {
        Table {
            columns: self.columns.iter().map(|c| c.take(rows)).collect(),
            num_rows: rows.len(),
        }
    }

    /// Keeps the rows whose mask entry is true.
    pub fn filter_rows(&self, mask: &[bool]) -> Table {
        let rows: Vec<usize> = mask
            .iter()
            .enumerate()
            .filter_map(|(i, keep)| keep.then_some(i))
            .collect();
        self.take_rows(&rows)
    }

    /// Keeps the first `k` rows.
    pub fn head(&self, k: usize) -> Table {
        let rows: Vec<usize> = (0..self.num_rows.min(k)).collect();
        self.take_rows(&rows)
    }

    /// Returns the listed columns in the listed order.
    pub fn select_columns(&self, names: &[String]) -> Result<Table> {
        let columns = names
            .iter()
            .map(|name| self.column(name).cloned())
            .collect::<Result<Vec<_>>>()?;
        Ok(Table {
            columns,
            num_rows: self.num_rows,
        })
    }

    /// Adds a column, replacing an existing one of the same name in place.
    pub fn with_column(&self, column: Column) -> Result<Table> {
        if column.len() != self.num_rows && !self.columns.is_empty() {
            return Err(OversightError::ColumnLengthMismatch {
                found: column.len(),
                expected: self.num_rows,
                column: column.name,
            });
        }
        let mut columns = self.columns.clone();
        match columns.iter().position(|c| c.name == column.name) {
            Some(index) => columns[index] = column,
            None => columns.push(column),
        }
        Table::new(columns)
    }

    /// Renames a column.
    pub fn rename_column(&self, from: &str, to: impl Into<String>) -> Result<Table> {
        let index = self
            .column_index(from)
            .ok_or_else(|| OversightError::column_not_found(from))?;
        let mut columns = self.columns.clone();
        columns[index].name = to.into();
        Table::new(columns)
    }

    /// Stacks tables with identical column names, keeping the first table's types.
    pub fn concat(tables: &[Table]) -> Result<Table> {
        let Some(first) = tables.first() else {
            return Table::new(Vec::new());
        };
        let names = first.column_names();
        let mut columns: Vec<Column> = first
            .columns
            .iter()
            .map(|c| Column::new(c.name.clone(), c.column_type, Vec::new()))
            .collect();
        for table in tables {
            if table.column_names() != names {
                return Err(OversightError::invalid_parameter(
                    "tables",
                    format!(
                        "cannot concatenate columns {:?} with {:?}",
                        table.column_names(),
                        names
                    ),
                ));
            }
            for (target, source) in columns.iter_mut().zip(&table.columns) {
                target.values.extend(source.values.iter().cloned());
            }
        }
        Table::new(columns)
    }

    /// Stable sort by one column. Nulls always sort last.
    ///
    /// Returns the sorted table and, for each new position, the row it came from.
    pub fn sort_by_column(&self, name: &str, ascending: bool) -> Result<(Table, Vec<usize>)> {
        let column = self.column(name)?;
        let mut order: Vec<usize> = (0..self.num_rows).collect();
        order.sort_by(|&a, &b| {
            let (va, vb) = (&column.values[a], &column.values[b]);
            match (va.is_null(), vb.is_null()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                _ if ascending => va.cmp(vb),
                _ => vb.cmp(va),
            }
        });
        Ok((self.take_rows(&order), order))
    }
}

/// Incremental builder for [`Table`].
#[derive(Debug, Default)]
pub struct TableBuilder {
    columns: Vec<Column>,
}

impl TableBuilder {
    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    pub fn numeric(self, name: impl Into<String>, values: impl IntoIterator<Item = f64>) -> Self {
        self.column(Column::numeric(name, values))
    }

    pub fn text<S: Into<String>>(self, name: impl Into<String>, values: impl IntoIterator<Item = S>) -> Self {
        self.column(Column::text(name, values))
    }

    pub fn date<S: Into<String>>(self, name: impl Into<String>, values: impl IntoIterator<Item = S>) -> Self {
        self.column(Column::date(name, values))
    }

    pub fn build(self) -> Result<Table> {
        Table::new(self.columns)
    }
}
