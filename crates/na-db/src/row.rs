//! Typed query results
//!
//! Every value comes back from the gateway as text (or NULL). Column lookup
//! is case-insensitive because Snowflake reports `show` columns in lower case
//! and expression columns such as `CURRENT_ROLE()` in upper case.

use crate::error::{DbError, DbResult};
use std::sync::Arc;

/// A single result row, sharing its column names with the rest of the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Option<String>>,
}

impl Row {
    /// Create a row; `values` is positionally aligned with `columns`.
    pub fn new(columns: Arc<[String]>, values: Vec<Option<String>>) -> Self {
        Self { columns, values }
    }

    /// Column names of this row
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    fn index_of(&self, column: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(column))
    }

    /// Value of `column`, or `None` when it is NULL.
    ///
    /// Fails with [`DbError::UnknownColumn`] when the row has no such column.
    pub fn get(&self, column: &str) -> DbResult<Option<&str>> {
        let index = self.index_of(column).ok_or_else(|| DbError::UnknownColumn {
            column: column.to_string(),
            available: self.columns.join(", "),
        })?;
        Ok(self.values.get(index).and_then(|v| v.as_deref()))
    }

    /// Value of `column` with NULL read as the empty string
    pub fn text(&self, column: &str) -> DbResult<&str> {
        Ok(self.get(column)?.unwrap_or(""))
    }

    /// Value at position `index`, or `None` when NULL or out of range
    pub fn value(&self, index: usize) -> Option<&str> {
        self.values.get(index).and_then(|v| v.as_deref())
    }
}

/// The result of a single statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResult {
    /// Column names, in result order
    pub columns: Arc<[String]>,
    /// Result rows
    pub rows: Vec<Row>,
    /// Number of rows the backend reported; `None` when it did not report one
    pub row_count: Option<usize>,
}

impl QueryResult {
    /// Build a result from column names and positional row data
    pub fn new<C, S>(columns: C, data: Vec<Vec<Option<String>>>) -> Self
    where
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Arc<[String]> = columns.into_iter().map(Into::into).collect();
        let rows: Vec<Row> = data
            .into_iter()
            .map(|values| Row::new(Arc::clone(&columns), values))
            .collect();
        let row_count = Some(rows.len());
        Self {
            columns,
            rows,
            row_count,
        }
    }

    /// A result with no columns and zero rows
    pub fn empty() -> Self {
        Self::new(Vec::<String>::new(), Vec::new())
    }

    /// Build a result from rows of non-null text values
    pub fn from_text_rows(columns: &[&str], data: &[&[&str]]) -> Self {
        let data = data
            .iter()
            .map(|row| row.iter().map(|v| Some((*v).to_string())).collect())
            .collect();
        Self::new(columns.iter().copied(), data)
    }

    /// Mark the row count as unknown
    pub fn with_unknown_row_count(mut self) -> Self {
        self.row_count = None;
        self
    }

    /// First row, if any
    pub fn first(&self) -> Option<&Row> {
        self.rows.first()
    }

    /// Whether the result has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
