//! Statement results.

use std::fmt;

use crate::datum::{ColumnAttributes, ColumnNames, Row};

/// The outcome of a successfully executed statement.
///
/// DDL statements only carry a message; statements returning rows also
/// carry the column names, their attributes and the rows themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResult {
    pub column_names: Option<ColumnNames>,
    pub column_attributes: Option<ColumnAttributes>,
    pub rows: Option<Vec<Row>>,
    pub message: String,
}

impl QueryResult {
    /// Creates a result with only a status message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            column_names: None,
            column_attributes: None,
            rows: None,
            message: message.into(),
        }
    }

    /// Creates a result carrying rows, with the standard row-count message.
    pub fn rows(
        column_names: ColumnNames,
        column_attributes: ColumnAttributes,
        rows: Vec<Row>,
    ) -> Self {
        let message = format!("successfully returned {} rows", rows.len());
        Self {
            column_names: Some(column_names),
            column_attributes: Some(column_attributes),
            rows: Some(rows),
            message,
        }
    }

    /// Returns the number of rows, or 0 for message-only results.
    pub fn row_count(&self) -> usize {
        self.rows.as_ref().map_or(0, Vec::len)
    }
}

/// Renders a header line, a rule with one `----------+` per column, one line
/// per row and the status message.
impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(names) = &self.column_names {
            for name in names {
                write!(f, "{} ", name)?;
            }
            writeln!(f)?;
            f.write_str("+")?;
            for _ in names {
                f.write_str("----------+")?;
            }
            writeln!(f)?;
            for row in self.rows.iter().flatten() {
                for name in names {
                    match row.get(name) {
                        Some(value) => write!(f, "{} ", value)?,
                        None => f.write_str("??? ")?,
                    }
                }
                writeln!(f)?;
            }
        }
        f.write_str(&self.message)
    }
}
