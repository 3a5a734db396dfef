//! Executor-specific errors.

use std::fmt;

use crate::datum::SchemaError;
use crate::heap::RelationError;

/// Errors that can occur while executing a statement.
#[derive(Debug)]
pub enum ExecError {
    /// Catalog or table operation failed.
    Relation(RelationError),

    /// A column was declared with a type that cannot be stored.
    UnsupportedColumnType { column: String, type_name: String },

    /// The statement uses a feature the executor does not implement.
    Unsupported(String),

    /// INSERT supplied a different number of values than columns.
    ValueCountMismatch { expected: usize, found: usize },

    /// An integer literal does not fit in a 32-bit INT.
    IntegerOutOfRange(i64),
}

impl fmt::Display for ExecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecError::Relation(e) => write!(f, "{}", e),
            ExecError::UnsupportedColumnType { column, type_name } => {
                write!(f, "unknown column type {} for column \"{}\"", type_name, column)
            }
            ExecError::Unsupported(msg) => write!(f, "unsupported: {}", msg),
            ExecError::ValueCountMismatch { expected, found } => {
                write!(f, "expected {} values, found {}", expected, found)
            }
            ExecError::IntegerOutOfRange(n) => write!(f, "integer {} out of range for INT", n),
        }
    }
}

impl std::error::Error for ExecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExecError::Relation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RelationError> for ExecError {
    fn from(e: RelationError) -> Self {
        ExecError::Relation(e)
    }
}

impl From<SchemaError> for ExecError {
    fn from(e: SchemaError) -> Self {
        ExecError::Relation(RelationError::Schema(e))
    }
}
