//! Error types for the heap module.

use std::fmt;

use super::page::RecordId;
use crate::datum::SchemaError;
use crate::storage::StorageError;

/// Errors from slotted-page operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeapError {
    /// The record does not fit in the page's free space.
    NoRoom {
        /// Bytes required (payload plus any new directory entry).
        required: usize,
        /// Bytes available in free space.
        available: usize,
    },
    /// Record id was never issued by this page, or has been deleted.
    RecordNotFound(RecordId),
}

impl fmt::Display for HeapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeapError::NoRoom {
                required,
                available,
            } => {
                write!(
                    f,
                    "not enough room in block: need {} bytes, have {} available",
                    required, available
                )
            }
            HeapError::RecordNotFound(record_id) => {
                write!(f, "record {} not found or deleted", record_id)
            }
        }
    }
}

impl std::error::Error for HeapError {}

/// Errors from relation and catalog operations.
#[derive(Debug)]
pub enum RelationError {
    /// Table is not registered in the catalog.
    TableNotFound {
        /// Table name.
        name: String,
    },
    /// Table is already registered in the catalog.
    TableAlreadyExists {
        /// Table name.
        name: String,
    },
    /// Catalog tables cannot be dropped.
    SchemaTable {
        /// Table name.
        name: String,
    },
    /// Row does not match the table schema.
    Schema(SchemaError),
    /// Slotted-page error.
    Heap(HeapError),
    /// Storage environment error.
    Storage(StorageError),
}

impl fmt::Display for RelationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationError::TableNotFound { name } => {
                write!(f, "table \"{}\" does not exist", name)
            }
            RelationError::TableAlreadyExists { name } => {
                write!(f, "table \"{}\" already exists", name)
            }
            RelationError::SchemaTable { name } => {
                write!(f, "cannot drop schema table \"{}\"", name)
            }
            RelationError::Schema(e) => write!(f, "schema error: {}", e),
            RelationError::Heap(e) => write!(f, "heap error: {}", e),
            RelationError::Storage(e) => write!(f, "storage error: {}", e),
        }
    }
}

impl std::error::Error for RelationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RelationError::Schema(e) => Some(e),
            RelationError::Heap(e) => Some(e),
            RelationError::Storage(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SchemaError> for RelationError {
    fn from(e: SchemaError) -> Self {
        RelationError::Schema(e)
    }
}

impl From<HeapError> for RelationError {
    fn from(e: HeapError) -> Self {
        RelationError::Heap(e)
    }
}

impl From<StorageError> for RelationError {
    fn from(e: StorageError) -> Self {
        RelationError::Storage(e)
    }
}
