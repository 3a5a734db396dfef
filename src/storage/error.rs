//! Storage environment errors.

use crate::storage::BlockId;

/// Storage environment errors.
#[derive(Debug)]
pub enum StorageError {
    /// The named store does not exist in the environment.
    ///
    /// `Relation::create_if_not_exists` relies on this variant to tell
    /// "must create" apart from a real failure.
    NotFound {
        /// Store name.
        name: String,
    },

    /// A store with this name already exists.
    AlreadyExists {
        /// Store name.
        name: String,
    },

    /// The name cannot be used for a store.
    InvalidName {
        name: String,
        reason: &'static str,
    },

    /// Block has never been written to the store.
    BlockNotFound(BlockId),

    /// Block id cannot be written (id 0, or past the next append position).
    InvalidBlockId(BlockId),

    /// Invalid buffer size provided to get or put.
    ///
    /// Buffers must be exactly BLOCK_SIZE bytes.
    InvalidBufferSize {
        /// Expected buffer size (BLOCK_SIZE)
        expected: usize,
        /// Actual buffer size provided
        actual: usize,
    },

    /// The table file was used before `open()` (or after `close()`).
    NotOpen {
        /// Store name.
        name: String,
    },

    /// The environment has been closed.
    EnvironmentClosed,

    /// Data corruption detected.
    ///
    /// This indicates that a store file has an invalid format or size.
    Corrupted(String),

    /// I/O error from underlying file system.
    Io(std::io::Error),
}

impl StorageError {
    /// Returns true for the "object does not exist" condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound { .. })
    }
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::NotFound { name } => write!(f, "store \"{}\" does not exist", name),
            StorageError::AlreadyExists { name } => write!(f, "store \"{}\" already exists", name),
            StorageError::InvalidName { name, reason } => {
                write!(f, "invalid store name \"{}\": {}", name.escape_debug(), reason)
            }
            StorageError::BlockNotFound(id) => write!(f, "block not found: {}", id),
            StorageError::InvalidBlockId(id) => write!(f, "invalid block id: {}", id),
            StorageError::InvalidBufferSize { expected, actual } => {
                write!(f, "invalid buffer size: expected {}, got {}", expected, actual)
            }
            StorageError::NotOpen { name } => write!(f, "store \"{}\" is not open", name),
            StorageError::EnvironmentClosed => write!(f, "storage environment is closed"),
            StorageError::Corrupted(msg) => write!(f, "data corruption: {}", msg),
            StorageError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e)
    }
}
