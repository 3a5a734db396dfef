//! Block store backends.
//!
//! This module defines the narrow contract the heap layer needs from a
//! persistent key/value engine: one block of bytes per integer key, grouped
//! into named stores that live inside an [`Environment`].

mod file;
mod memory;

pub use file::{FileEnvironment, FileStore};
pub use memory::{MemoryEnvironment, MemoryStore};

use crate::storage::block::{BLOCK_SIZE, BlockId};
use crate::storage::error::StorageError;

/// Statistics reported by a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStat {
    /// Number of blocks held by the store. Because block ids are handed out
    /// sequentially from 1, this is also the highest id in use.
    pub entry_count: u32,
}

/// A durable mapping from [`BlockId`] to a [`BLOCK_SIZE`] byte buffer.
///
/// Stores work on caller-owned buffers and never cache. Callers that change
/// a block must `put` it back; nothing else publishes the change.
pub trait BlockStore {
    /// Reads a block into a caller-provided buffer.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::BlockNotFound` if the block was never written.
    /// Returns `StorageError::InvalidBufferSize` if `buf.len() != BLOCK_SIZE`.
    fn get(&self, block_id: BlockId, buf: &mut [u8]) -> Result<(), StorageError>;

    /// Writes a block from a caller-provided buffer, replacing any previous
    /// contents under the same id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidBlockId` for id 0 or an id the backend
    /// cannot address.
    /// Returns `StorageError::InvalidBufferSize` if `buf.len() != BLOCK_SIZE`.
    fn put(&mut self, block_id: BlockId, buf: &[u8]) -> Result<(), StorageError>;

    /// Returns store statistics.
    fn stat(&self) -> Result<StoreStat, StorageError>;

    /// Flushes pending writes to durable media.
    ///
    /// For in-memory stores this is a no-op.
    fn sync(&mut self) -> Result<(), StorageError>;
}

/// How [`Environment::open_store`] treats an existing or missing store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// The store must already exist.
    Existing,
    /// The store must not exist yet; it is created empty.
    CreateNew,
}

/// A storage environment: the process-wide handle through which named
/// stores are opened and removed.
///
/// The environment is created once, shared by every table file, and closed
/// after the last table operation. Opening stores on a closed environment
/// fails with `StorageError::EnvironmentClosed`.
pub trait Environment {
    /// The store type handed out by this environment.
    type Store: BlockStore;

    /// Opens the named store.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` for a missing store under
    /// `OpenMode::Existing`, `StorageError::AlreadyExists` for an existing
    /// one under `OpenMode::CreateNew`, and `StorageError::InvalidName` if
    /// `name` is not a valid store name.
    fn open_store(&self, name: &str, mode: OpenMode) -> Result<Self::Store, StorageError>;

    /// Permanently removes the named store.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if there is no such store and
    /// `StorageError::InvalidName` if `name` is not a valid store name.
    fn remove_store(&self, name: &str) -> Result<(), StorageError>;

    /// Closes the environment. Stores already open stay usable until dropped.
    fn close(&self);

    /// Returns true once [`close`](Self::close) has been called.
    fn is_closed(&self) -> bool;
}

/// Returns `StorageError::InvalidBufferSize` unless `len == BLOCK_SIZE`.
pub(crate) fn ensure_block_len(len: usize) -> Result<(), StorageError> {
    if len != BLOCK_SIZE {
        return Err(StorageError::InvalidBufferSize {
            expected: BLOCK_SIZE,
            actual: len,
        });
    }
    Ok(())
}

/// Checks that `name` can name a store.
///
/// Store names end up as file names, so they must be non-empty, must not be
/// `.` or `..` and must not contain path separators or NUL.
pub fn validate_store_name(name: &str) -> Result<(), StorageError> {
    let reason = if name.is_empty() {
        "name is empty"
    } else if name == "." || name == ".." {
        "name is a directory reference"
    } else if name.contains(['/', '\\']) {
        "name contains a path separator"
    } else if name.contains('\0') {
        "name contains NUL"
    } else {
        return Ok(());
    };
    Err(StorageError::InvalidName {
        name: name.to_string(),
        reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_store_name() {
        for name in ["foo", "_tables", "my table", "..x", "a.b"] {
            assert!(validate_store_name(name).is_ok(), "{name}");
        }
        for name in ["", ".", "..", "../escaped", "a/b", "a\\b", "nul\0"] {
            assert!(
                matches!(validate_store_name(name), Err(StorageError::InvalidName { .. })),
                "{name:?}"
            );
        }
    }
}
