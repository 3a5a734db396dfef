//! Heap files: a table's sequence of slotted pages in one block store.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::page::SlottedPage;
use crate::storage::{BLOCK_SIZE, BlockId, BlockStore, Environment, OpenMode, StorageError};

/// A sequence of [`SlottedPage`]s backed by one named store.
///
/// Blocks are allocated densely from 1; `last` is the highest id in use and
/// is recovered from the store's entry count on open. A page returned by
/// [`get`](Self::get) or [`get_new`](Self::get_new) is a private copy; only
/// [`put`](Self::put) publishes changes to it.
pub struct HeapFile<E: Environment> {
    name: String,
    env: Arc<E>,
    store: Option<E::Store>,
    last: BlockId,
}

impl<E: Environment> HeapFile<E> {
    /// Creates a closed handle for the named file. Nothing is touched on
    /// disk until [`create`](Self::create) or [`open`](Self::open).
    pub fn new(env: Arc<E>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            env,
            store: None,
            last: BlockId::new(0),
        }
    }

    /// Returns the store name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true while the backing store is open.
    pub fn is_open(&self) -> bool {
        self.store.is_some()
    }

    /// Returns the highest block id in use (0 for a file with no blocks).
    pub fn last(&self) -> BlockId {
        self.last
    }

    /// Creates the backing store and allocates its first block.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::AlreadyExists` if a store of this name is
    /// already present; it is left untouched.
    pub fn create(&mut self) -> Result<(), StorageError> {
        self.open_store(OpenMode::CreateNew)?;
        match self.get_new() {
            Ok(page) => {
                info!("created heap file {} with block {}", self.name, page.block_id());
                Ok(())
            }
            Err(e) => {
                self.store = None;
                if let Err(remove_err) = self.env.remove_store(&self.name) {
                    warn!("failed to remove half-created {}: {}", self.name, remove_err);
                }
                Err(e)
            }
        }
    }

    /// Opens an existing backing store. Opening an open file is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the store does not exist.
    pub fn open(&mut self) -> Result<(), StorageError> {
        self.open_store(OpenMode::Existing)
    }

    fn open_store(&mut self, mode: OpenMode) -> Result<(), StorageError> {
        if self.store.is_some() {
            return Ok(());
        }
        let store = self.env.open_store(&self.name, mode)?;
        self.last = BlockId::new(store.stat()?.entry_count);
        self.store = Some(store);
        Ok(())
    }

    /// Flushes and closes the backing store. Closing a closed file is a no-op.
    pub fn close(&mut self) -> Result<(), StorageError> {
        if let Some(mut store) = self.store.take() {
            store.sync()?;
        }
        Ok(())
    }

    /// Closes the file and permanently removes its backing store.
    pub fn drop(mut self) -> Result<(), StorageError> {
        self.close()?;
        self.env.remove_store(&self.name)?;
        info!("dropped heap file {}", self.name);
        Ok(())
    }

    /// Allocates block `last + 1`, initializes it as an empty page and
    /// persists it.
    pub fn get_new(&mut self) -> Result<SlottedPage, StorageError> {
        let block_id = self.last.next();
        let page = SlottedPage::new(Box::new([0u8; BLOCK_SIZE]), block_id, true);
        self.store_mut()?.put(block_id, page.data())?;
        self.last = block_id;
        debug!("allocated block {} in {}", block_id, self.name);
        Ok(page)
    }

    /// Reads a block into a new page.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::BlockNotFound` if the block was never allocated.
    pub fn get(&self, block_id: BlockId) -> Result<SlottedPage, StorageError> {
        let mut block = Box::new([0u8; BLOCK_SIZE]);
        self.store()?.get(block_id, &mut block[..])?;
        Ok(SlottedPage::new(block, block_id, false))
    }

    /// Writes a page back under its block id.
    pub fn put(&mut self, page: &SlottedPage) -> Result<(), StorageError> {
        self.store_mut()?.put(page.block_id(), page.data())
    }

    /// Returns every block id from 1 to `last`, in order.
    pub fn block_ids(&self) -> Vec<BlockId> {
        (1..=self.last.block_num()).map(BlockId::new).collect()
    }

    fn store(&self) -> Result<&E::Store, StorageError> {
        self.store.as_ref().ok_or_else(|| StorageError::NotOpen {
            name: self.name.clone(),
        })
    }

    fn store_mut(&mut self) -> Result<&mut E::Store, StorageError> {
        self.store.as_mut().ok_or_else(|| StorageError::NotOpen {
            name: self.name.clone(),
        })
    }
}

impl<E: Environment> std::fmt::Debug for HeapFile<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeapFile")
            .field("name", &self.name)
            .field("open", &self.is_open())
            .field("last", &self.last)
            .finish()
    }
}
