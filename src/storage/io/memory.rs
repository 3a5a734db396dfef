//! In-memory storage environment.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use super::{BlockStore, Environment, OpenMode, StoreStat, ensure_block_len, validate_store_name};
use crate::storage::block::{BLOCK_SIZE, Block, BlockId};
use crate::storage::error::StorageError;

/// Raw block data of one store: BlockId -> [u8; BLOCK_SIZE]
type BlockMap = BTreeMap<BlockId, Box<Block>>;

/// In-memory storage environment for testing and the `--memory` shell.
///
/// Every named store is a block map shared between the environment and the
/// store handles opened on it, so reopening a store sees earlier writes.
/// Nothing is persistent; all data is lost when the environment is dropped.
#[derive(Default)]
pub struct MemoryEnvironment {
    stores: Mutex<HashMap<String, Arc<Mutex<BlockMap>>>>,
    closed: AtomicBool,
}

impl MemoryEnvironment {
    /// Creates a new empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the names of all stores, sorted.
    pub fn store_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.stores.lock().keys().cloned().collect();
        names.sort();
        names
    }

    fn ensure_open(&self) -> Result<(), StorageError> {
        if self.is_closed() {
            return Err(StorageError::EnvironmentClosed);
        }
        Ok(())
    }
}

impl Environment for MemoryEnvironment {
    type Store = MemoryStore;

    fn open_store(&self, name: &str, mode: OpenMode) -> Result<MemoryStore, StorageError> {
        self.ensure_open()?;
        validate_store_name(name)?;
        let mut stores = self.stores.lock();
        let blocks = match (stores.get(name), mode) {
            (Some(blocks), OpenMode::Existing) => Arc::clone(blocks),
            (None, OpenMode::CreateNew) => {
                let blocks = Arc::new(Mutex::new(BlockMap::new()));
                stores.insert(name.to_string(), Arc::clone(&blocks));
                blocks
            }
            (Some(_), OpenMode::CreateNew) => {
                return Err(StorageError::AlreadyExists {
                    name: name.to_string(),
                });
            }
            (None, OpenMode::Existing) => {
                return Err(StorageError::NotFound {
                    name: name.to_string(),
                });
            }
        };
        Ok(MemoryStore { blocks })
    }

    fn remove_store(&self, name: &str) -> Result<(), StorageError> {
        self.ensure_open()?;
        validate_store_name(name)?;
        self.stores
            .lock()
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound {
                name: name.to_string(),
            })
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

/// Handle to one in-memory store.
pub struct MemoryStore {
    blocks: Arc<Mutex<BlockMap>>,
}

impl BlockStore for MemoryStore {
    fn get(&self, block_id: BlockId, buf: &mut [u8]) -> Result<(), StorageError> {
        ensure_block_len(buf.len())?;
        let blocks = self.blocks.lock();
        let block = blocks
            .get(&block_id)
            .ok_or(StorageError::BlockNotFound(block_id))?;

        buf.copy_from_slice(&block[..]);
        Ok(())
    }

    fn put(&mut self, block_id: BlockId, buf: &[u8]) -> Result<(), StorageError> {
        ensure_block_len(buf.len())?;
        if !block_id.is_valid() {
            return Err(StorageError::InvalidBlockId(block_id));
        }

        let mut blocks = self.blocks.lock();
        let block = blocks
            .entry(block_id)
            .or_insert_with(|| Box::new([0u8; BLOCK_SIZE]));
        block.copy_from_slice(buf);
        Ok(())
    }

    fn stat(&self) -> Result<StoreStat, StorageError> {
        let entry_count = self.blocks.lock().len() as u32;
        Ok(StoreStat { entry_count })
    }

    fn sync(&mut self) -> Result<(), StorageError> {
        // No-op for memory storage - data is already in memory
        Ok(())
    }
}
