//! File-backed storage environment.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use super::{BlockStore, Environment, OpenMode, StoreStat, ensure_block_len, validate_store_name};
use crate::storage::block::{BLOCK_SIZE, BlockId};
use crate::storage::error::StorageError;

/// File suffix of a store inside the environment directory.
const STORE_SUFFIX: &str = "db";

/// A directory of store files, one file per table.
///
/// # Directory Layout
///
/// ```text
/// <dir>/
///   _tables.db
///   _columns.db
///   foo.db
/// ```
pub struct FileEnvironment {
    /// Environment directory
    dir: PathBuf,
    closed: AtomicBool,
}

impl FileEnvironment {
    /// Opens the environment rooted at `dir`, creating the directory if it
    /// does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Corrupted` if `dir` exists but is not a directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        if !dir.is_dir() {
            return Err(StorageError::Corrupted(format!(
                "{} is not a directory",
                dir.display()
            )));
        }
        debug!(dir = %dir.display(), "opened file environment");
        Ok(Self {
            dir,
            closed: AtomicBool::new(false),
        })
    }

    fn store_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", name, STORE_SUFFIX))
    }

    fn ensure_open(&self) -> Result<(), StorageError> {
        if self.is_closed() {
            return Err(StorageError::EnvironmentClosed);
        }
        Ok(())
    }
}

impl Environment for FileEnvironment {
    type Store = FileStore;

    fn open_store(&self, name: &str, mode: OpenMode) -> Result<FileStore, StorageError> {
        self.ensure_open()?;
        validate_store_name(name)?;
        let path = self.store_path(name);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(mode == OpenMode::CreateNew)
            .open(&path)
            .map_err(|e| store_error(name, e))?;
        debug!(store = name, ?mode, "opened store file");
        FileStore::new(file)
    }

    fn remove_store(&self, name: &str) -> Result<(), StorageError> {
        self.ensure_open()?;
        validate_store_name(name)?;
        fs::remove_file(self.store_path(name)).map_err(|e| store_error(name, e))?;
        debug!(store = name, "removed store file");
        Ok(())
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

fn store_error(name: &str, e: std::io::Error) -> StorageError {
    match e.kind() {
        ErrorKind::NotFound => StorageError::NotFound {
            name: name.to_string(),
        },
        ErrorKind::AlreadyExists => StorageError::AlreadyExists {
            name: name.to_string(),
        },
        _ => StorageError::Io(e),
    }
}

/// One store file: block `n` lives at byte offset `(n - 1) * BLOCK_SIZE`.
///
/// # File Layout
///
/// ```text
/// +------------------+------------------+------------------+
/// | Block 1 (4KB)    | Block 2 (4KB)    | Block 3 (4KB)    | ...
/// +------------------+------------------+------------------+
/// ^ offset 0         ^ offset 4096      ^ offset 8192
/// ```
///
/// Writes either overwrite an existing block or append the next one, so the
/// file never has holes and its length always encodes the block count.
pub struct FileStore {
    file: File,
    /// Number of blocks currently in the file
    block_count: u32,
}

impl FileStore {
    fn new(file: File) -> Result<Self, StorageError> {
        let file_size = file.metadata()?.len();

        // Validate file size is a multiple of BLOCK_SIZE
        if file_size % BLOCK_SIZE as u64 != 0 {
            return Err(StorageError::Corrupted(format!(
                "file size {} is not a multiple of block size {}",
                file_size, BLOCK_SIZE
            )));
        }
        let block_count = u32::try_from(file_size / BLOCK_SIZE as u64).map_err(|_| {
            StorageError::Corrupted(format!("file size {} exceeds block id range", file_size))
        })?;

        Ok(Self { file, block_count })
    }
}

impl BlockStore for FileStore {
    fn get(&self, block_id: BlockId, buf: &mut [u8]) -> Result<(), StorageError> {
        ensure_block_len(buf.len())?;
        if !block_id.is_valid() || block_id.block_num() > self.block_count {
            return Err(StorageError::BlockNotFound(block_id));
        }

        let mut file = &self.file;
        file.seek(SeekFrom::Start(block_id.byte_offset()))?;
        file.read_exact(buf)?;
        Ok(())
    }

    fn put(&mut self, block_id: BlockId, buf: &[u8]) -> Result<(), StorageError> {
        ensure_block_len(buf.len())?;
        if !block_id.is_valid() || block_id.block_num() > self.block_count + 1 {
            return Err(StorageError::InvalidBlockId(block_id));
        }

        self.file.seek(SeekFrom::Start(block_id.byte_offset()))?;
        self.file.write_all(buf)?;
        if block_id.block_num() == self.block_count + 1 {
            self.block_count += 1;
        }
        Ok(())
    }

    fn stat(&self) -> Result<StoreStat, StorageError> {
        Ok(StoreStat {
            entry_count: self.block_count,
        })
    }

    fn sync(&mut self) -> Result<(), StorageError> {
        self.file.sync_all()?;
        Ok(())
    }
}
