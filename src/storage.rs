//! Block storage layer.
//!
//! The storage layer is the durable home of every table's bytes. A table is
//! one named store inside a storage [`Environment`]; a store maps 1-based
//! [`BlockId`]s to fixed 4KB blocks.
//!
//! # Architecture
//!
//! ```text
//! +---------------------------+
//! | HeapFile (heap::file)     |
//! +---------------------------+
//!              |
//!              v
//! +---------------------------+
//! | Environment / BlockStore  |  <- io
//! +---------------------------+
//!       /              \
//!      v                v
//! +-------------------+ +------------------+
//! | MemoryEnvironment | | FileEnvironment  |
//! +-------------------+ +------------------+
//! ```

pub mod block;
pub mod error;
pub mod io;

pub use block::{BLOCK_SIZE, Block, BlockId};
pub use error::StorageError;
pub use io::{
    BlockStore, Environment, FileEnvironment, FileStore, MemoryEnvironment, MemoryStore, OpenMode,
    StoreStat,
};
