//! Heap storage for typed rows.
//!
//! The term "heap" refers to an unordered collection of records, as opposed
//! to indexed structures like B+trees.
//!
//! - [`SlottedPage`]: record storage within one block
//! - [`HeapFile`]: a table's sequence of blocks in one store
//! - [`HeapTable`]: typed rows over a heap file, addressed by [`Handle`]
//! - [`marshal`] / [`unmarshal`]: the on-disk row encoding

mod error;
mod file;
mod page;
mod record;
mod table;

pub use error::{HeapError, RelationError};
pub use file::HeapFile;
pub use page::{
    HEADER_SIZE, MAX_RECORD_SIZE, PageHeader, RecordId, SLOT_SIZE, SlotEntry, SlottedPage,
};
pub use record::{marshal, unmarshal};
pub use table::{Handle, HeapTable};
