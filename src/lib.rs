//! heapdb: a minimal relational storage engine.
//!
//! Rows are laid out in slotted 4KB pages ([`heap::SlottedPage`]), pages
//! form table files ([`heap::HeapFile`]) over a block store
//! ([`storage::Environment`]), and typed tables ([`heap::HeapTable`]) are
//! registered in a self-hosting [`catalog::Catalog`]. The [`sql`] front end
//! and [`executor`] drive it all from SQL text.

pub mod catalog;
pub mod datum;
pub mod executor;
pub mod heap;
pub mod sql;
pub mod storage;
