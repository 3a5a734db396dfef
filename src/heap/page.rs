//! Slotted page layout for variable-length records.
//!
//! A slotted page manages records within one fixed 4096-byte block:
//!
//! ```text
//! +-----------------------+ offset 0
//! | num_records | end_free|  header (4B)
//! +-----------------------+ offset 4
//! | slot 1 | slot 2 | ... |  directory (grows toward higher offsets)
//! +-----------------------+
//! | Free Space            |
//! +-----------------------+ end_free + 1
//! | ... | rec 2 | rec 1   |  payload (grows toward lower offsets)
//! +-----------------------+ offset 4096
//! ```
//!
//! Slot `k` lives at offset `4 * k`, so record id 0 is the header itself and
//! is never handed out. Record ids are never reused: a deleted record keeps
//! its slot as a tombstone (`loc == 0`). Payload is kept contiguous; deleting
//! or resizing a record slides everything stored below it.

use super::error::HeapError;
use crate::storage::{BLOCK_SIZE, Block, BlockId};

/// Size of the page header in bytes.
pub const HEADER_SIZE: usize = 4;

/// Size of each slot entry in bytes.
pub const SLOT_SIZE: usize = 4;

/// Maximum record size that can fit in a single page.
///
/// This accounts for the header and the slot of the first record.
pub const MAX_RECORD_SIZE: usize = BLOCK_SIZE - HEADER_SIZE - SLOT_SIZE;

/// Record identifier within a page. Issued from 1.
pub type RecordId = u16;

/// Page header.
///
/// Layout (4 bytes):
/// - `num_records`: u16, count of ids ever issued (tombstones included)
/// - `end_free`: u16, offset of the last free byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageHeader {
    /// Number of record ids issued so far.
    pub num_records: u16,
    /// Offset of the last byte of free space; payload starts right after.
    pub end_free: u16,
}

impl PageHeader {
    /// Header of an empty page.
    pub const fn empty() -> Self {
        Self {
            num_records: 0,
            end_free: (BLOCK_SIZE - 1) as u16,
        }
    }

    /// Reads a header from bytes.
    pub fn read_from(data: &[u8]) -> Self {
        Self {
            num_records: u16::from_le_bytes([data[0], data[1]]),
            end_free: u16::from_le_bytes([data[2], data[3]]),
        }
    }

    /// Writes a header to bytes.
    pub fn write_to(&self, data: &mut [u8]) {
        data[0..2].copy_from_slice(&self.num_records.to_le_bytes());
        data[2..4].copy_from_slice(&self.end_free.to_le_bytes());
    }
}

/// A slot entry in the record directory.
///
/// Layout (4 bytes):
/// - `size`: u16, record length
/// - `loc`: u16, offset of record data (0 = deleted)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotEntry {
    /// Length of record in bytes.
    pub size: u16,
    /// Offset to record data from start of block (0 = deleted).
    pub loc: u16,
}

impl SlotEntry {
    /// Creates a tombstone.
    pub const fn empty() -> Self {
        Self { size: 0, loc: 0 }
    }

    /// Creates a slot entry for a record.
    pub const fn new(size: u16, loc: u16) -> Self {
        Self { size, loc }
    }

    /// Returns true if this slot is a tombstone.
    pub fn is_empty(&self) -> bool {
        self.loc == 0
    }

    /// Byte range of the record within the block.
    fn range(&self) -> std::ops::Range<usize> {
        let start = self.loc as usize;
        start..start + self.size as usize
    }

    /// Reads a slot entry from bytes.
    pub fn read_from(data: &[u8]) -> Self {
        Self {
            size: u16::from_le_bytes([data[0], data[1]]),
            loc: u16::from_le_bytes([data[2], data[3]]),
        }
    }

    /// Writes a slot entry to bytes.
    pub fn write_to(&self, data: &mut [u8]) {
        data[0..2].copy_from_slice(&self.size.to_le_bytes());
        data[2..4].copy_from_slice(&self.loc.to_le_bytes());
    }
}

/// A slotted page owning one block's bytes.
///
/// Changes are made in memory only; the owning heap file writes the page back
/// with [`HeapFile::put`](super::HeapFile::put).
///
/// # Example
///
/// ```
/// use heapdb::heap::SlottedPage;
/// use heapdb::storage::{BLOCK_SIZE, BlockId};
///
/// let mut page = SlottedPage::new(Box::new([0u8; BLOCK_SIZE]), BlockId::FIRST, true);
/// let id = page.add(b"hello world").unwrap();
/// assert_eq!(id, 1);
/// assert_eq!(page.get(id).as_deref(), Some(b"hello world".as_slice()));
/// ```
#[derive(Clone)]
pub struct SlottedPage {
    block: Box<Block>,
    block_id: BlockId,
}

impl SlottedPage {
    /// Wraps a block. With `is_new`, the block is zeroed and given an empty
    /// header; otherwise the existing header is trusted.
    pub fn new(block: Box<Block>, block_id: BlockId, is_new: bool) -> Self {
        let mut page = Self { block, block_id };
        if is_new {
            page.block.fill(0);
            page.set_header(&PageHeader::empty());
        }
        page
    }

    /// Returns the block this page was read from.
    pub fn block_id(&self) -> BlockId {
        self.block_id
    }

    /// Returns the raw block bytes.
    pub fn data(&self) -> &[u8] {
        &self.block[..]
    }

    /// Returns the page header.
    pub fn header(&self) -> PageHeader {
        PageHeader::read_from(&self.block[..HEADER_SIZE])
    }

    fn set_header(&mut self, header: &PageHeader) {
        header.write_to(&mut self.block[..HEADER_SIZE]);
    }

    fn get_slot(&self, record_id: RecordId) -> SlotEntry {
        let offset = record_id as usize * SLOT_SIZE;
        SlotEntry::read_from(&self.block[offset..offset + SLOT_SIZE])
    }

    fn set_slot(&mut self, record_id: RecordId, entry: &SlotEntry) {
        let offset = record_id as usize * SLOT_SIZE;
        entry.write_to(&mut self.block[offset..offset + SLOT_SIZE]);
    }

    /// Returns the slot of a live record.
    fn live_slot(&self, record_id: RecordId) -> Result<SlotEntry, HeapError> {
        if record_id == 0 || record_id > self.header().num_records {
            return Err(HeapError::RecordNotFound(record_id));
        }
        let slot = self.get_slot(record_id);
        if slot.is_empty() {
            return Err(HeapError::RecordNotFound(record_id));
        }
        Ok(slot)
    }

    /// Bytes between the end of the directory and the start of payload.
    pub fn free_space(&self) -> usize {
        let header = self.header();
        let directory_end = HEADER_SIZE + header.num_records as usize * SLOT_SIZE;
        (header.end_free as usize + 1).saturating_sub(directory_end)
    }

    /// Checks if a new record of `size` bytes fits, counting its new slot.
    pub fn has_room(&self, size: usize) -> bool {
        size + SLOT_SIZE <= self.free_space()
    }

    /// Appends a record and returns its id.
    ///
    /// # Errors
    ///
    /// Returns `HeapError::NoRoom` if the payload and its slot do not fit.
    pub fn add(&mut self, data: &[u8]) -> Result<RecordId, HeapError> {
        let size = data.len();
        if !self.has_room(size) {
            return Err(HeapError::NoRoom {
                required: size + SLOT_SIZE,
                available: self.free_space(),
            });
        }

        let mut header = self.header();
        header.num_records += 1;
        header.end_free -= size as u16;
        let record_id = header.num_records;
        let loc = header.end_free + 1;

        let start = loc as usize;
        self.block[start..start + size].copy_from_slice(data);
        self.set_slot(record_id, &SlotEntry::new(size as u16, loc));
        self.set_header(&header);

        Ok(record_id)
    }

    /// Returns a copy of a record, or `None` if the id is out of range or
    /// tombstoned.
    pub fn get(&self, record_id: RecordId) -> Option<Vec<u8>> {
        self.read(record_id).map(<[u8]>::to_vec)
    }

    /// Borrows a record's bytes.
    pub fn read(&self, record_id: RecordId) -> Option<&[u8]> {
        let slot = self.live_slot(record_id).ok()?;
        Some(&self.block[slot.range()])
    }

    /// Replaces a record's payload, keeping its id.
    ///
    /// The record's payload stays anchored at its old end offset; everything
    /// stored below it slides by the size difference.
    ///
    /// # Errors
    ///
    /// Returns `HeapError::RecordNotFound` for a missing or deleted id, and
    /// `HeapError::NoRoom` if growing the record exceeds free space. On error
    /// the page is unchanged.
    pub fn put(&mut self, record_id: RecordId, data: &[u8]) -> Result<(), HeapError> {
        let slot = self.live_slot(record_id)?;
        let old_len = slot.size as usize;
        let new_len = data.len();
        let loc = slot.loc as usize;

        if new_len > old_len {
            let extra = new_len - old_len;
            let available = self.free_space();
            if extra > available {
                return Err(HeapError::NoRoom {
                    required: extra,
                    available,
                });
            }
        }

        let new_loc = loc + old_len - new_len;
        self.slide(loc, new_loc);
        self.block[new_loc..new_loc + new_len].copy_from_slice(data);
        self.set_slot(record_id, &SlotEntry::new(new_len as u16, new_loc as u16));
        Ok(())
    }

    /// Deletes a record, reclaiming its payload bytes immediately.
    ///
    /// The id becomes a tombstone and is not reissued.
    ///
    /// # Errors
    ///
    /// Returns `HeapError::RecordNotFound` for a missing or deleted id.
    pub fn del(&mut self, record_id: RecordId) -> Result<(), HeapError> {
        let slot = self.live_slot(record_id)?;
        self.set_slot(record_id, &SlotEntry::empty());
        let range = slot.range();
        self.slide(range.start, range.end);
        Ok(())
    }

    /// Returns the ids of live records in ascending order.
    pub fn ids(&self) -> Vec<RecordId> {
        (1..=self.header().num_records)
            .filter(|&id| !self.get_slot(id).is_empty())
            .collect()
    }

    /// Moves the payload bytes in `[end_free + 1, start)` so that offset
    /// `start` maps to `end`, then re-homes every live record lying wholly
    /// inside the moved range and shifts `end_free` by the same amount.
    ///
    /// A positive shift reclaims space, a negative shift opens a gap.
    fn slide(&mut self, start: usize, end: usize) {
        if start == end {
            return;
        }
        let mut header = self.header();
        let payload_start = header.end_free as usize + 1;
        let shift = end as isize - start as isize;
        let dest = (payload_start as isize + shift) as usize;

        self.block.copy_within(payload_start..start, dest);
        if shift > 0 {
            self.block[payload_start..dest].fill(0);
        }

        for id in self.ids() {
            let slot = self.get_slot(id);
            if slot.range().end <= start {
                let loc = (slot.loc as isize + shift) as u16;
                self.set_slot(id, &SlotEntry::new(slot.size, loc));
            }
        }

        header.end_free = (header.end_free as isize + shift) as u16;
        self.set_header(&header);
    }
}

impl std::fmt::Debug for SlottedPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlottedPage")
            .field("block_id", &self.block_id)
            .field("header", &self.header())
            .field("ids", &self.ids())
            .finish()
    }
}
