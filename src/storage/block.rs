//! Block identifier and size constants.

use std::fmt;

/// 4KB block size. Every block in every store is exactly this long.
pub const BLOCK_SIZE: usize = 4096;

/// Raw contents of one block.
pub type Block = [u8; BLOCK_SIZE];

/// Identifier of a block within one store.
///
/// Block ids are 1-based and assigned in increasing order; id 0 is never a
/// valid block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub u32);

impl BlockId {
    /// The first block of every store.
    pub const FIRST: BlockId = BlockId(1);

    /// Creates a new BlockId from a block number.
    pub const fn new(block_num: u32) -> Self {
        Self(block_num)
    }

    /// Returns the block number.
    pub const fn block_num(&self) -> u32 {
        self.0
    }

    /// Returns the id allocated after this one.
    pub const fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns true for ids that can address a block (i.e. not 0).
    pub const fn is_valid(&self) -> bool {
        self.0 != 0
    }

    /// Calculates the byte offset for this block in a store file.
    ///
    /// Only meaningful for valid ids.
    pub const fn byte_offset(&self) -> u64 {
        (self.0 as u64 - 1) * BLOCK_SIZE as u64
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_id_byte_offset() {
        assert_eq!(BlockId::new(1).byte_offset(), 0);
        assert_eq!(BlockId::new(2).byte_offset(), 4096);
        assert_eq!(BlockId::new(101).byte_offset(), 409600);
    }

    #[test]
    fn test_block_id_next_and_validity() {
        assert!(!BlockId::new(0).is_valid());
        assert!(BlockId::FIRST.is_valid());
        assert_eq!(BlockId::FIRST.next(), BlockId::new(2));
    }

    #[test]
    fn test_block_id_ordering() {
        assert!(BlockId::new(1) < BlockId::new(2));
        assert_eq!(BlockId::new(42), BlockId::new(42));
        assert_eq!(BlockId::new(7).to_string(), "7");
    }
}
