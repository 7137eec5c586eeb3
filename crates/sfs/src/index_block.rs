//! Index Block (C7): one B-byte block per file, holding up to `B/4`
//! pointers to that file's data blocks.
//!
//! Unlike the directory and FCB tables, an index block is not a fixed
//! struct — it is just `B/4` little-endian-native `u32` pointers packed
//! into a block, read and written a slot at a time. Only the first
//! `used_block_count` slots (tracked in the owning FCB) are meaningful.

use crate::block::BlockDevice;
use crate::error::Result;
use crate::layout::{BLOCK_SIZE, POINTERS_PER_INDEX_BLOCK};

/// Reads the data-block pointer stored at `slot` of the index block
/// `index_block`.
pub fn read_pointer<D: BlockDevice>(dev: &mut D, index_block: u32, slot: usize) -> Result<u32> {
    let mut buf = [0u8; BLOCK_SIZE];
    dev.read_block(index_block, &mut buf)?;
    let offset = slot * 4;
    Ok(u32::from_ne_bytes(buf[offset..offset + 4].try_into().unwrap()))
}

/// Writes `value` at `slot` of index block `index_block`.
pub fn write_pointer<D: BlockDevice>(
    dev: &mut D,
    index_block: u32,
    slot: usize,
    value: u32,
) -> Result<()> {
    let mut buf = [0u8; BLOCK_SIZE];
    dev.read_block(index_block, &mut buf)?;
    let offset = slot * 4;
    buf[offset..offset + 4].copy_from_slice(&value.to_ne_bytes());
    dev.write_block(index_block, &buf)
}

/// Zeroes an entire index block. Used when a file's index block is
/// first allocated at `create` time.
pub fn zero<D: BlockDevice>(dev: &mut D, index_block: u32) -> Result<()> {
    dev.write_block(index_block, &[0u8; BLOCK_SIZE])
}

/// Number of pointers an index block can hold.
pub const CAPACITY: usize = POINTERS_PER_INDEX_BLOCK;
