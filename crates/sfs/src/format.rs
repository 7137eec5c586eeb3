//! Formatter (C9): initializes every metadata region of a fresh disk.
//!
//! Grounded on `mkfs.wfs`'s `create_wfs_v1`, generalized from WFS's
//! B+tree roots to SFS's fixed-size bitmap/directory/FCB regions. The
//! "produce a zero-filled file of the requested size" step is the
//! external-collaborator step `spec.md` §1 calls out of scope for the
//! interesting engineering; here it is `FileBlockDevice::create`, a
//! thin wrapper around `File::set_len`.

use std::path::Path;

use crate::bitmap;
use crate::block::{BlockDevice, FileBlockDevice};
use crate::directory::DirectoryEntry;
use crate::error::{Result, SfsError};
use crate::fcb::Fcb;
use crate::layout::{
    DATA_REGION_START_BLOCK, FCB_TABLE_BLOCK_COUNT, FCBS_PER_BLOCK, MAX_BLOCK_COUNT,
    MAX_FCB_COUNT, MAX_FILE_COUNT, MIN_BLOCK_COUNT, ROOT_DIR_BLOCK_COUNT,
};
use crate::superblock::Superblock;

/// Computes the block count for a disk-size exponent `m` (`2^m` bytes)
/// and validates it against `spec.md` §3's range: `N >= 13` (every fixed
/// region fits) and `N <= 4*8*BLOCK_SIZE` (fits the bitmap region).
pub fn block_count_for_exponent(m: u32) -> Result<u32> {
    let disk_size = 1u64
        .checked_shl(m)
        .ok_or(SfsError::InvalidSize)?;
    let total_blocks = disk_size / crate::layout::BLOCK_SIZE as u64;
    if total_blocks < MIN_BLOCK_COUNT || total_blocks > MAX_BLOCK_COUNT {
        return Err(SfsError::InvalidSize);
    }
    Ok(total_blocks as u32)
}

/// Writes the bitmap region (blocks 1..4): every metadata bit
/// `0..DATA_REGION_START_BLOCK` set, everything else clear.
pub(crate) fn write_fresh_bitmap<D: BlockDevice>(dev: &mut D, _total_blocks: u32) -> Result<()> {
    for bit in 0..DATA_REGION_START_BLOCK {
        bitmap::update_bitmap(dev, bit, true)?;
    }
    Ok(())
}

fn write_fresh_directory<D: BlockDevice>(dev: &mut D) -> Result<()> {
    for d in 0..MAX_FILE_COUNT {
        crate::directory::write_entry(dev, d, &DirectoryEntry::FREE)?;
    }
    Ok(())
}

fn write_fresh_fcb_table<D: BlockDevice>(dev: &mut D) -> Result<()> {
    for f in 0..MAX_FCB_COUNT {
        crate::fcb::write_fcb(dev, f, &Fcb::FREE)?;
    }
    Ok(())
}

/// Initializes every metadata region of `dev`, which must already be
/// sized to hold `total_blocks` blocks.
pub(crate) fn format_into<D: BlockDevice>(dev: &mut D, total_blocks: u32) -> Result<()> {
    write_fresh_bitmap(dev, total_blocks)?;
    write_fresh_directory(dev)?;
    write_fresh_fcb_table(dev)?;
    Superblock::fresh(total_blocks).write(dev)?;
    Ok(())
}

/// `format(path, m)`: creates a zero-filled backing file of `2^m` bytes
/// at `path` and initializes the superblock, bitmap, root directory and
/// FCB table on it.
pub fn format(path: impl AsRef<Path>, m: u32) -> Result<()> {
    let total_blocks = block_count_for_exponent(m)?;
    let mut dev = FileBlockDevice::create(path, total_blocks as u64)?;
    format_into(&mut dev, total_blocks)?;
    dev.sync()?;
    Ok(())
}

const _: () = assert!(ROOT_DIR_BLOCK_COUNT > 0 && FCB_TABLE_BLOCK_COUNT > 0 && FCBS_PER_BLOCK > 0);
