//! Root Directory (C5): 128 fixed directory entries, 32 per block,
//! addressed by a linear index `d in [0, 128)`.
//!
//! `DirectoryEntry` is exactly 128 bytes on disk and read/written via a
//! raw reinterpretation of the owning block, the same technique the
//! teacher's flat `FileEntry` table uses in
//! `crates/storage/wfs/src/vfs.rs` (`core::ptr::read::<FileEntry>`).

use crate::block::BlockDevice;
use crate::error::{Result, SfsError};
use crate::layout::{
    BLOCK_SIZE, DIR_ENTRIES_PER_BLOCK, MAX_FILE_COUNT, NAME_FIELD_SIZE, ROOT_DIR_START_BLOCK,
};

const ENTRY_SIZE: usize = 128;

/// A single root-directory slot: a name and a pointer to its FCB.
///
/// A free entry has `file_size == -1`, `fcb_index == -1`, `mode == -1`
/// and an empty name, per `spec.md` §3.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct DirectoryEntry {
    pub file_size: i32,
    pub fcb_index: i32,
    pub mode: i32,
    pub name: [u8; NAME_FIELD_SIZE],
    _pad: [u8; ENTRY_SIZE - NAME_FIELD_SIZE - 12],
}

const _: () = assert!(std::mem::size_of::<DirectoryEntry>() == ENTRY_SIZE);
const _: () = assert!((ENTRY_SIZE * DIR_ENTRIES_PER_BLOCK as usize) == BLOCK_SIZE);

impl DirectoryEntry {
    pub const FREE: DirectoryEntry = DirectoryEntry {
        file_size: -1,
        fcb_index: -1,
        mode: -1,
        name: [0; NAME_FIELD_SIZE],
        _pad: [0; ENTRY_SIZE - NAME_FIELD_SIZE - 12],
    };

    pub fn is_free(&self) -> bool {
        self.file_size < 0
    }

    pub fn name_str(&self) -> &str {
        let nul = self.name.iter().position(|&b| b == 0).unwrap_or(self.name.len());
        std::str::from_utf8(&self.name[..nul]).unwrap_or("")
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = [0; NAME_FIELD_SIZE];
        let bytes = name.as_bytes();
        let n = bytes.len().min(NAME_FIELD_SIZE - 1);
        self.name[..n].copy_from_slice(&bytes[..n]);
    }
}

fn block_and_slot(d: u32) -> (u32, usize) {
    (
        ROOT_DIR_START_BLOCK + d / DIR_ENTRIES_PER_BLOCK,
        (d % DIR_ENTRIES_PER_BLOCK) as usize,
    )
}

pub fn read_entry<D: BlockDevice>(dev: &mut D, d: u32) -> Result<DirectoryEntry> {
    let (block, slot) = block_and_slot(d);
    let mut buf = [0u8; BLOCK_SIZE];
    dev.read_block(block, &mut buf)?;
    let offset = slot * ENTRY_SIZE;
    Ok(unsafe { std::ptr::read(buf[offset..].as_ptr() as *const DirectoryEntry) })
}

pub fn write_entry<D: BlockDevice>(dev: &mut D, d: u32, entry: &DirectoryEntry) -> Result<()> {
    let (block, slot) = block_and_slot(d);
    let mut buf = [0u8; BLOCK_SIZE];
    dev.read_block(block, &mut buf)?;
    let offset = slot * ENTRY_SIZE;
    let bytes = unsafe {
        std::slice::from_raw_parts(entry as *const DirectoryEntry as *const u8, ENTRY_SIZE)
    };
    buf[offset..offset + ENTRY_SIZE].copy_from_slice(bytes);
    dev.write_block(block, &buf)
}

/// Lowest-index entry with `file_size == -1`.
pub fn find_free_entry<D: BlockDevice>(dev: &mut D) -> Result<u32> {
    for d in 0..MAX_FILE_COUNT {
        if read_entry(dev, d)?.is_free() {
            return Ok(d);
        }
    }
    Err(SfsError::NoSpace)
}

/// Lowest-index entry whose name matches exactly (case-sensitive,
/// byte-wise), or `NotFound`.
pub fn find_by_name<D: BlockDevice>(dev: &mut D, name: &str) -> Result<u32> {
    for d in 0..MAX_FILE_COUNT {
        let entry = read_entry(dev, d)?;
        if !entry.is_free() && entry.name_str() == name {
            return Ok(d);
        }
    }
    Err(SfsError::NotFound)
}

/// Resets entry `d` to its free state.
pub fn clear<D: BlockDevice>(dev: &mut D, d: u32) -> Result<()> {
    write_entry(dev, d, &DirectoryEntry::FREE)
}
