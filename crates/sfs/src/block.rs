//! Block Device (C1): fixed-size positioned reads/writes against the
//! backing file.
//!
//! Grounded on the teacher's `FileBlockDevice` (`mkfs.wfs`), generalized
//! from 4096-byte `TreeNode`s to plain `[u8; BLOCK_SIZE]` buffers since
//! SFS has no tree nodes — just raw metadata and data blocks.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::error::Result;
use crate::layout::BLOCK_SIZE;

/// A block-addressable device: read or write exactly `BLOCK_SIZE` bytes
/// at a given block index. No caching — every call reaches the
/// underlying file.
pub trait BlockDevice {
    fn read_block(&mut self, index: u32, buf: &mut [u8; BLOCK_SIZE]) -> Result<()>;
    fn write_block(&mut self, index: u32, buf: &[u8; BLOCK_SIZE]) -> Result<()>;
}

/// A [`BlockDevice`] backed by a regular file opened read-write.
///
/// `mount` is [`FileBlockDevice::open`]; `umount` is simply dropping the
/// value, which closes the file descriptor — there is no process-wide
/// mount table, per the instance-value design called for by the
/// original source's single global `vdisk_fd`.
pub struct FileBlockDevice {
    file: File,
}

impl FileBlockDevice {
    /// Opens an existing backing file read-write. Fails if the file
    /// does not exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        Ok(Self { file })
    }

    /// Creates (or truncates) the backing file and sizes it to exactly
    /// `total_blocks * BLOCK_SIZE` bytes, zero-filled. This is the
    /// "external collaborator" step `spec.md` treats as out of scope
    /// for the interesting engineering — it is a thin wrapper around
    /// `File::set_len`.
    pub fn create(path: impl AsRef<Path>, total_blocks: u64) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        file.set_len(total_blocks * BLOCK_SIZE as u64)?;
        Ok(Self { file })
    }

    /// Flushes all buffered writes to the underlying storage.
    pub fn sync(&mut self) -> Result<()> {
        self.file.sync_all()?;
        Ok(())
    }
}

impl BlockDevice for FileBlockDevice {
    fn read_block(&mut self, index: u32, buf: &mut [u8; BLOCK_SIZE]) -> Result<()> {
        self.file
            .seek(SeekFrom::Start(index as u64 * BLOCK_SIZE as u64))?;
        self.file.read_exact(buf)?;
        Ok(())
    }

    fn write_block(&mut self, index: u32, buf: &[u8; BLOCK_SIZE]) -> Result<()> {
        self.file
            .seek(SeekFrom::Start(index as u64 * BLOCK_SIZE as u64))?;
        self.file.write_all(buf)?;
        Ok(())
    }
}
