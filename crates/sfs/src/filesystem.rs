//! File API (C8): the operations a caller actually drives —
//! `create`, `open`, `close`, `getsize`, `append`, `read`, `delete` —
//! layered over the directory, FCB, bitmap and index-block modules.
//!
//! `Sfs<D>` is generic over the block device the same way the teacher's
//! `wfs-common` tree types are generic over `BlockDevice`/
//! `BlockAllocator`; the mock device lets every operation here be unit
//! tested without touching a real file.

use crate::bitmap;
use crate::block::{BlockDevice, FileBlockDevice};
use crate::directory::{self, DirectoryEntry};
use crate::error::{Result, SfsError};
use crate::fcb::{self, Fcb};
use crate::index_block;
use crate::layout::{BLOCK_SIZE, MAX_FILENAME_LEN, MAX_OPEN_FILES, POINTERS_PER_INDEX_BLOCK};
use crate::superblock::{OpenSlot, Superblock};

/// A handle returned by [`Sfs::open`]: the index of the occupied slot
/// in the superblock's open-file table. `spec.md` §9 leaves this
/// ambiguous between "raw directory index" and "open-table slot" — the
/// latter is adopted, since `close`/`getsize`/`append`/`read` all need
/// to reach the per-open state an fd identifies, not just a file.
pub type Fd = usize;

/// Whether a handle was opened to append or to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Read,
    Append,
}

impl Mode {
    fn to_raw(self) -> i32 {
        match self {
            Mode::Read => 0,
            Mode::Append => 1,
        }
    }

    fn from_raw(raw: i32) -> Option<Mode> {
        match raw {
            0 => Some(Mode::Read),
            1 => Some(Mode::Append),
            _ => None,
        }
    }
}

/// A mounted filesystem: an open block device plus the operations that
/// drive it.
pub struct Sfs<D: BlockDevice> {
    dev: D,
}

impl Sfs<FileBlockDevice> {
    /// Formats a fresh disk image at `path` sized `2^m` bytes.
    pub fn format(path: impl AsRef<std::path::Path>, m: u32) -> Result<()> {
        crate::format::format(path, m)
    }

    /// Opens an existing disk image.
    pub fn mount(path: impl AsRef<std::path::Path>) -> Result<Self> {
        Ok(Self {
            dev: FileBlockDevice::open(path)?,
        })
    }

    /// Flushes the backing file and consumes the handle. There is no
    /// process-wide mount table to update — dropping `self` after this
    /// call closes the file descriptor.
    pub fn umount(mut self) -> Result<()> {
        self.dev.sync()
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.len() > MAX_FILENAME_LEN || name.as_bytes().contains(&0) {
        return Err(SfsError::InvariantViolation);
    }
    Ok(())
}

impl<D: BlockDevice> Sfs<D> {
    /// Wraps an already-open device. Used directly by tests; real
    /// callers go through [`Sfs::mount`].
    pub(crate) fn from_device(dev: D) -> Self {
        Self { dev }
    }

    /// Creates an empty file named `name`.
    ///
    /// Allocates a directory entry, an FCB, and the one index block
    /// every file owns from the moment it exists, per `spec.md` §4.2:
    /// a file's index block is not deferred to its first `append`.
    pub fn create(&mut self, name: &str) -> Result<()> {
        validate_name(name)?;
        if directory::find_by_name(&mut self.dev, name).is_ok() {
            return Err(SfsError::AlreadyExists);
        }

        let d = directory::find_free_entry(&mut self.dev)?;
        let f = fcb::find_free_fcb(&mut self.dev)?;
        let index_block = bitmap::allocate(&mut self.dev)?;
        index_block::zero(&mut self.dev, index_block)?;

        let mut fcb = Fcb::FREE;
        fcb.set_used(true);
        fcb.index_block_index = index_block as i32;
        fcb.last_item_offset = 0;
        fcb.last_read_offset = 0;
        fcb::write_fcb(&mut self.dev, f, &fcb)?;

        let mut entry = DirectoryEntry::FREE;
        entry.set_name(name);
        entry.file_size = 0;
        entry.fcb_index = f as i32;
        entry.mode = -1;
        directory::write_entry(&mut self.dev, d, &entry)?;

        let mut sb = Superblock::read(&mut self.dev)?;
        sb.current_file_count += 1;
        sb.write(&mut self.dev)
    }

    /// Opens `name` for reading or appending and returns a handle.
    pub fn open(&mut self, name: &str, mode: Mode) -> Result<Fd> {
        let mut sb = Superblock::read(&mut self.dev)?;
        let slot = sb.open_table.find_free_slot().ok_or(SfsError::TooManyOpen)?;
        let d = directory::find_by_name(&mut self.dev, name)?;

        let mut entry = directory::read_entry(&mut self.dev, d)?;
        entry.mode = mode.to_raw();
        directory::write_entry(&mut self.dev, d, &entry)?;

        let mut raw_name = [0u8; crate::layout::NAME_FIELD_SIZE];
        let bytes = name.as_bytes();
        raw_name[..bytes.len()].copy_from_slice(bytes);
        sb.open_table.slots[slot].occupied = 1;
        sb.open_table.slots[slot].name = raw_name;
        sb.open_table.slots[slot].dir_entry_index = d as u16;
        sb.current_open_count += 1;
        sb.write(&mut self.dev)?;
        Ok(slot)
    }

    fn occupied_slot(&mut self, fd: Fd) -> Result<(Superblock, u32)> {
        if fd >= MAX_OPEN_FILES {
            return Err(SfsError::BadFd);
        }
        let sb = Superblock::read(&mut self.dev)?;
        if sb.open_table.slots[fd].is_empty() {
            return Err(SfsError::BadFd);
        }
        let d = sb.open_table.slots[fd].dir_entry_index as u32;
        Ok((sb, d))
    }

    /// Closes `fd`. Resets the file's shared read cursor to the start —
    /// per `spec.md` §9, `open` never does this, only `close`.
    pub fn close(&mut self, fd: Fd) -> Result<()> {
        let (mut sb, d) = self.occupied_slot(fd)?;
        let entry = directory::read_entry(&mut self.dev, d)?;
        let mut fcb = fcb::read_fcb(&mut self.dev, entry.fcb_index as u32)?;
        fcb.last_read_offset = 0;
        fcb::write_fcb(&mut self.dev, entry.fcb_index as u32, &fcb)?;

        sb.open_table.slots[fd] = OpenSlot::EMPTY;
        sb.current_open_count -= 1;
        sb.write(&mut self.dev)
    }

    /// Returns the current size, in bytes, of the file `fd` refers to.
    pub fn getsize(&mut self, fd: Fd) -> Result<u32> {
        let (_, d) = self.occupied_slot(fd)?;
        let entry = directory::read_entry(&mut self.dev, d)?;
        Ok(entry.file_size as u32)
    }

    /// Appends `buf` to the file `fd` refers to.
    ///
    /// `fd` must have been opened with [`Mode::Append`]. Per `spec.md`
    /// §4.6, a single call may grow the file into at most one freshly
    /// allocated block beyond the one it is already writing into —
    /// callers that need to append more than `BLOCK_SIZE` bytes split
    /// the write across multiple calls.
    pub fn append(&mut self, fd: Fd, buf: &[u8]) -> Result<()> {
        let (_, d) = self.occupied_slot(fd)?;
        let mut entry = directory::read_entry(&mut self.dev, d)?;
        if Mode::from_raw(entry.mode) != Some(Mode::Append) {
            return Err(SfsError::WrongMode);
        }
        let mut fcb = fcb::read_fcb(&mut self.dev, entry.fcb_index as u32)?;

        let n = buf.len();
        if n == 0 {
            return Ok(());
        }
        let last_item_offset = fcb.last_item_offset as usize;
        let remaining_in_last_block = if fcb.used_block_count == 0 {
            0
        } else {
            BLOCK_SIZE - last_item_offset
        };

        if n <= remaining_in_last_block && remaining_in_last_block > 0 {
            let last_block = index_block::read_pointer(
                &mut self.dev,
                fcb.index_block_index as u32,
                (fcb.used_block_count - 1) as usize,
            )?;
            write_into_block(&mut self.dev, last_block, last_item_offset, buf)?;
            fcb.last_item_offset += n as i32;
        } else {
            let first_part = remaining_in_last_block;
            let second_part = n - first_part;
            if second_part > BLOCK_SIZE {
                return Err(SfsError::TooLarge);
            }
            if fcb.used_block_count as usize >= POINTERS_PER_INDEX_BLOCK {
                return Err(SfsError::NoSpace);
            }

            if first_part > 0 {
                let last_block = index_block::read_pointer(
                    &mut self.dev,
                    fcb.index_block_index as u32,
                    (fcb.used_block_count - 1) as usize,
                )?;
                write_into_block(&mut self.dev, last_block, last_item_offset, &buf[..first_part])?;
            }

            let new_block = bitmap::allocate(&mut self.dev)?;
            index_block::write_pointer(
                &mut self.dev,
                fcb.index_block_index as u32,
                fcb.used_block_count as usize,
                new_block,
            )?;
            write_into_block(&mut self.dev, new_block, 0, &buf[first_part..])?;

            fcb.used_block_count += 1;
            fcb.last_item_offset = second_part as i32;
        }

        fcb::write_fcb(&mut self.dev, entry.fcb_index as u32, &fcb)?;
        entry.file_size += n as i32;
        directory::write_entry(&mut self.dev, d, &entry)
    }

    /// Reads up to `buf.len()` bytes starting at the file's shared read
    /// cursor, advancing the cursor by the amount actually copied.
    ///
    /// `fd` must have been opened with [`Mode::Read`]. Returns
    /// [`SfsError::EndOfFile`] only when the cursor is already at or
    /// past the end of the file; a read that starts before the end but
    /// runs out of file partway through returns `Ok` with the partial
    /// count.
    pub fn read(&mut self, fd: Fd, buf: &mut [u8]) -> Result<usize> {
        let (_, d) = self.occupied_slot(fd)?;
        let entry = directory::read_entry(&mut self.dev, d)?;
        if Mode::from_raw(entry.mode) != Some(Mode::Read) {
            return Err(SfsError::WrongMode);
        }
        let mut fcb = fcb::read_fcb(&mut self.dev, entry.fcb_index as u32)?;

        let file_size = entry.file_size as usize;
        let offset = fcb.last_read_offset.max(0) as usize;
        if offset >= file_size {
            return Err(SfsError::EndOfFile);
        }

        let to_read = buf.len().min(file_size - offset);
        let mut copied = 0;
        while copied < to_read {
            let block_slot = (offset + copied) / BLOCK_SIZE;
            let block_offset = (offset + copied) % BLOCK_SIZE;
            let block = index_block::read_pointer(
                &mut self.dev,
                fcb.index_block_index as u32,
                block_slot,
            )?;
            let chunk = (BLOCK_SIZE - block_offset).min(to_read - copied);
            read_from_block(&mut self.dev, block, block_offset, &mut buf[copied..copied + chunk])?;
            copied += chunk;
        }

        fcb.last_read_offset = (offset + copied) as i32;
        fcb::write_fcb(&mut self.dev, entry.fcb_index as u32, &fcb)?;
        Ok(copied)
    }

    /// Deletes `name`, freeing its directory entry, FCB, index block
    /// and every data block it owns.
    pub fn delete(&mut self, name: &str) -> Result<()> {
        let d = directory::find_by_name(&mut self.dev, name)?;
        let entry = directory::read_entry(&mut self.dev, d)?;
        let fcb = fcb::read_fcb(&mut self.dev, entry.fcb_index as u32)?;

        for slot in 0..fcb.used_block_count as usize {
            let block = index_block::read_pointer(&mut self.dev, fcb.index_block_index as u32, slot)?;
            bitmap::release(&mut self.dev, block)?;
            index_block::write_pointer(&mut self.dev, fcb.index_block_index as u32, slot, 0)?;
        }
        bitmap::release(&mut self.dev, fcb.index_block_index as u32)?;

        fcb::write_fcb(&mut self.dev, entry.fcb_index as u32, &Fcb::FREE)?;
        directory::clear(&mut self.dev, d)?;

        let mut sb = Superblock::read(&mut self.dev)?;
        sb.current_file_count -= 1;
        sb.write(&mut self.dev)
    }
}

fn write_into_block<D: BlockDevice>(
    dev: &mut D,
    block: u32,
    offset: usize,
    data: &[u8],
) -> Result<()> {
    let mut buf = [0u8; BLOCK_SIZE];
    dev.read_block(block, &mut buf)?;
    buf[offset..offset + data.len()].copy_from_slice(data);
    dev.write_block(block, &buf)
}

fn read_from_block<D: BlockDevice>(
    dev: &mut D,
    block: u32,
    offset: usize,
    out: &mut [u8],
) -> Result<()> {
    let mut buf = [0u8; BLOCK_SIZE];
    dev.read_block(block, &mut buf)?;
    out.copy_from_slice(&buf[offset..offset + out.len()]);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::test_support::MockBlockDevice;

    fn fresh_sfs(total_blocks: u32) -> Sfs<MockBlockDevice> {
        let mut dev = MockBlockDevice::new();
        crate::format::format_into(&mut dev, total_blocks).unwrap();
        Sfs::from_device(dev)
    }

    #[test]
    fn create_then_open_then_getsize_is_zero() {
        let mut sfs = fresh_sfs(64);
        sfs.create("a.txt").unwrap();
        let fd = sfs.open("a.txt", Mode::Read).unwrap();
        assert_eq!(sfs.getsize(fd).unwrap(), 0);
    }

    #[test]
    fn create_twice_is_already_exists() {
        let mut sfs = fresh_sfs(64);
        sfs.create("a.txt").unwrap();
        assert!(matches!(sfs.create("a.txt"), Err(SfsError::AlreadyExists)));
    }

    #[test]
    fn open_missing_file_is_not_found() {
        let mut sfs = fresh_sfs(64);
        assert!(matches!(sfs.open("nope", Mode::Read), Err(SfsError::NotFound)));
    }

    #[test]
    fn append_then_read_round_trips_small_write() {
        let mut sfs = fresh_sfs(64);
        sfs.create("a.txt").unwrap();
        let wfd = sfs.open("a.txt", Mode::Append).unwrap();
        sfs.append(wfd, b"hello world").unwrap();
        sfs.close(wfd).unwrap();

        let rfd = sfs.open("a.txt", Mode::Read).unwrap();
        assert_eq!(sfs.getsize(rfd).unwrap(), 11);
        let mut buf = [0u8; 11];
        assert_eq!(sfs.read(rfd, &mut buf).unwrap(), 11);
        assert_eq!(&buf, b"hello world");
        assert!(matches!(sfs.read(rfd, &mut buf), Err(SfsError::EndOfFile)));
    }

    #[test]
    fn append_across_a_block_boundary_spans_two_blocks() {
        let mut sfs = fresh_sfs(64);
        sfs.create("big.bin").unwrap();
        let wfd = sfs.open("big.bin", Mode::Append).unwrap();
        sfs.append(wfd, &vec![b'A'; BLOCK_SIZE - 10]).unwrap();
        sfs.append(wfd, &vec![b'B'; 20]).unwrap();
        sfs.close(wfd).unwrap();

        let rfd = sfs.open("big.bin", Mode::Read).unwrap();
        assert_eq!(sfs.getsize(rfd).unwrap(), (BLOCK_SIZE - 10 + 20) as u32);
        let mut buf = vec![0u8; BLOCK_SIZE + 10];
        let n = sfs.read(rfd, &mut buf).unwrap();
        assert_eq!(n, BLOCK_SIZE - 10 + 20);
        assert!(buf[..BLOCK_SIZE - 10].iter().all(|&b| b == b'A'));
        assert!(buf[BLOCK_SIZE - 10..n].iter().all(|&b| b == b'B'));
    }

    #[test]
    fn append_larger_than_one_block_rollover_is_too_large() {
        let mut sfs = fresh_sfs(64);
        sfs.create("big.bin").unwrap();
        let wfd = sfs.open("big.bin", Mode::Append).unwrap();
        let err = sfs.append(wfd, &vec![0u8; BLOCK_SIZE + 1]).unwrap_err();
        assert!(matches!(err, SfsError::TooLarge));
    }

    #[test]
    fn wrong_mode_is_rejected() {
        let mut sfs = fresh_sfs(64);
        sfs.create("a.txt").unwrap();
        let rfd = sfs.open("a.txt", Mode::Read).unwrap();
        assert!(matches!(sfs.append(rfd, b"x"), Err(SfsError::WrongMode)));

        let wfd = sfs.open("a.txt", Mode::Append).unwrap();
        let mut buf = [0u8; 1];
        assert!(matches!(sfs.read(wfd, &mut buf), Err(SfsError::WrongMode)));
    }

    #[test]
    fn close_resets_the_shared_read_cursor() {
        let mut sfs = fresh_sfs(64);
        sfs.create("a.txt").unwrap();
        let wfd = sfs.open("a.txt", Mode::Append).unwrap();
        sfs.append(wfd, b"0123456789").unwrap();
        sfs.close(wfd).unwrap();

        let rfd = sfs.open("a.txt", Mode::Read).unwrap();
        let mut buf = [0u8; 5];
        sfs.read(rfd, &mut buf).unwrap();
        sfs.close(rfd).unwrap();

        let rfd2 = sfs.open("a.txt", Mode::Read).unwrap();
        let mut buf2 = [0u8; 5];
        assert_eq!(sfs.read(rfd2, &mut buf2).unwrap(), 5);
        assert_eq!(&buf2, b"01234");
    }

    #[test]
    fn delete_then_recreate_frees_and_reuses_blocks() {
        let mut sfs = fresh_sfs(64);
        sfs.create("a.txt").unwrap();
        let wfd = sfs.open("a.txt", Mode::Append).unwrap();
        sfs.append(wfd, &vec![b'x'; BLOCK_SIZE + 5]).unwrap();
        sfs.close(wfd).unwrap();

        sfs.delete("a.txt").unwrap();
        assert!(matches!(sfs.open("a.txt", Mode::Read), Err(SfsError::NotFound)));

        sfs.create("a.txt").unwrap();
        let fd = sfs.open("a.txt", Mode::Read).unwrap();
        assert_eq!(sfs.getsize(fd).unwrap(), 0);
    }

    #[test]
    fn delete_zeroes_the_freed_index_blocks_pointer_slots() {
        let mut sfs = fresh_sfs(64);
        sfs.create("a.txt").unwrap();
        let wfd = sfs.open("a.txt", Mode::Append).unwrap();
        sfs.append(wfd, &vec![b'x'; BLOCK_SIZE + 5]).unwrap();
        sfs.close(wfd).unwrap();

        let d = directory::find_by_name(&mut sfs.dev, "a.txt").unwrap();
        let entry = directory::read_entry(&mut sfs.dev, d).unwrap();
        let fcb = fcb::read_fcb(&mut sfs.dev, entry.fcb_index as u32).unwrap();
        let index_block_index = fcb.index_block_index as u32;
        assert_eq!(fcb.used_block_count, 2);

        sfs.delete("a.txt").unwrap();

        for slot in 0..2 {
            assert_eq!(
                index_block::read_pointer(&mut sfs.dev, index_block_index, slot).unwrap(),
                0
            );
        }
    }

    #[test]
    fn too_many_open_files_is_rejected() {
        let mut sfs = fresh_sfs(64);
        for i in 0..MAX_OPEN_FILES + 1 {
            sfs.create(&format!("f{i}")).unwrap();
        }
        let mut fds = Vec::new();
        for i in 0..MAX_OPEN_FILES {
            fds.push(sfs.open(&format!("f{i}"), Mode::Read).unwrap());
        }
        assert!(matches!(
            sfs.open(&format!("f{MAX_OPEN_FILES}"), Mode::Read),
            Err(SfsError::TooManyOpen)
        ));
    }

    #[test]
    fn too_many_open_takes_precedence_over_not_found() {
        // spec.md §4.6 open(): step 1 is TooManyOpen, step 2 is NotFound —
        // a full open table must win even when the name doesn't exist.
        let mut sfs = fresh_sfs(64);
        for i in 0..MAX_OPEN_FILES {
            sfs.create(&format!("f{i}")).unwrap();
            sfs.open(&format!("f{i}"), Mode::Read).unwrap();
        }
        assert!(matches!(
            sfs.open("does-not-exist", Mode::Read),
            Err(SfsError::TooManyOpen)
        ));
    }

    #[test]
    fn bad_fd_is_rejected() {
        let mut sfs = fresh_sfs(64);
        assert!(matches!(sfs.getsize(0), Err(SfsError::BadFd)));
        assert!(matches!(sfs.getsize(MAX_OPEN_FILES), Err(SfsError::BadFd)));
    }
}
