//! FCB Table (C6): 128 fixed file-control-blocks, 32 per block,
//! addressed by a linear index `f in [0, 128)`.

use crate::block::BlockDevice;
use crate::error::{Result, SfsError};
use crate::layout::{BLOCK_SIZE, FCBS_PER_BLOCK, FCB_TABLE_START_BLOCK, MAX_FCB_COUNT};

const FCB_SIZE: usize = 128;

/// Per-file metadata: block count, index-block location, append and
/// read cursors.
///
/// A free FCB has `used = false`, `used_block_count = 0`,
/// `index_block_index = -1`, `last_read_offset = -1`. Per `spec.md` §3,
/// `last_item_offset` is `-1` conceptually but reads as `0` immediately
/// after format — this rewrite stores `0` directly since an unused FCB
/// never has its `last_item_offset` consulted before `create`
/// initializes it.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct Fcb {
    used: u32,
    pub used_block_count: u32,
    pub index_block_index: i32,
    pub last_item_offset: i32,
    pub last_read_offset: i32,
    _pad: [u8; FCB_SIZE - 20],
}

const _: () = assert!(std::mem::size_of::<Fcb>() == FCB_SIZE);
const _: () = assert!((FCB_SIZE * FCBS_PER_BLOCK as usize) == BLOCK_SIZE);

impl Fcb {
    pub const FREE: Fcb = Fcb {
        used: 0,
        used_block_count: 0,
        index_block_index: -1,
        last_item_offset: 0,
        last_read_offset: -1,
        _pad: [0; FCB_SIZE - 20],
    };

    pub fn is_used(&self) -> bool {
        self.used != 0
    }

    pub fn set_used(&mut self, used: bool) {
        self.used = used as u32;
    }
}

fn block_and_slot(f: u32) -> (u32, usize) {
    (
        FCB_TABLE_START_BLOCK + f / FCBS_PER_BLOCK,
        (f % FCBS_PER_BLOCK) as usize,
    )
}

pub fn read_fcb<D: BlockDevice>(dev: &mut D, f: u32) -> Result<Fcb> {
    let (block, slot) = block_and_slot(f);
    let mut buf = [0u8; BLOCK_SIZE];
    dev.read_block(block, &mut buf)?;
    let offset = slot * FCB_SIZE;
    Ok(unsafe { std::ptr::read(buf[offset..].as_ptr() as *const Fcb) })
}

pub fn write_fcb<D: BlockDevice>(dev: &mut D, f: u32, fcb: &Fcb) -> Result<()> {
    let (block, slot) = block_and_slot(f);
    let mut buf = [0u8; BLOCK_SIZE];
    dev.read_block(block, &mut buf)?;
    let offset = slot * FCB_SIZE;
    let bytes = unsafe { std::slice::from_raw_parts(fcb as *const Fcb as *const u8, FCB_SIZE) };
    buf[offset..offset + FCB_SIZE].copy_from_slice(bytes);
    dev.write_block(block, &buf)
}

/// Lowest-index FCB with `used == false`.
pub fn find_free_fcb<D: BlockDevice>(dev: &mut D) -> Result<u32> {
    for f in 0..MAX_FCB_COUNT {
        if !read_fcb(dev, f)?.is_used() {
            return Ok(f);
        }
    }
    Err(SfsError::NoSpace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::test_support::MockBlockDevice;

    #[test]
    fn fresh_disk_has_every_fcb_free() {
        let mut dev = MockBlockDevice::new();
        for f in 0..MAX_FCB_COUNT {
            write_fcb(&mut dev, f, &Fcb::FREE).unwrap();
        }
        assert_eq!(find_free_fcb(&mut dev).unwrap(), 0);
    }

    #[test]
    fn find_free_fcb_skips_used_slots() {
        let mut dev = MockBlockDevice::new();
        for f in 0..MAX_FCB_COUNT {
            write_fcb(&mut dev, f, &Fcb::FREE).unwrap();
        }
        let mut used = Fcb::FREE;
        used.set_used(true);
        write_fcb(&mut dev, 0, &used).unwrap();
        assert_eq!(find_free_fcb(&mut dev).unwrap(), 1);
    }

    #[test]
    fn round_trips_fields() {
        let mut dev = MockBlockDevice::new();
        let mut fcb = Fcb::FREE;
        fcb.set_used(true);
        fcb.used_block_count = 3;
        fcb.index_block_index = 42;
        fcb.last_item_offset = 1808;
        fcb.last_read_offset = 500;
        write_fcb(&mut dev, 50, &fcb).unwrap();

        let back = read_fcb(&mut dev, 50).unwrap();
        assert!(back.is_used());
        assert_eq!(back.used_block_count, 3);
        assert_eq!(back.index_block_index, 42);
        assert_eq!(back.last_item_offset, 1808);
        assert_eq!(back.last_read_offset, 500);
    }
}
