//! Fixed on-disk geometry: block size, region boundaries and fanouts.
//!
//! None of this is negotiable at runtime — the source this crate is
//! grown from hard-codes a single block size and a single layout, and
//! the rewrite keeps that (variable block sizes are an explicit
//! non-goal).

/// Size in bytes of every block on disk, and of every I/O the block
/// device performs.
pub const BLOCK_SIZE: usize = 4096;

/// Block 0 holds the superblock.
pub const SUPERBLOCK_BLOCK: u32 = 0;

/// Blocks 1..=4: the free-space bitmap, 4 blocks of `8 * BLOCK_SIZE` bits.
pub const BITMAP_START_BLOCK: u32 = 1;
pub const BITMAP_BLOCK_COUNT: u32 = 4;

/// Total addressable bits in the bitmap region.
pub const BITMAP_BIT_COUNT: u32 = BITMAP_BLOCK_COUNT * (8 * BLOCK_SIZE as u32);

/// Blocks 5..=8: the root directory, 4 blocks of 32 entries each.
pub const ROOT_DIR_START_BLOCK: u32 = 5;
pub const ROOT_DIR_BLOCK_COUNT: u32 = 4;
pub const DIR_ENTRIES_PER_BLOCK: u32 = 32;
pub const MAX_FILE_COUNT: u32 = ROOT_DIR_BLOCK_COUNT * DIR_ENTRIES_PER_BLOCK;

/// Blocks 9..=12: the FCB table, 4 blocks of 32 FCBs each.
pub const FCB_TABLE_START_BLOCK: u32 = 9;
pub const FCB_TABLE_BLOCK_COUNT: u32 = 4;
pub const FCBS_PER_BLOCK: u32 = 32;
pub const MAX_FCB_COUNT: u32 = FCB_TABLE_BLOCK_COUNT * FCBS_PER_BLOCK;

/// Block 13 onward: index blocks and file data, allocator-managed.
pub const DATA_REGION_START_BLOCK: u32 = 13;

/// Maximum simultaneously open files.
pub const MAX_OPEN_FILES: usize = 16;

/// Longest filename this crate will store, excluding the NUL terminator.
pub const MAX_FILENAME_LEN: usize = 109;

/// On-disk size of a name field: content bytes plus the NUL terminator.
pub const NAME_FIELD_SIZE: usize = MAX_FILENAME_LEN + 1;

/// Pointers per index block (each pointer is a 4-byte block number).
pub const POINTERS_PER_INDEX_BLOCK: usize = BLOCK_SIZE / 4;

/// Smallest block count a freshly formatted disk can have: every fixed
/// metadata region (superblock + bitmap + directory + FCB table) must
/// fit, i.e. `N >= DATA_REGION_START_BLOCK`.
pub const MIN_BLOCK_COUNT: u64 = DATA_REGION_START_BLOCK as u64;

/// Largest block count the bitmap region can describe.
pub const MAX_BLOCK_COUNT: u64 = BITMAP_BIT_COUNT as u64;
