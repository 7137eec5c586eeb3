//! SFS — a single-user, single-threaded, file-backed virtual disk with a
//! POSIX-like flat-namespace file API (create, open, close, append,
//! read, delete, getsize) plus format and mount.
//!
//! The crate is organized the way the on-disk layout is: a block device
//! at the bottom (`block`), the bitmap allocator over it (`bitmap`), the
//! three fixed metadata regions (`superblock`, `directory`, `fcb`), the
//! per-file `index_block` module, the formatter (`format`) that lays all
//! of the above down on a fresh image, and [`filesystem::Sfs`] — the
//! type applications actually drive — tying them together.
//!
//! There is no internal synchronization and no crash recovery: a single
//! `Sfs` value owns its backing file, and a failure partway through an
//! operation may leave the on-disk image inconsistent. Both are
//! documented limitations, not oversights.

pub mod bitmap;
pub mod block;
pub mod directory;
pub mod error;
pub mod fcb;
pub mod filesystem;
pub mod format;
pub mod index_block;
pub mod layout;
pub mod superblock;

pub use error::{Result, SfsError};
pub use filesystem::{Fd, Mode, Sfs};
pub use format::block_count_for_exponent;
pub use layout::BLOCK_SIZE;
