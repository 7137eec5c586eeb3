//! Error kinds returned by every fallible `sfs` operation.

use std::fmt;
use std::io;

/// Everything that can go wrong mounting, formatting, or operating on an
/// SFS image.
///
/// There is no retry and no crash recovery: a failure partway through an
/// operation may leave the on-disk image inconsistent. That is a
/// documented limitation of the filesystem, not a bug in this type.
#[derive(Debug)]
pub enum SfsError {
    /// A read or write against the backing file returned short or failed
    /// outright.
    Io(io::Error),
    /// The bitmap has no clear bit, or a fixed-size table (directory,
    /// FCB, open table) has no free slot.
    NoSpace,
    /// `create` was called with a name that already has a directory
    /// entry.
    AlreadyExists,
    /// `open`/`delete`/`getsize` referenced a name or fd that does not
    /// resolve to a live file.
    NotFound,
    /// The open table already holds the maximum of 16 entries.
    TooManyOpen,
    /// `fd` is out of the `[0, 16)` range, or names an empty open-table
    /// slot.
    BadFd,
    /// `append` was called on a handle opened for `Read`, or `read` on
    /// one opened for `Append`.
    WrongMode,
    /// `read` ran past the end of the file; the partial count already
    /// copied is still reported to the caller.
    EndOfFile,
    /// A used FCB pointed at metadata that is not actually reserved in
    /// the bitmap. This can only mean the on-disk image was corrupted
    /// or mutated outside of this API.
    InvariantViolation,
    /// A single `append` call would need to span more than one new
    /// data block.
    TooLarge,
    /// `format` was asked for a disk-size exponent that yields a block
    /// count outside `[13, 4*8*BLOCK_SIZE]`.
    InvalidSize,
}

impl fmt::Display for SfsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SfsError::Io(e) => write!(f, "I/O error: {e}"),
            SfsError::NoSpace => write!(f, "no space left"),
            SfsError::AlreadyExists => write!(f, "file already exists"),
            SfsError::NotFound => write!(f, "file not found"),
            SfsError::TooManyOpen => write!(f, "too many open files"),
            SfsError::BadFd => write!(f, "bad file descriptor"),
            SfsError::WrongMode => write!(f, "operation not permitted in this open mode"),
            SfsError::EndOfFile => write!(f, "end of file"),
            SfsError::InvariantViolation => write!(f, "on-disk metadata invariant violated"),
            SfsError::TooLarge => write!(f, "append size exceeds one block rollover"),
            SfsError::InvalidSize => write!(f, "disk size exponent out of range"),
        }
    }
}

impl std::error::Error for SfsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SfsError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for SfsError {
    fn from(e: io::Error) -> Self {
        SfsError::Io(e)
    }
}

pub type Result<T> = std::result::Result<T, SfsError>;
