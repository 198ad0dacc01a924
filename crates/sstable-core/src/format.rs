//! Table file format constants and footer handling
//!
//! The footer is always the **last 16 bytes** of a table file:
//!
//! ```text
//! [index_offset: u64 LE][format_version: u64 LE]
//! ```
//!
//! Its position does not depend on the version, so a reader can always locate
//! it before deciding whether it understands the rest of the file.

use crate::error::{Result, TableError};
use binrw::{BinRead, BinWrite};
use std::io::Cursor;

/// Format version written by this crate
pub const FORMAT_VERSION: u64 = 0;

/// Size of the footer in bytes: 8 (`index_offset`) + 8 (`format_version`)
pub const FOOTER_SIZE: usize = 16;

/// Default minimum payload per data block (4 KiB)
pub const DEFAULT_BLOCK_SIZE: usize = 1 << 12;

/// Trailer locating the index block
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct Footer {
    /// Byte offset where the index block begins
    pub index_offset: u64,
    /// On-disk format version
    pub format_version: u64,
}

impl Footer {
    /// Create a footer for the current format version
    pub fn new(index_offset: u64) -> Self {
        Self {
            index_offset,
            format_version: FORMAT_VERSION,
        }
    }

    /// Serialize to the fixed 16-byte layout
    pub fn to_bytes(&self) -> Result<[u8; FOOTER_SIZE]> {
        let mut cursor = Cursor::new([0u8; FOOTER_SIZE]);
        BinWrite::write(self, &mut cursor)?;
        Ok(cursor.into_inner())
    }

    /// Decode the footer from the tail of a complete table file
    ///
    /// Only the final [`FOOTER_SIZE`] bytes are examined.
    pub fn from_file_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < FOOTER_SIZE {
            return Err(TableError::TruncatedInput {
                needed: FOOTER_SIZE as u64,
                available: data.len() as u64,
            });
        }

        let mut cursor = Cursor::new(&data[data.len() - FOOTER_SIZE..]);
        Ok(<Self as BinRead>::read(&mut cursor)?)
    }

    /// Reject versions this reader does not understand
    pub fn validate_version(&self) -> Result<()> {
        if self.format_version != FORMAT_VERSION {
            return Err(TableError::UnsupportedVersion(self.format_version));
        }
        Ok(())
    }

    /// Byte range of the index block within a file of `file_len` bytes
    ///
    /// Fails when the recorded offset points past the start of the footer.
    pub fn index_range(&self, file_len: usize) -> Result<std::ops::Range<usize>> {
        let index_end = file_len.saturating_sub(FOOTER_SIZE);
        let index_start = usize::try_from(self.index_offset)
            .ok()
            .filter(|&start| start <= index_end)
            .ok_or_else(|| {
                TableError::CorruptIndex(format!(
                    "index offset {} beyond footer at {}",
                    self.index_offset, index_end
                ))
            })?;

        Ok(index_start..index_end)
    }
}
