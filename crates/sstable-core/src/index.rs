//! Sparse block index
//!
//! The index holds one entry per data block: the **last** key written to the
//! block and the file offset of the block's **first** pair. It is stored
//! between the data section and the footer as
//!
//! ```text
//! varint(len key) key varint(offset)   ... repeated, ascending by key
//! ```

use crate::error::{Result, TableError};
use crate::seq::{Seq, less_or_equal};
use crate::varint::{read_varint, varint_size, write_varint};
use std::io::{self, Write};
use std::ops::Range;
use tracing::trace;

/// One block boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// Greatest key stored in the block
    pub key: Seq,
    /// Offset of the block's first pair from the start of the file
    pub offset: u64,
}

impl IndexEntry {
    /// Create an index entry
    pub fn new(key: impl Into<Seq>, offset: u64) -> Self {
        Self {
            key: key.into(),
            offset,
        }
    }

    /// Encoded size in the index block
    pub fn encoded_len(&self) -> usize {
        self.key.encoded_len() + varint_size(self.offset)
    }

    /// Write `encode(key) || varint(offset)`, returning bytes written
    pub fn encode_into<W: Write>(&self, writer: &mut W) -> io::Result<usize> {
        let key_len = self.key.encode_into(writer)?;
        let offset_len = write_varint(writer, self.offset)?;
        Ok(key_len + offset_len)
    }

    /// Decode one entry from the front of `data`, returning it and the bytes
    /// consumed
    pub fn decode(data: &[u8]) -> Result<(Self, usize)> {
        let (key, mut consumed) = Seq::decode(data)?;
        let offset = read_varint(data, &mut consumed)?;
        Ok((Self { key, offset }, consumed))
    }
}

/// In-memory sparse index of a table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SparseIndex {
    entries: Vec<IndexEntry>,
    /// End of the data section, which is where the index block starts
    data_end: u64,
}

impl SparseIndex {
    /// Build an index from entries already in ascending key order
    pub fn new(entries: Vec<IndexEntry>, data_end: u64) -> Self {
        Self { entries, data_end }
    }

    /// Decode an index block
    ///
    /// `block` is the byte range `[index_offset, file_len - 16)` and
    /// `data_end` is `index_offset`. Entries keep their on-disk order; the
    /// writer guarantees it is ascending by key.
    pub fn parse(block: &[u8], data_end: u64) -> Result<Self> {
        let mut entries = Vec::new();
        let mut pos = 0;
        let mut previous_offset = 0u64;

        while pos < block.len() {
            let (entry, consumed) = IndexEntry::decode(&block[pos..]).map_err(|e| match e {
                TableError::TruncatedInput { needed, available } => {
                    TableError::CorruptIndex(format!(
                        "index entry {} at byte {pos} truncated: needed {needed}, {available} available",
                        entries.len()
                    ))
                }
                other => other,
            })?;

            if entry.offset > data_end || entry.offset < previous_offset {
                return Err(TableError::CorruptIndex(format!(
                    "index entry {} points to offset {} outside data section (previous {}, end {})",
                    entries.len(),
                    entry.offset,
                    previous_offset,
                    data_end
                )));
            }

            trace!(
                "Index entry {}: last_key={:?}, offset={}",
                entries.len(),
                entry.key,
                entry.offset
            );

            previous_offset = entry.offset;
            entries.push(entry);
            pos += consumed;
        }

        Ok(Self { entries, data_end })
    }

    /// Locate the block that may contain `key`
    ///
    /// Returns the position of the first entry whose key satisfies
    /// `key <= entry.key`, or `None` when `key` is greater than every block's
    /// last key.
    pub fn search(&self, key: &[u8]) -> Option<usize> {
        let idx = self
            .entries
            .partition_point(|entry| !less_or_equal(key, entry.key.as_bytes()));
        (idx < self.entries.len()).then_some(idx)
    }

    /// Byte range of block `idx` within the data section
    pub fn block_range(&self, idx: usize) -> Option<Range<u64>> {
        let start = self.entries.get(idx)?.offset;
        let end = self
            .entries
            .get(idx + 1)
            .map_or(self.data_end, |next| next.offset);
        Some(start..end)
    }

    /// All entries in ascending key order
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// Number of blocks
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the index has no blocks (empty table)
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Offset where the data section ends and the index block begins
    pub fn data_end(&self) -> u64 {
        self.data_end
    }
}
