//! Length-prefixed byte sequences
//!
//! Every key, value, and index key in a table file is stored as a [`Seq`]:
//!
//! ```text
//! varint(len) || bytes
//! ```

use crate::error::{Result, TableError};
use crate::varint::{put_varint, read_varint, read_varint_from, varint_size, write_varint};
use std::cmp::Ordering;
use std::fmt;
use std::io::{self, Read, Write};

/// Immutable byte string with a canonical length-prefixed encoding
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Seq {
    data: Vec<u8>,
}

impl Seq {
    /// Wrap raw bytes
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self { data: data.into() }
    }

    /// Raw bytes of the sequence
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consume the sequence, returning its bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Number of raw bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the sequence holds no bytes
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Size of the canonical encoding
    pub fn encoded_len(&self) -> usize {
        varint_size(self.data.len() as u64) + self.data.len()
    }

    /// Canonical encoding: `varint(len) || bytes`
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        put_varint(self.data.len() as u64, &mut out);
        out.extend_from_slice(&self.data);
        out
    }

    /// Stream the canonical encoding, returning the number of bytes written
    pub fn encode_into<W: Write>(&self, writer: &mut W) -> io::Result<usize> {
        encode_slice_into(&self.data, writer)
    }

    /// Decode one sequence from the front of `buffer`
    ///
    /// Returns the sequence and the number of bytes consumed. Bytes after the
    /// declared length are left untouched.
    pub fn decode(buffer: &[u8]) -> Result<(Self, usize)> {
        let mut offset = 0;
        let len = read_varint(buffer, &mut offset)?;

        let available = (buffer.len() - offset) as u64;
        if len > available {
            return Err(TableError::TruncatedInput {
                needed: len,
                available,
            });
        }

        let end = offset + len as usize;
        Ok((Self::new(&buffer[offset..end]), end))
    }

    /// Decode one sequence from a sequential byte source
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let len = read_varint_from(reader)?;

        // Grow with the bytes actually present rather than trusting the prefix
        let mut data = Vec::new();
        let read = reader.by_ref().take(len).read_to_end(&mut data)? as u64;
        if read < len {
            return Err(TableError::TruncatedInput {
                needed: len,
                available: read,
            });
        }

        Ok(Self { data })
    }

    /// Non-strict bytewise comparison: `self <= other`
    pub fn less_or_equal(&self, other: &Self) -> bool {
        less_or_equal(&self.data, &other.data)
    }
}

/// Stream the canonical encoding of raw bytes without wrapping them in a
/// [`Seq`]
pub fn encode_slice_into<W: Write>(bytes: &[u8], writer: &mut W) -> io::Result<usize> {
    let prefix = write_varint(writer, bytes.len() as u64)?;
    writer.write_all(bytes)?;
    Ok(prefix + bytes.len())
}

/// Bytewise lexicographic `a <= b`
///
/// Unsigned byte comparison; a strict prefix sorts before the longer sequence.
/// Equal inputs compare as less-or-equal in both directions.
pub fn less_or_equal(a: &[u8], b: &[u8]) -> bool {
    a.cmp(b) != Ordering::Greater
}

impl PartialOrd for Seq {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Seq {
    fn cmp(&self, other: &Self) -> Ordering {
        self.data.cmp(&other.data)
    }
}

impl AsRef<[u8]> for Seq {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl From<Vec<u8>> for Seq {
    fn from(data: Vec<u8>) -> Self {
        Self { data }
    }
}

impl From<&[u8]> for Seq {
    fn from(data: &[u8]) -> Self {
        Self::new(data)
    }
}

impl From<&str> for Seq {
    fn from(data: &str) -> Self {
        Self::new(data.as_bytes())
    }
}

impl fmt::Debug for Seq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match std::str::from_utf8(&self.data) {
            Ok(s) => write!(f, "Seq({s:?})"),
            Err(_) => write!(f, "Seq({:02x?})", self.data),
        }
    }
}
