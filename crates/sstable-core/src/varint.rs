//! Unsigned LEB128 variable-length integers
//!
//! Seven payload bits per byte, least significant group first, high bit set
//! on every byte except the last. A `u64` needs at most [`MAX_VARINT_LEN`]
//! bytes.

use crate::error::{Result, TableError};
use std::io::{self, Read, Write};

/// Longest encoding of a `u64`
pub const MAX_VARINT_LEN: usize = 10;

/// Encode `value` into a stack buffer, returning the buffer and used length
fn encode(mut value: u64) -> ([u8; MAX_VARINT_LEN], usize) {
    let mut buf = [0u8; MAX_VARINT_LEN];
    let mut len = 0;

    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;

        if value != 0 {
            byte |= 0x80; // Set continuation bit
        }

        buf[len] = byte;
        len += 1;

        if value == 0 {
            break;
        }
    }

    (buf, len)
}

/// Append the varint encoding of `value` to `data`
pub fn put_varint(value: u64, data: &mut Vec<u8>) {
    let (buf, len) = encode(value);
    data.extend_from_slice(&buf[..len]);
}

/// Write the varint encoding of `value`, returning the number of bytes written
pub fn write_varint<W: Write>(writer: &mut W, value: u64) -> io::Result<usize> {
    let (buf, len) = encode(value);
    writer.write_all(&buf[..len])?;
    Ok(len)
}

/// Read a varint from `data` starting at `*offset`
///
/// On success `*offset` points just past the varint. Running off the end of
/// `data` is reported as [`TableError::TruncatedInput`].
pub fn read_varint(data: &[u8], offset: &mut usize) -> Result<u64> {
    let start = *offset;
    let mut result = 0u64;
    let mut shift = 0u32;

    loop {
        let Some(&byte) = data.get(*offset) else {
            let consumed = offset.saturating_sub(start);
            return Err(TableError::TruncatedInput {
                needed: consumed as u64 + 1,
                available: data.len().saturating_sub(start) as u64,
            });
        };
        *offset += 1;

        let payload = u64::from(byte & 0x7F);
        // Tenth byte only has room for bit 63
        if shift == 63 && payload > 1 {
            return Err(TableError::MalformedVarint { position: *offset - 1 });
        }
        result |= payload << shift;

        if (byte & 0x80) == 0 {
            return Ok(result);
        }

        shift += 7;
        if shift > 63 {
            return Err(TableError::MalformedVarint { position: *offset - 1 });
        }
    }
}

/// Read a varint from a sequential byte source
pub fn read_varint_from<R: Read>(reader: &mut R) -> Result<u64> {
    let mut result = 0u64;
    let mut shift = 0u32;
    let mut consumed = 0usize;
    let mut buffer = [0u8; 1];

    loop {
        if let Err(e) = reader.read_exact(&mut buffer) {
            return Err(if e.kind() == io::ErrorKind::UnexpectedEof {
                TableError::TruncatedInput {
                    needed: consumed as u64 + 1,
                    available: consumed as u64,
                }
            } else {
                TableError::Io(e)
            });
        }
        let byte = buffer[0];
        consumed += 1;

        let payload = u64::from(byte & 0x7F);
        if shift == 63 && payload > 1 {
            return Err(TableError::MalformedVarint {
                position: consumed - 1,
            });
        }
        result |= payload << shift;

        if (byte & 0x80) == 0 {
            return Ok(result);
        }

        shift += 7;
        if shift > 63 {
            return Err(TableError::MalformedVarint {
                position: consumed - 1,
            });
        }
    }
}

/// Number of bytes the varint encoding of `value` occupies
pub fn varint_size(value: u64) -> usize {
    if value == 0 {
        1
    } else {
        (64 - value.leading_zeros()).div_ceil(7) as usize
    }
}
