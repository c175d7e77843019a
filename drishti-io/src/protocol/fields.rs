//! Little-endian field readers
//!
//! Every reader checks `offset + width` against the slice length and returns
//! [`Error::TruncatedFrame`] instead of reading past the end.

use crate::error::{Error, Result};

#[inline]
fn field<const W: usize>(bytes: &[u8], offset: usize) -> Result<[u8; W]> {
    offset
        .checked_add(W)
        .and_then(|end| bytes.get(offset..end))
        .and_then(|slice| slice.try_into().ok())
        .ok_or(Error::TruncatedFrame {
            offset,
            width: W,
            len: bytes.len(),
        })
}

/// Read a signed 32-bit little-endian integer
#[inline]
pub fn read_i32_le(bytes: &[u8], offset: usize) -> Result<i32> {
    Ok(i32::from_le_bytes(field::<4>(bytes, offset)?))
}

/// Read a signed 16-bit little-endian integer
#[inline]
pub fn read_i16_le(bytes: &[u8], offset: usize) -> Result<i16> {
    Ok(i16::from_le_bytes(field::<2>(bytes, offset)?))
}

/// Read an unsigned 16-bit little-endian integer (header type/sequence)
#[inline]
pub fn read_u16_le(bytes: &[u8], offset: usize) -> Result<u16> {
    Ok(u16::from_le_bytes(field::<2>(bytes, offset)?))
}

/// Read an unsigned 32-bit little-endian integer (header timestamp)
#[inline]
pub fn read_u32_le(bytes: &[u8], offset: usize) -> Result<u32> {
    Ok(u32::from_le_bytes(field::<4>(bytes, offset)?))
}
