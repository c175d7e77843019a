//! Raw frame and common header fields

use super::constants::{
    FOOTER_MARKER, HEADER_MARKER, MARKER_LEN, MIN_FRAME_LEN, OFFSET_SEQUENCE, OFFSET_TIMESTAMP,
    OFFSET_TYPE,
};
use super::fields::{read_u16_le, read_u32_le};
use crate::error::{Error, Result};

/// One complete header-to-footer byte sequence cut from the stream
///
/// Frames are immutable once emitted by the synchronizer. The bytes include
/// both markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    bytes: Vec<u8>,
}

impl Frame {
    /// Wrap raw bytes as a frame (no validation, see [`Frame::validate`])
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Exclusive end of the payload region (start of the footer marker)
    #[inline]
    pub fn payload_end(&self) -> usize {
        self.bytes.len().saturating_sub(MARKER_LEN)
    }

    /// Check markers and minimum length
    pub fn validate(&self) -> Result<()> {
        if !self.bytes.starts_with(&HEADER_MARKER) {
            return Err(Error::Framing("header does not match"));
        }
        if !self.bytes.ends_with(&FOOTER_MARKER) {
            return Err(Error::Framing("footer does not match"));
        }
        if self.bytes.len() < MIN_FRAME_LEN {
            return Err(Error::Framing("frame shorter than common header"));
        }
        Ok(())
    }

    /// Extract the common header fields
    pub fn header(&self) -> Result<Header> {
        Ok(Header {
            msg_type: read_u16_le(&self.bytes, OFFSET_TYPE)?,
            sequence: read_u16_le(&self.bytes, OFFSET_SEQUENCE)?,
            timestamp: read_u32_le(&self.bytes, OFFSET_TIMESTAMP)?,
        })
    }
}

/// Fields shared by every message type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Message type code (see `TYPE_*` constants)
    pub msg_type: u16,
    /// Expected to increment by one per frame
    pub sequence: u16,
    /// Sensor timestamp (units unknown)
    pub timestamp: u32,
}
