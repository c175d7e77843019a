//! Byte-at-a-time frame synchronizer
//!
//! There is no length field to trust, so frames are cut purely by pattern:
//! after every appended byte the trailing four bytes are compared against the
//! footer marker first, then the header marker.
//!
//! ```text
//!   ... garbage ... [01 02 03 04] type seq ts payload ... [40 30 20 10]
//!                    └─ header: buffer reset to these 4 ─┘ └─ footer: emit ─┘
//! ```
//!
//! A header match throws away everything accumulated before it, which is how
//! the reader recovers from line noise or a capture that starts mid-frame.
//! When the trailing bytes match both markers (possible only with custom
//! markers), the footer wins and the frame is emitted.
//!
//! The buffer is unbounded by default. [`FrameSynchronizer::with_max_len`]
//! sets a cap for live links where a lost footer would otherwise grow it
//! forever. Past the cap the partial frame is discarded and nothing is
//! emitted until the next header.

use super::constants::{FOOTER_MARKER, HEADER_MARKER, MARKER_LEN};
use super::frame::Frame;

/// Resynchronizing frame accumulator
pub struct FrameSynchronizer {
    buffer: Vec<u8>,
    header: [u8; MARKER_LEN],
    footer: [u8; MARKER_LEN],
    max_len: Option<usize>,
    /// Set after an overflow, cleared by the next header
    discarding: bool,
    overflows: u64,
}

impl FrameSynchronizer {
    /// Synchronizer for the rangefinder's `01 02 03 04` / `40 30 20 10` markers
    pub fn new() -> Self {
        Self::with_markers(HEADER_MARKER, FOOTER_MARKER)
    }

    /// Synchronizer with custom markers
    pub fn with_markers(header: [u8; MARKER_LEN], footer: [u8; MARKER_LEN]) -> Self {
        Self {
            buffer: Vec::with_capacity(1024),
            header,
            footer,
            max_len: None,
            discarding: false,
            overflows: 0,
        }
    }

    /// Cap the accumulation buffer at `max_len` bytes
    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = Some(max_len.max(MARKER_LEN));
        self
    }

    /// Append one byte, returning a frame when the footer completes
    pub fn feed(&mut self, byte: u8) -> Option<Frame> {
        self.buffer.push(byte);

        if self.buffer.ends_with(&self.footer) {
            let bytes = std::mem::replace(&mut self.buffer, Vec::with_capacity(1024));
            if self.discarding {
                // Tail of the frame that overflowed
                self.discarding = false;
                return None;
            }
            return Some(Frame::new(bytes));
        }

        if self.buffer.ends_with(&self.header) {
            self.buffer.clear();
            self.buffer.extend_from_slice(&self.header);
            self.discarding = false;
            return None;
        }

        if let Some(max_len) = self.max_len {
            if self.buffer.len() > max_len {
                log::warn!(
                    "Frame buffer exceeded {} bytes without a footer, discarding",
                    max_len
                );
                self.overflows += 1;
                self.discarding = true;
                // Keep a possible partial marker at the tail
                let start = self.buffer.len() - (MARKER_LEN - 1);
                self.buffer.drain(..start);
            }
        }

        None
    }

    /// Feed a batch of bytes; same frames as feeding them one at a time
    pub fn feed_slice(&mut self, bytes: &[u8]) -> Vec<Frame> {
        bytes.iter().filter_map(|&b| self.feed(b)).collect()
    }

    /// Bytes currently accumulated
    #[inline]
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }

    /// Number of times the cap forced a discard
    #[inline]
    pub fn overflows(&self) -> u64 {
        self.overflows
    }
}

impl Default for FrameSynchronizer {
    fn default() -> Self {
        Self::new()
    }
}
