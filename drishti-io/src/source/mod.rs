//! Byte sources feeding the decoder
//!
//! The decoder never blocks; any waiting happens inside a source's `read`.

use crate::config::{SourceConfig, SourceKind};
use crate::error::Result;
use std::time::Duration;

mod file;
mod serial;

pub use file::FileSource;
pub use serial::SerialSource;

/// Ordered byte stream
pub trait ByteSource: Send {
    /// Read data into buffer, returns number of bytes read
    ///
    /// `Ok(0)` means nothing arrived yet; check [`is_exhausted`](Self::is_exhausted)
    /// to tell a finished replay from an idle device.
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize>;

    /// True once a finite source has delivered its last byte
    fn is_exhausted(&self) -> bool {
        false
    }

    /// Human-readable description for logs
    fn describe(&self) -> String;
}

/// Open the source described by `config`
pub fn open(config: &SourceConfig) -> Result<Box<dyn ByteSource>> {
    match config.kind {
        SourceKind::File => Ok(Box::new(FileSource::open(&config.path)?)),
        SourceKind::Serial => Ok(Box::new(SerialSource::open_with_retry(
            &config.path,
            config.baud_rate,
            config.open_retries,
            Duration::from_millis(config.retry_delay_ms),
        )?)),
    }
}

/// In-memory source, delivering at most `chunk` bytes per read
pub struct SliceSource {
    data: Vec<u8>,
    pos: usize,
    chunk: usize,
}

impl SliceSource {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            pos: 0,
            chunk: usize::MAX,
        }
    }

    /// Limit each read to `chunk` bytes
    pub fn with_chunk(mut self, chunk: usize) -> Self {
        self.chunk = chunk.max(1);
        self
    }
}

impl ByteSource for SliceSource {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let n = buffer
            .len()
            .min(self.chunk)
            .min(self.data.len() - self.pos);
        buffer[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }

    fn is_exhausted(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn describe(&self) -> String {
        format!("memory ({} bytes)", self.data.len())
    }
}
