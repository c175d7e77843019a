//! Capture file replay

use super::ByteSource;
use crate::error::Result;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

/// Replays a captured dump byte for byte
pub struct FileSource {
    reader: BufReader<File>,
    path: PathBuf,
    len: u64,
    exhausted: bool,
}

impl FileSource {
    /// Open a capture file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        let len = file.metadata()?.len();

        log::info!("Opened capture file: {} ({} bytes)", path.display(), len);

        Ok(Self {
            reader: BufReader::new(file),
            path,
            len,
            exhausted: false,
        })
    }

    /// File size at open time
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl ByteSource for FileSource {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        if self.exhausted {
            return Ok(0);
        }
        let n = self.reader.read(buffer)?;
        if n == 0 && !buffer.is_empty() {
            self.exhausted = true;
        }
        Ok(n)
    }

    fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}
