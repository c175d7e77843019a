//! Error types for DrishtiIO
//!
//! Stream errors (`Framing`, `TruncatedFrame`, `OutOfBoundsWrite`) are local to
//! a single frame: the frame is dropped and decoding continues with the next
//! byte. The remaining variants come from the byte source, the configuration
//! file or the image encoder and end the run.

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// DrishtiIO error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Header or footer marker missing on a frame boundary
    #[error("Framing error: {0}")]
    Framing(&'static str),

    /// A field offset or declared length runs past the end of the frame
    #[error("Truncated frame: {width} bytes at offset {offset:#06x} exceed frame length {len}")]
    TruncatedFrame {
        /// Offset of the field that could not be read
        offset: usize,
        /// Width of the field in bytes
        width: usize,
        /// Bytes actually available
        len: usize,
    },

    /// A write would land outside the target buffer
    #[error("Out of bounds write: {size} bytes at {address} exceed capacity {capacity}")]
    OutOfBoundsWrite {
        /// Requested start address (as declared on the wire)
        address: i64,
        /// Requested write size
        size: i64,
        /// Capacity of the target buffer
        capacity: usize,
    },

    /// Serial port error
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Image encoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(e: toml::ser::Error) -> Self {
        Error::Config(e.to_string())
    }
}
