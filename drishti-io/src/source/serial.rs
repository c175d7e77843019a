//! Live serial source

use super::ByteSource;
use crate::error::{Error, Result};
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::io::Read;
use std::thread;
use std::time::Duration;

const SERIAL_READ_TIMEOUT_MS: u64 = 50;

/// Serial port wrapper for the rangefinder's UART
pub struct SerialSource {
    port: Box<dyn SerialPort>,
    path: String,
}

impl SerialSource {
    /// Open a serial port
    ///
    /// # Arguments
    /// * `path` - Serial port path (e.g., "/dev/ttyUSB0")
    /// * `baud_rate` - Baud rate (e.g., 115200)
    pub fn open(path: &str, baud_rate: u32) -> Result<Self> {
        let port = serialport::new(path, baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(Duration::from_millis(SERIAL_READ_TIMEOUT_MS))
            .open()?;

        log::info!("Opened serial port: {} at {} baud", path, baud_rate);

        Ok(Self {
            port,
            path: path.to_string(),
        })
    }

    /// Open a serial port, retrying up to `attempts` times
    pub fn open_with_retry(
        path: &str,
        baud_rate: u32,
        attempts: u32,
        delay: Duration,
    ) -> Result<Self> {
        let attempts = attempts.max(1);
        let mut last_err = None;

        for attempt in 1..=attempts {
            match Self::open(path, baud_rate) {
                Ok(source) => return Ok(source),
                Err(e) => {
                    log::warn!(
                        "Failed to open {} (attempt {}/{}): {}",
                        path,
                        attempt,
                        attempts,
                        e
                    );
                    last_err = Some(e);
                    if attempt < attempts {
                        thread::sleep(delay);
                    }
                }
            }
        }

        Err(last_err.unwrap_or_else(|| Error::Other(format!("Could not open {}", path))))
    }
}

impl ByteSource for SerialSource {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        match self.port.read(buffer) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => Ok(0),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    fn describe(&self) -> String {
        format!("serial {}", self.path)
    }
}
