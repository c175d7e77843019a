//! Configuration for DrishtiIO
//!
//! Loads configuration from a TOML file. Every field has a default, so a
//! missing section falls back to replaying `capture.bin` into `map.gif`.

use crate::error::{Error, Result};
use crate::protocol::constants::MAX_MAP_FRAME_LEN;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::ops::BitOr;
use std::path::Path;
use std::str::FromStr;

/// Top-level application configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the byte stream comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Replay a captured dump
    File,
    /// Live serial device
    Serial,
}

/// Byte source configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SourceConfig {
    pub kind: SourceKind,
    /// Capture file path or serial device path
    pub path: String,
    /// Serial baud rate (ignored for files)
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    /// Attempts to open a serial device before giving up
    #[serde(default = "default_open_retries")]
    pub open_retries: u32,
    /// Delay between open attempts
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// Cap on a frame still waiting for its footer; unbounded when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_frame_len: Option<usize>,
}

fn default_baud_rate() -> u32 {
    115200
}

fn default_open_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    500
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::File,
            path: "capture.bin".to_string(),
            baud_rate: default_baud_rate(),
            open_retries: default_open_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            max_frame_len: None,
        }
    }
}

/// Image outputs written at the end of the run
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Animated GIF of every map update
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_animation: Option<String>,
    /// Animated GIF of every completed revolution
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub laser_animation: Option<String>,
    /// Final map as an 8-bit grayscale image (PGM by extension)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_image: Option<String>,
    /// Side length of the rendered laser raster
    #[serde(default = "default_laser_raster_size")]
    pub laser_raster_size: u32,
    /// Delay between animation frames
    #[serde(default = "default_frame_delay_ms")]
    pub frame_delay_ms: u32,
}

fn default_laser_raster_size() -> u32 {
    512
}

fn default_frame_delay_ms() -> u32 {
    10
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            map_animation: Some("map.gif".to_string()),
            laser_animation: None,
            map_image: None,
            laser_raster_size: default_laser_raster_size(),
            frame_delay_ms: default_frame_delay_ms(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` takes precedence
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Message categories that produce trace output
    #[serde(default)]
    pub verbosity: Verbosity,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            verbosity: Verbosity::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Reject values the pipeline cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.source.path.is_empty() {
            return Err(Error::Config("source.path must not be empty".to_string()));
        }
        if !(16..=4096).contains(&self.output.laser_raster_size) {
            return Err(Error::Config(format!(
                "output.laser_raster_size must be within 16..=4096, got {}",
                self.output.laser_raster_size
            )));
        }
        if let Some(max) = self.source.max_frame_len {
            if max < MAX_MAP_FRAME_LEN {
                return Err(Error::Config(format!(
                    "source.max_frame_len must be at least {} to fit a full map tile, got {}",
                    MAX_MAP_FRAME_LEN, max
                )));
            }
        }
        if self.source.kind == SourceKind::Serial && self.source.baud_rate == 0 {
            return Err(Error::Config("source.baud_rate must be non-zero".to_string()));
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            output: OutputConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

// ============================================================================
// Verbosity
// ============================================================================

/// Bitmask of message categories that produce trace output
///
/// Only gates logging. Decoding behaves identically for every mask.
/// Serialized as a list of category names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Verbosity(u8);

impl Verbosity {
    pub const NONE: Verbosity = Verbosity(0);
    pub const DEBUG: Verbosity = Verbosity(0x01);
    pub const TEXT: Verbosity = Verbosity(0x02);
    pub const LASER: Verbosity = Verbosity(0x04);
    pub const MAP: Verbosity = Verbosity(0x08);
    pub const ODOMETRY: Verbosity = Verbosity(0x10);
    pub const ALL: Verbosity = Verbosity(0x1F);

    const NAMES: [(&'static str, Verbosity); 5] = [
        ("debug", Self::DEBUG),
        ("text", Self::TEXT),
        ("laser", Self::LASER),
        ("map", Self::MAP),
        ("odometry", Self::ODOMETRY),
    ];

    /// Build from raw bits; unknown bits are dropped
    pub const fn from_bits(bits: u8) -> Self {
        Verbosity(bits & Self::ALL.0)
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn contains(self, other: Verbosity) -> bool {
        self.0 & other.0 == other.0
    }

    /// Category names set in this mask
    pub fn names(self) -> Vec<&'static str> {
        Self::NAMES
            .iter()
            .filter(|(_, flag)| self.contains(*flag))
            .map(|(name, _)| *name)
            .collect()
    }
}

impl Default for Verbosity {
    /// Text, laser and map traces, no debug or odometry
    fn default() -> Self {
        Self::TEXT | Self::LASER | Self::MAP
    }
}

impl BitOr for Verbosity {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Verbosity(self.0 | rhs.0)
    }
}

impl FromStr for Verbosity {
    type Err = Error;

    /// Accepts a comma-separated list (`"text,map"`), `all`, `none`, or a
    /// numeric mask (`"0x0c"`, `"12"`)
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix("0x") {
            return u8::from_str_radix(hex, 16)
                .map(Self::from_bits)
                .map_err(|e| Error::Config(format!("invalid verbosity mask {:?}: {}", s, e)));
        }
        if let Ok(bits) = s.parse::<u8>() {
            return Ok(Self::from_bits(bits));
        }

        let mut mask = Self::NONE;
        for name in s.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            mask = mask | Self::from_name(name)?;
        }
        Ok(mask)
    }
}

impl Verbosity {
    fn from_name(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "all" => Ok(Self::ALL),
            "none" => Ok(Self::NONE),
            lower => Self::NAMES
                .iter()
                .find(|(n, _)| *n == lower)
                .map(|(_, flag)| *flag)
                .ok_or_else(|| Error::Config(format!("unknown verbosity category {:?}", name))),
        }
    }
}

impl TryFrom<Vec<String>> for Verbosity {
    type Error = Error;

    fn try_from(names: Vec<String>) -> Result<Self> {
        names
            .iter()
            .try_fold(Self::NONE, |mask, name| Ok(mask | Self::from_name(name)?))
    }
}

impl From<Verbosity> for Vec<String> {
    fn from(v: Verbosity) -> Self {
        v.names().into_iter().map(String::from).collect()
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            return f.write_str("none");
        }
        write!(f, "{}", self.names().join(","))
    }
}
