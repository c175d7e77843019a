//! DrishtiIO - decoder for the framed telemetry stream of a robot vacuum's
//! laser rangefinder board
//!
//! The board multiplexes text logs, laser scans, occupancy-map tiles and wheel
//! odometry into one byte stream. This library recovers frames from that
//! stream, decodes them, keeps a 256×256 map raster and a rolling 360° scan,
//! and estimates where the scanner sits after every revolution.
//!
//! ## Pipeline
//!
//! - [`source`]: replay files or a live serial port
//! - [`protocol`]: frame synchronization and message decoding
//! - [`decoder`]: per-stream state, statistics and category logging
//! - [`sink`] / [`encoder`]: raster snapshots and animated GIF output
//! - [`app`]: the loop tying them together

pub mod app;
pub mod config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod protocol;
pub mod raster;
pub mod scan;
pub mod sink;
pub mod source;

// Re-export commonly used types
pub use app::App;
pub use config::{AppConfig, Verbosity};
pub use decoder::{DecodeStats, Effect, TelemetryDecoder, Update};
pub use error::{Error, Result};
pub use raster::{LaserRaster, MapRaster};
pub use scan::{LaserScan, Point2D, RasterWindow};
