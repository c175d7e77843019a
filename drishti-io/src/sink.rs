//! Raster snapshot handoff
//!
//! The decoder never draws anything itself. After each map update and each
//! completed revolution the application passes read-only rasters to a
//! [`RasterSink`]. [`Recorder`] keeps them for the image encoder.

use crate::raster::{LaserRaster, MapRaster};

/// Receives raster snapshots as they are produced
pub trait RasterSink {
    /// Called after every accepted map tile
    fn on_map(&mut self, map: &MapRaster);

    /// Called after every completed revolution
    fn on_revolution(&mut self, laser: &LaserRaster);
}

/// Keeps every snapshot in arrival order
#[derive(Debug, Default)]
pub struct Recorder {
    map_frames: Vec<Vec<u8>>,
    laser_frames: Vec<Vec<u8>>,
    laser_side: Option<u32>,
    record_laser: bool,
}

impl Recorder {
    /// Recorder that keeps map frames, and laser frames if `record_laser`
    pub fn new(record_laser: bool) -> Self {
        Self {
            record_laser,
            ..Self::default()
        }
    }

    pub fn map_frames(&self) -> &[Vec<u8>] {
        &self.map_frames
    }

    pub fn laser_frames(&self) -> &[Vec<u8>] {
        &self.laser_frames
    }

    /// Side length of the recorded laser frames
    pub fn laser_side(&self) -> Option<u32> {
        self.laser_side
    }
}

impl RasterSink for Recorder {
    fn on_map(&mut self, map: &MapRaster) {
        self.map_frames.push(map.as_bytes().to_vec());
    }

    fn on_revolution(&mut self, laser: &LaserRaster) {
        if !self.record_laser {
            return;
        }
        self.laser_side = Some(laser.side());
        self.laser_frames.push(laser.as_bytes().to_vec());
    }
}
