//! Raster buffers handed to the display sink and the image encoder
//!
//! - [`MapRaster`]: the sensor's 256×256 occupancy map, patched tile by tile
//! - [`LaserRaster`]: a rendering of the current scan plus the center estimate

use crate::error::{Error, Result};
use crate::protocol::constants::{MAP_RASTER_SIZE, MAP_SIDE};
use crate::scan::{LaserScan, Point2D, RasterWindow};

/// Pixel value for a valid laser return
pub const LASER_HIT: u8 = 255;
/// Pixel value for the center marker
pub const CENTER_MARK: u8 = 128;

/// 256×256 single-channel map, one byte per pixel
///
/// Grows only by overwriting: map tiles replace a contiguous byte range and
/// nothing is ever cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapRaster {
    pixels: Box<[u8]>,
}

impl MapRaster {
    pub fn new() -> Self {
        Self {
            pixels: vec![0u8; MAP_RASTER_SIZE].into_boxed_slice(),
        }
    }

    /// Side length in pixels
    #[inline]
    pub const fn side(&self) -> u32 {
        MAP_SIDE as u32
    }

    /// Copy `data` into the raster starting at `address`
    ///
    /// The bounds are checked up front; a rejected write leaves every pixel
    /// as it was.
    pub fn write(&mut self, address: i32, data: &[u8]) -> Result<()> {
        let range = usize::try_from(address)
            .ok()
            .and_then(|start| Some(start..start.checked_add(data.len())?))
            .filter(|range| range.end <= MAP_RASTER_SIZE);
        let Some(range) = range else {
            return Err(Error::OutOfBoundsWrite {
                address: address as i64,
                size: data.len() as i64,
                capacity: MAP_RASTER_SIZE,
            });
        };

        self.pixels[range].copy_from_slice(data);
        Ok(())
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Bytes in `[start, end)`, `None` if out of range
    pub fn read(&self, start: usize, end: usize) -> Option<&[u8]> {
        self.pixels.get(start..end)
    }
}

impl Default for MapRaster {
    fn default() -> Self {
        Self::new()
    }
}

/// Square rendering of a laser scan in raster coordinates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaserRaster {
    side: u32,
    pixels: Vec<u8>,
}

impl LaserRaster {
    /// Blank raster
    pub fn new(side: u32) -> Self {
        Self {
            side,
            pixels: vec![0u8; (side as usize) * (side as usize)],
        }
    }

    /// Render valid scan points and the optional center marker
    pub fn render(scan: &LaserScan, window: &RasterWindow, center: Option<Point2D>) -> Self {
        let mut raster = Self::new(window.side());

        for (x, y) in scan.slots().iter().filter_map(|s| s.point()) {
            if let Some(p) = window.convert_point(x, y) {
                raster.set(p.x as i64, p.y as i64, LASER_HIT);
            }
        }

        if let Some(c) = center {
            let (cx, cy) = (c.x as i64, c.y as i64);
            for d in -1..=1 {
                raster.set(cx + d, cy, CENTER_MARK);
                raster.set(cx, cy + d, CENTER_MARK);
            }
        }

        raster
    }

    #[inline]
    pub fn side(&self) -> u32 {
        self.side
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Pixel at column `x`, row `y`
    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        if x < self.side && y < self.side {
            Some(self.pixels[(y as usize) * (self.side as usize) + x as usize])
        } else {
            None
        }
    }

    fn set(&mut self, x: i64, y: i64, value: u8) {
        let side = self.side as i64;
        if (0..side).contains(&x) && (0..side).contains(&y) {
            self.pixels[(y * side + x) as usize] = value;
        }
    }
}
