//! Rolling 360° laser scan
//!
//! Each laser message fills 90 one-degree slots starting at its `index`; four
//! messages (0, 90, 180, 270) make a revolution. Slots are overwritten in
//! place, so a slot keeps the previous revolution's point until its quarter
//! arrives again.

pub mod geometry;

pub use geometry::{CenterEstimator, CenterPass, Point2D, RasterWindow};

use crate::error::{Error, Result};
use crate::protocol::constants::SCAN_SLOTS;
use crate::protocol::{LaserMessage, LaserPoint};

/// One degree of the scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScanSlot {
    pub x: i16,
    pub y: i16,
    /// Both coordinates inside the ±512 sensor window
    pub valid: bool,
}

impl ScanSlot {
    pub const EMPTY: ScanSlot = ScanSlot {
        x: 0,
        y: 0,
        valid: false,
    };

    pub fn from_point(point: LaserPoint) -> Self {
        Self {
            x: point.x,
            y: point.y,
            valid: point.is_valid(),
        }
    }

    /// Coordinates in sensor units, `None` when invalid
    #[inline]
    pub fn point(&self) -> Option<(f64, f64)> {
        self.valid.then_some((self.x as f64, self.y as f64))
    }
}

/// 360-slot scan buffer, one slot per integer degree
#[derive(Debug, Clone)]
pub struct LaserScan {
    slots: [ScanSlot; SCAN_SLOTS],
}

impl LaserScan {
    pub fn new() -> Self {
        Self {
            slots: [ScanSlot::EMPTY; SCAN_SLOTS],
        }
    }

    /// Write a quarter-revolution message into its slots
    ///
    /// Rejects the whole message (buffer untouched) when `index` would place
    /// any point outside the 360 slots.
    pub fn apply(&mut self, msg: &LaserMessage) -> Result<()> {
        let start = usize::try_from(msg.index).ok().filter(|&start| {
            start
                .checked_add(msg.points.len())
                .is_some_and(|end| end <= SCAN_SLOTS)
        });
        let Some(start) = start else {
            return Err(Error::OutOfBoundsWrite {
                address: msg.index as i64,
                size: msg.points.len() as i64,
                capacity: SCAN_SLOTS,
            });
        };

        for (slot, point) in self.slots[start..].iter_mut().zip(&msg.points) {
            *slot = ScanSlot::from_point(*point);
        }
        Ok(())
    }

    /// Slot at `degree` (wraps modulo 360)
    #[inline]
    pub fn slot(&self, degree: usize) -> ScanSlot {
        self.slots[degree % SCAN_SLOTS]
    }

    #[inline]
    pub fn slots(&self) -> &[ScanSlot] {
        &self.slots
    }

    pub fn valid_count(&self) -> usize {
        self.slots.iter().filter(|s| s.valid).count()
    }
}

impl Default for LaserScan {
    fn default() -> Self {
        Self::new()
    }
}
