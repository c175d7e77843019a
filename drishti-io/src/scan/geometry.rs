//! Scanner center estimation from a completed revolution
//!
//! For every degree `a` in `[0, 180)` the four slots `a`, `a+90`, `a+180` and
//! `a+270` form two opposing ray pairs. The segments `(p0, p2)` and `(p1, p3)`
//! both pass close to the scanner, so their intersection is one vote for
//! where the scanner sits. The estimate is the mean of all in-raster votes.
//!
//! ```text
//!                 p1
//!                 │
//!          p2 ────┼──── p0
//!                 │
//!                 p3
//! ```
//!
//! Coordinates are mapped into output-raster space before intersecting, so the
//! estimate is in raster pixels. [`RasterWindow::to_sensor`] maps it back.

use super::LaserScan;
use crate::protocol::constants::{SCAN_SLOTS, SCAN_VALID_LIMIT};

/// Point in raster (or sensor) space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Affine mapping from a sensor-space window onto a square raster
///
/// The mapping scales first, then offsets: `p = v * scale + offset`. The y
/// axis is flipped so +y is up in the image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterWindow {
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
    side: u32,
}

impl RasterWindow {
    /// Window covering `[min_x, max_x] × [min_y, max_y]` on a `side`×`side` raster
    pub fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64, side: u32) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
            side,
        }
    }

    /// The full ±512 sensor range
    pub fn sensor_range(side: u32) -> Self {
        let limit = SCAN_VALID_LIMIT as f64;
        Self::new(-limit, limit, -limit, limit, side)
    }

    #[inline]
    pub fn side(&self) -> u32 {
        self.side
    }

    #[inline]
    fn scale_x(&self) -> f64 {
        self.side as f64 / (self.max_x - self.min_x)
    }

    #[inline]
    fn scale_y(&self) -> f64 {
        -(self.side as f64) / (self.max_y - self.min_y)
    }

    #[inline]
    fn offset_x(&self) -> f64 {
        -self.min_x * self.scale_x()
    }

    #[inline]
    fn offset_y(&self) -> f64 {
        self.max_y * self.side as f64 / (self.max_y - self.min_y)
    }

    /// Map a sensor-space point to raster space, `None` if it lands outside
    pub fn convert_point(&self, x: f64, y: f64) -> Option<Point2D> {
        let p = Point2D::new(
            x * self.scale_x() + self.offset_x(),
            y * self.scale_y() + self.offset_y(),
        );
        self.contains(&p).then_some(p)
    }

    /// Inverse of [`convert_point`](Self::convert_point), no bounds check
    pub fn to_sensor(&self, p: Point2D) -> Point2D {
        Point2D::new(
            (p.x - self.offset_x()) / self.scale_x(),
            (p.y - self.offset_y()) / self.scale_y(),
        )
    }

    /// Inside `[0, side)` on both axes
    #[inline]
    pub fn contains(&self, p: &Point2D) -> bool {
        let side = self.side as f64;
        p.x >= 0.0 && p.x < side && p.y >= 0.0 && p.y < side
    }
}

/// Intersect the line through `a0, a1` with the line through `b0, b1`
///
/// Uses slope-intercept form. A vertical line (`dx == 0`) is handled as
/// `x = const`. Parallel lines, including two verticals, give `None`.
pub fn intersect(a0: Point2D, a1: Point2D, b0: Point2D, b1: Point2D) -> Option<Point2D> {
    let dxa = a1.x - a0.x;
    let dxb = b1.x - b0.x;

    match (dxa == 0.0, dxb == 0.0) {
        (true, true) => None,
        (true, false) => {
            let (m, b) = slope_intercept(b0, b1);
            Some(Point2D::new(a0.x, m * a0.x + b))
        }
        (false, true) => {
            let (m, b) = slope_intercept(a0, a1);
            Some(Point2D::new(b0.x, m * b0.x + b))
        }
        (false, false) => {
            let (m1, c1) = slope_intercept(a0, a1);
            let (m2, c2) = slope_intercept(b0, b1);
            if (m1 - m2).abs() < f64::EPSILON {
                return None;
            }
            let x = (c2 - c1) / (m1 - m2);
            Some(Point2D::new(x, m1 * x + c1))
        }
    }
}

#[inline]
fn slope_intercept(p0: Point2D, p1: Point2D) -> (f64, f64) {
    let m = (p1.y - p0.y) / (p1.x - p0.x);
    (m, p0.y - m * p0.x)
}

/// Outcome of one estimation pass
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CenterPass {
    /// Angles with four valid, in-raster points
    pub candidates: usize,
    /// In-raster intersections that went into the mean
    pub intersections: usize,
    /// Mean of the intersections, `None` when there were none
    pub center: Option<Point2D>,
}

/// Holds the running center estimate
///
/// The estimate only changes when a pass finds at least one intersection;
/// failed passes leave it as it was.
#[derive(Debug, Clone)]
pub struct CenterEstimator {
    window: RasterWindow,
    center: Option<Point2D>,
}

impl CenterEstimator {
    pub fn new(window: RasterWindow) -> Self {
        Self {
            window,
            center: None,
        }
    }

    #[inline]
    pub fn window(&self) -> &RasterWindow {
        &self.window
    }

    /// Current estimate in raster coordinates
    #[inline]
    pub fn center(&self) -> Option<Point2D> {
        self.center
    }

    /// Current estimate in sensor units
    pub fn center_sensor(&self) -> Option<Point2D> {
        self.center.map(|c| self.window.to_sensor(c))
    }

    /// Run a pass over the scan and update the estimate if it succeeded
    pub fn estimate(&mut self, scan: &LaserScan) -> CenterPass {
        let pass = self.evaluate(scan);
        if let Some(center) = pass.center {
            self.center = Some(center);
        }
        pass
    }

    /// Run a pass without touching the stored estimate
    pub fn evaluate(&self, scan: &LaserScan) -> CenterPass {
        let quarter = SCAN_SLOTS / 4;
        let mut pass = CenterPass::default();
        let (mut sum_x, mut sum_y) = (0.0, 0.0);

        for a in 0..SCAN_SLOTS / 2 {
            let mut raster = [Point2D::default(); 4];
            let mut complete = true;
            for (k, p) in raster.iter_mut().enumerate() {
                let mapped = scan
                    .slot(a + k * quarter)
                    .point()
                    .and_then(|(x, y)| self.window.convert_point(x, y));
                match mapped {
                    Some(m) => *p = m,
                    None => {
                        complete = false;
                        break;
                    }
                }
            }
            if !complete {
                continue;
            }
            pass.candidates += 1;

            let [p0, p1, p2, p3] = raster;
            let Some(hit) = intersect(p0, p2, p1, p3) else {
                continue;
            };
            if !self.window.contains(&hit) {
                continue;
            }

            pass.intersections += 1;
            sum_x += hit.x;
            sum_y += hit.y;
        }

        if pass.intersections > 0 {
            let n = pass.intersections as f64;
            pass.center = Some(Point2D::new(sum_x / n, sum_y / n));
        }
        pass
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{LaserMessage, LaserPoint};
    use approx::assert_relative_eq;

    #[test]
    fn test_convert_point_scale_then_offset() {
        let window = RasterWindow::sensor_range(512);

        let origin = window.convert_point(0.0, 0.0).unwrap();
        assert_relative_eq!(origin.x, 256.0);
        assert_relative_eq!(origin.y, 256.0);

        // +y is up, so it maps to smaller row numbers
        let p = window.convert_point(100.0, 100.0).unwrap();
        assert_relative_eq!(p.x, 306.0);
        assert_relative_eq!(p.y, 206.0);

        assert!(window.convert_point(512.0, 0.0).is_none());
        assert!(window.convert_point(0.0, -512.0).is_none());
        assert!(window.convert_point(-512.0, 511.0).is_some());
    }

    #[test]
    fn test_to_sensor_inverts() {
        let window = RasterWindow::sensor_range(300);
        let p = window.convert_point(-37.0, 81.0).unwrap();
        let back = window.to_sensor(p);
        assert_relative_eq!(back.x, -37.0, epsilon = 1e-9);
        assert_relative_eq!(back.y, 81.0, epsilon = 1e-9);
    }

    #[test]
    fn test_intersect_general() {
        let hit = intersect(
            Point2D::new(0.0, 0.0),
            Point2D::new(2.0, 2.0),
            Point2D::new(0.0, 2.0),
            Point2D::new(2.0, 0.0),
        )
        .unwrap();
        assert_relative_eq!(hit.x, 1.0);
        assert_relative_eq!(hit.y, 1.0);
    }

    #[test]
    fn test_intersect_vertical() {
        let hit = intersect(
            Point2D::new(3.0, -5.0),
            Point2D::new(3.0, 5.0),
            Point2D::new(0.0, 1.0),
            Point2D::new(6.0, 4.0),
        )
        .unwrap();
        assert_relative_eq!(hit.x, 3.0);
        assert_relative_eq!(hit.y, 2.5);
    }

    #[test]
    fn test_intersect_parallel() {
        let a0 = Point2D::new(0.0, 0.0);
        let a1 = Point2D::new(4.0, 2.0);
        assert!(intersect(a0, a1, Point2D::new(0.0, 1.0), Point2D::new(4.0, 3.0)).is_none());
        // Two verticals
        assert!(intersect(
            Point2D::new(1.0, 0.0),
            Point2D::new(1.0, 9.0),
            Point2D::new(2.0, 0.0),
            Point2D::new(2.0, 9.0)
        )
        .is_none());
    }

    fn full_scan(point_at: impl Fn(usize) -> LaserPoint) -> LaserScan {
        let mut scan = LaserScan::new();
        for index in [0, 90, 180, 270] {
            let points = (0..90).map(|i| point_at(index + i)).collect();
            scan.apply(&LaserMessage {
                index: index as i32,
                points,
            })
            .unwrap();
        }
        scan
    }

    #[test]
    fn test_cross_pattern_centers_on_origin() {
        // Axis-aligned cross: horizontal and vertical diameters through (0, 0)
        let scan = full_scan(|deg| match deg / 90 {
            0 => LaserPoint::new(80, 0),
            1 => LaserPoint::new(0, 80),
            2 => LaserPoint::new(-80, 0),
            _ => LaserPoint::new(0, -80),
        });
        let mut estimator = CenterEstimator::new(RasterWindow::sensor_range(512));
        let pass = estimator.estimate(&scan);

        assert_eq!(pass.candidates, 180);
        assert_eq!(pass.intersections, 180);
        let center = estimator.center_sensor().unwrap();
        assert_relative_eq!(center.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(center.y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_failed_pass_keeps_previous_estimate() {
        let mut estimator = CenterEstimator::new(RasterWindow::sensor_range(512));
        assert!(estimator.estimate(&LaserScan::new()).center.is_none());
        assert!(estimator.center().is_none());

        let cross = full_scan(|deg| match deg / 90 {
            0 => LaserPoint::new(60, 0),
            1 => LaserPoint::new(0, 60),
            2 => LaserPoint::new(-60, 0),
            _ => LaserPoint::new(0, -60),
        });
        estimator.estimate(&cross);
        let seeded = estimator.center().unwrap();

        // All points on one horizontal line: every pair is parallel
        let flat = full_scan(|deg| LaserPoint::new(deg as i16 - 180, 0));
        let pass = estimator.estimate(&flat);
        assert_eq!(pass.candidates, 180);
        assert_eq!(pass.intersections, 0);
        assert_eq!(estimator.center(), Some(seeded));

        // An empty scan does not reset it either
        estimator.estimate(&LaserScan::new());
        assert_eq!(estimator.center(), Some(seeded));
    }
}
