//! Constants for the rangefinder telemetry protocol
//!
//! Offsets are absolute positions inside a frame (header marker at 0x00).

// Frame markers
pub const HEADER_MARKER: [u8; 4] = [0x01, 0x02, 0x03, 0x04];
pub const FOOTER_MARKER: [u8; 4] = [0x40, 0x30, 0x20, 0x10];
pub const MARKER_LEN: usize = 4;

// Message type codes
pub const TYPE_ODOMETRY: u16 = 0x01;
pub const TYPE_LASER: u16 = 0x05;
pub const TYPE_MAP: u16 = 0x09;
pub const TYPE_TEXT: u16 = 0x11;

// Common header
pub const OFFSET_TYPE: usize = 0x04;
pub const OFFSET_SEQUENCE: usize = 0x06;
pub const OFFSET_TIMESTAMP: usize = 0x08;

// Text messages
pub const OFFSET_TEXT_LEN: usize = 0x0c;
pub const OFFSET_TEXT_DATA: usize = 0x10;

// Laser messages
pub const OFFSET_LASER_INDEX: usize = 0x10;
pub const OFFSET_LASER_DATA: usize = 0x14;
pub const LASER_POINTS_PER_MSG: usize = 90;
pub const LASER_POINT_STRIDE: usize = 4;

// Map messages
pub const OFFSET_MAP_SIZE: usize = 0x0c;
pub const OFFSET_MAP_ADDR: usize = 0x10;
pub const OFFSET_MAP_RESERVED: usize = 0x14; // Unknown, kept opaque
pub const OFFSET_MAP_DATA: usize = 0x18;

// Odometry messages
pub const OFFSET_ODOM_LEFT_COUNT: usize = 0x0c;
pub const OFFSET_ODOM_RIGHT_COUNT: usize = 0x10;
pub const OFFSET_ODOM_LEFT_SPEED: usize = 0x14;
pub const OFFSET_ODOM_RIGHT_SPEED: usize = 0x16;
pub const OFFSET_ODOM_UNKNOWN: usize = 0x18; // Observed constant ~32000
pub const ODOM_SPEED_SCALE: f32 = 0.001;

// Frame sizes
pub const MIN_FRAME_LEN: usize = 12; // HEADER(4) + TYPE(2) + SEQ(2) + footer/timestamp(4)

// Map raster geometry
pub const MAP_SIDE: usize = 256;
pub const MAP_RASTER_SIZE: usize = MAP_SIDE * MAP_SIDE;

/// Length of a frame carrying a full-raster map tile
///
/// Lower bound for an accumulation cap: anything smaller would drop legal map tiles.
/// Text frames declare an i32 length and are not bounded by this.
pub const MAX_MAP_FRAME_LEN: usize = OFFSET_MAP_DATA + MAP_RASTER_SIZE + MARKER_LEN;

// Laser scan geometry
pub const SCAN_SLOTS: usize = 360;
pub const SCAN_VALID_LIMIT: i16 = 512; // |x| and |y| must stay below this
pub const LASER_REVOLUTION_LAST_INDEX: i32 = 270;
