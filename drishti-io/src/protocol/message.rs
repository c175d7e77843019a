//! Message dispatcher and per-type payload decoding
//!
//! [`decode`] is pure: it validates the frame, reads the common header and
//! turns the payload into a typed [`Message`]. Applying the message to the
//! map raster or the laser scan is left to [`crate::decoder`].
//!
//! All payload reads are bounded by the start of the footer marker, so a
//! frame's own footer is never mistaken for payload.

use super::constants::*;
use super::fields::{read_i16_le, read_i32_le, read_u32_le};
use super::frame::{Frame, Header};
use crate::error::{Error, Result};
use std::borrow::Cow;

/// A decoded frame: common header plus typed payload
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedMessage {
    pub header: Header,
    pub message: Message,
}

/// Typed message payloads
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Text(TextMessage),
    Laser(LaserMessage),
    Map(MapTile),
    Odometry(Odometry),
    /// Unrecognised type code, skipped downstream
    Unknown(u16),
}

impl Message {
    /// Short category name for logging and stats
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Text(_) => "text",
            Message::Laser(_) => "laser",
            Message::Map(_) => "map",
            Message::Odometry(_) => "odometry",
            Message::Unknown(_) => "unknown",
        }
    }
}

/// Free-form text emitted by the sensor firmware
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMessage {
    pub body: Vec<u8>,
}

impl TextMessage {
    /// Body as text (invalid UTF-8 replaced)
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// One raw laser point in sensor units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LaserPoint {
    pub x: i16,
    pub y: i16,
}

impl LaserPoint {
    pub const fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }

    /// Both coordinates inside the ±512 sensor window
    #[inline]
    pub fn is_valid(&self) -> bool {
        (self.x as i32).abs() < SCAN_VALID_LIMIT as i32
            && (self.y as i32).abs() < SCAN_VALID_LIMIT as i32
    }

    /// Distance from the scanner in sensor units
    #[inline]
    pub fn range(&self) -> f32 {
        let x = self.x as f32;
        let y = self.y as f32;
        (x * x + y * y).sqrt()
    }
}

/// A quarter revolution: 90 consecutive one-degree points
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaserMessage {
    /// First degree covered (expected 0, 90, 180 or 270)
    pub index: i32,
    pub points: Vec<LaserPoint>,
}

impl LaserMessage {
    /// The last quarter of a revolution triggers center estimation
    #[inline]
    pub fn completes_revolution(&self) -> bool {
        self.index == LASER_REVOLUTION_LAST_INDEX
    }
}

/// A chunk of the 256×256 occupancy raster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapTile {
    /// Byte offset into the raster
    pub address: i32,
    /// Unknown field at 0x14, kept as-is
    pub reserved: u32,
    pub data: Vec<u8>,
}

/// One wheel encoder reading
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WheelOdometry {
    pub count: i32,
    pub speed: f32,
}

/// Left/right wheel encoder state
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Odometry {
    pub left: WheelOdometry,
    pub right: WheelOdometry,
    /// Observed constant around 32000; meaning unknown
    pub unknown: i32,
}

/// Validate a frame and decode its payload
pub fn decode(frame: &Frame) -> Result<DecodedMessage> {
    frame.validate()?;
    let header = frame.header()?;
    let payload = &frame.as_bytes()[..frame.payload_end()];

    let message = match header.msg_type {
        TYPE_TEXT => Message::Text(decode_text(payload)?),
        TYPE_LASER => Message::Laser(decode_laser(payload)?),
        TYPE_MAP => Message::Map(decode_map(payload)?),
        TYPE_ODOMETRY => Message::Odometry(decode_odometry(payload)?),
        other => Message::Unknown(other),
    };

    Ok(DecodedMessage { header, message })
}

/// Slice `declared` bytes at `offset`, rejecting negative or oversized lengths
fn declared_slice(payload: &[u8], offset: usize, declared: i32) -> Result<&[u8]> {
    let truncated = Error::TruncatedFrame {
        offset,
        width: declared.max(0) as usize,
        len: payload.len(),
    };
    let width = usize::try_from(declared).map_err(|_| truncated)?;
    offset
        .checked_add(width)
        .and_then(|end| payload.get(offset..end))
        .ok_or(Error::TruncatedFrame {
            offset,
            width,
            len: payload.len(),
        })
}

fn decode_text(payload: &[u8]) -> Result<TextMessage> {
    let len = read_i32_le(payload, OFFSET_TEXT_LEN)?;
    let body = declared_slice(payload, OFFSET_TEXT_DATA, len)?;
    Ok(TextMessage {
        body: body.to_vec(),
    })
}

fn decode_laser(payload: &[u8]) -> Result<LaserMessage> {
    let index = read_i32_le(payload, OFFSET_LASER_INDEX)?;
    let points = (0..LASER_POINTS_PER_MSG)
        .map(|i| {
            let offset = OFFSET_LASER_DATA + LASER_POINT_STRIDE * i;
            Ok(LaserPoint {
                x: read_i16_le(payload, offset)?,
                y: read_i16_le(payload, offset + 2)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(LaserMessage { index, points })
}

fn decode_map(payload: &[u8]) -> Result<MapTile> {
    let size = read_i32_le(payload, OFFSET_MAP_SIZE)?;
    let address = read_i32_le(payload, OFFSET_MAP_ADDR)?;
    let reserved = read_u32_le(payload, OFFSET_MAP_RESERVED)?;
    let data = declared_slice(payload, OFFSET_MAP_DATA, size)?;
    Ok(MapTile {
        address,
        reserved,
        data: data.to_vec(),
    })
}

fn decode_odometry(payload: &[u8]) -> Result<Odometry> {
    let left_count = read_i32_le(payload, OFFSET_ODOM_LEFT_COUNT)?;
    let right_count = read_i32_le(payload, OFFSET_ODOM_RIGHT_COUNT)?;
    let left_speed = read_i16_le(payload, OFFSET_ODOM_LEFT_SPEED)?;
    let right_speed = read_i16_le(payload, OFFSET_ODOM_RIGHT_SPEED)?;
    let unknown = read_i32_le(payload, OFFSET_ODOM_UNKNOWN)?;

    Ok(Odometry {
        left: WheelOdometry {
            count: left_count,
            speed: left_speed as f32 * ODOM_SPEED_SCALE,
        },
        right: WheelOdometry {
            count: right_count,
            speed: right_speed as f32 * ODOM_SPEED_SCALE,
        },
        unknown,
    })
}
