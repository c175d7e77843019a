//! Frame builders shared by the integration tests.

#![allow(dead_code)]

use drishti_io::protocol::constants::{
    FOOTER_MARKER, HEADER_MARKER, TYPE_LASER, TYPE_MAP, TYPE_ODOMETRY, TYPE_TEXT,
};

/// Wrap `body` (everything from offset 0x0c on) in header and footer.
pub fn frame(msg_type: u16, sequence: u16, timestamp: u32, body: &[u8]) -> Vec<u8> {
    let mut bytes = HEADER_MARKER.to_vec();
    bytes.extend_from_slice(&msg_type.to_le_bytes());
    bytes.extend_from_slice(&sequence.to_le_bytes());
    bytes.extend_from_slice(&timestamp.to_le_bytes());
    bytes.extend_from_slice(body);
    bytes.extend_from_slice(&FOOTER_MARKER);
    bytes
}

/// Text frame declaring `declared` bytes but carrying `text`.
pub fn text_frame_with_len(sequence: u16, declared: i32, text: &[u8]) -> Vec<u8> {
    let mut body = declared.to_le_bytes().to_vec();
    body.extend_from_slice(&[0; 0x10 - 0x0c - 4]);
    body.extend_from_slice(text);
    frame(TYPE_TEXT, sequence, 0, &body)
}

pub fn text_frame(sequence: u16, text: &[u8]) -> Vec<u8> {
    text_frame_with_len(sequence, text.len() as i32, text)
}

pub fn map_frame(sequence: u16, address: i32, data: &[u8]) -> Vec<u8> {
    let mut body = (data.len() as i32).to_le_bytes().to_vec();
    body.extend_from_slice(&address.to_le_bytes());
    body.extend_from_slice(&[0; 4]);
    body.extend_from_slice(data);
    frame(TYPE_MAP, sequence, 0, &body)
}

/// Laser frame for the quarter starting at `index`; `points` must hold 90 pairs.
pub fn laser_frame(sequence: u16, index: i32, points: &[(i16, i16)]) -> Vec<u8> {
    assert_eq!(points.len(), 90);
    let mut body = vec![0u8; 4];
    body.extend_from_slice(&index.to_le_bytes());
    for (x, y) in points {
        body.extend_from_slice(&x.to_le_bytes());
        body.extend_from_slice(&y.to_le_bytes());
    }
    frame(TYPE_LASER, sequence, 0, &body)
}

pub fn odometry_frame(
    sequence: u16,
    left_count: i32,
    right_count: i32,
    left_speed: i16,
    right_speed: i16,
) -> Vec<u8> {
    let mut body = left_count.to_le_bytes().to_vec();
    body.extend_from_slice(&right_count.to_le_bytes());
    body.extend_from_slice(&left_speed.to_le_bytes());
    body.extend_from_slice(&right_speed.to_le_bytes());
    body.extend_from_slice(&32000i32.to_le_bytes());
    frame(TYPE_ODOMETRY, sequence, 0, &body)
}

/// Four laser frames covering one revolution, point per degree from `point_at`.
pub fn revolution(first_sequence: u16, point_at: impl Fn(usize) -> (i16, i16)) -> Vec<u8> {
    let mut stream = Vec::new();
    for (k, index) in [0usize, 90, 180, 270].into_iter().enumerate() {
        let points: Vec<_> = (index..index + 90).map(&point_at).collect();
        stream.extend(laser_frame(
            first_sequence.wrapping_add(k as u16),
            index as i32,
            &points,
        ));
    }
    stream
}

/// Point on a circle of `radius` around `(cx, cy)` at `degree`, rounded to sensor units.
pub fn circle_point(cx: f64, cy: f64, radius: f64, degree: usize) -> (i16, i16) {
    let a = (degree as f64).to_radians();
    (
        (cx + radius * a.cos()).round() as i16,
        (cy + radius * a.sin()).round() as i16,
    )
}
