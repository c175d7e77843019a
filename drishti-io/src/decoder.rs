//! Stream decoder: synchronizer, dispatcher and interpreters wired together
//!
//! [`TelemetryDecoder`] owns every piece of per-stream state:
//!
//! ```text
//! byte ──► FrameSynchronizer ──► decode() ──► interpret ──┬─► MapRaster
//!                                                         ├─► LaserScan ──► CenterEstimator
//!                                                         └─► Odometry
//! ```
//!
//! Each byte is processed to completion before the next one is accepted.
//! Frame-level errors are logged and counted, never propagated out of
//! [`TelemetryDecoder::update`]; one bad frame does not stop the stream.
//! Streams that are decoded in parallel need one decoder each.

use crate::config::Verbosity;
use crate::error::{Error, Result};
use crate::protocol::{
    decode, DecodedMessage, Frame, FrameSynchronizer, Header, LaserMessage, MapTile, Message,
    Odometry, TextMessage,
};
use crate::raster::{LaserRaster, MapRaster};
use crate::scan::{CenterEstimator, CenterPass, LaserScan, Point2D, RasterWindow};

const STATS_LOG_INTERVAL: u64 = 1000;

/// State change caused by a decoded message
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    /// Text or unknown type: nothing retained
    None,
    /// Map raster patched
    MapUpdated,
    /// Scan slots overwritten, revolution still incomplete
    ScanUpdated,
    /// Last quarter arrived and the center pass ran
    RevolutionComplete(CenterPass),
    /// Wheel state replaced
    OdometryUpdated,
}

/// A successfully interpreted frame
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub decoded: DecodedMessage,
    pub effect: Effect,
}

/// Frame and error counters for one stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeStats {
    /// Frames emitted by the synchronizer
    pub frames: u64,
    pub text: u64,
    pub laser: u64,
    pub map: u64,
    pub odometry: u64,
    pub unknown: u64,
    pub revolutions: u64,
    /// Revolutions whose pass produced a new center
    pub centers: u64,
    pub framing_errors: u64,
    pub truncated: u64,
    pub out_of_bounds: u64,
    /// Accumulation buffer discards on runaway input
    pub overflows: u64,
    /// Frames whose sequence was not previous + 1
    pub sequence_gaps: u64,
    pub last_sequence: Option<u16>,
}

impl DecodeStats {
    /// Total dropped frames
    pub fn errors(&self) -> u64 {
        self.framing_errors + self.truncated + self.out_of_bounds
    }

    fn record_error(&mut self, err: &Error) {
        match err {
            Error::Framing(_) => self.framing_errors += 1,
            Error::TruncatedFrame { .. } => self.truncated += 1,
            Error::OutOfBoundsWrite { .. } => self.out_of_bounds += 1,
            _ => {}
        }
    }

    /// Track sequence continuity, returning true on a gap
    fn record_sequence(&mut self, sequence: u16) -> bool {
        let gap = self
            .last_sequence
            .is_some_and(|last| last.wrapping_add(1) != sequence);
        if gap {
            self.sequence_gaps += 1;
        }
        self.last_sequence = Some(sequence);
        gap
    }
}

/// Per-stream decoder owning all raster, scan and odometry state
pub struct TelemetryDecoder {
    sync: FrameSynchronizer,
    map: MapRaster,
    scan: LaserScan,
    estimator: CenterEstimator,
    odometry: Odometry,
    verbosity: Verbosity,
    stats: DecodeStats,
}

impl TelemetryDecoder {
    /// Decoder estimating into `window`, tracing the categories in `verbosity`
    pub fn new(window: RasterWindow, verbosity: Verbosity) -> Self {
        Self {
            sync: FrameSynchronizer::new(),
            map: MapRaster::new(),
            scan: LaserScan::new(),
            estimator: CenterEstimator::new(window),
            odometry: Odometry::default(),
            verbosity,
            stats: DecodeStats::default(),
        }
    }

    /// Cap the frame accumulation buffer (see [`FrameSynchronizer::with_max_len`])
    pub fn with_max_frame_len(mut self, max_len: usize) -> Self {
        self.sync = self.sync.with_max_len(max_len);
        self
    }

    /// Feed one byte; returns the interpreted frame if this byte completed one
    pub fn update(&mut self, byte: u8) -> Option<Update> {
        let frame = self.sync.feed(byte);
        self.stats.overflows = self.sync.overflows();
        let frame = frame?;

        self.stats.frames += 1;
        if self.stats.frames % STATS_LOG_INTERVAL == 0 {
            self.log_stats();
        }

        match self.process_frame(&frame) {
            Ok(update) => {
                log::trace!(
                    "Decoded {} frame {}",
                    update.decoded.message.kind(),
                    update.decoded.header.sequence
                );
                Some(update)
            }
            Err(e) => {
                log::warn!("Dropping {}-byte frame: {}", frame.len(), e);
                None
            }
        }
    }

    /// Feed a chunk of bytes
    pub fn update_slice(&mut self, bytes: &[u8]) -> Vec<Update> {
        bytes.iter().filter_map(|&b| self.update(b)).collect()
    }

    /// Decode and interpret one frame
    ///
    /// Errors are counted in [`DecodeStats`] and returned. State is only
    /// touched when the whole message is accepted.
    pub fn process_frame(&mut self, frame: &Frame) -> Result<Update> {
        // Any frame with a readable header counts toward sequence continuity,
        // whether or not its payload is accepted
        if let Ok(header) = frame.validate().and_then(|_| frame.header()) {
            self.record_sequence(header.sequence);
        }

        let result = decode(frame).and_then(|decoded| {
            let effect = self.interpret(&decoded)?;
            Ok(Update { decoded, effect })
        });

        match &result {
            Ok(update) => self.record(update),
            Err(e) => self.stats.record_error(e),
        }
        result
    }

    fn record_sequence(&mut self, sequence: u16) {
        let expected = self.stats.last_sequence.map(|s| s.wrapping_add(1));
        if self.stats.record_sequence(sequence) {
            log::debug!(
                "Sequence gap: expected {}, got {}",
                expected.unwrap_or_default(),
                sequence
            );
        }
    }

    fn record(&mut self, update: &Update) {
        match &update.decoded.message {
            Message::Text(_) => self.stats.text += 1,
            Message::Laser(_) => self.stats.laser += 1,
            Message::Map(_) => self.stats.map += 1,
            Message::Odometry(_) => self.stats.odometry += 1,
            Message::Unknown(_) => self.stats.unknown += 1,
        }
        if let Effect::RevolutionComplete(pass) = update.effect {
            self.stats.revolutions += 1;
            if pass.center.is_some() {
                self.stats.centers += 1;
            }
        }
    }

    fn interpret(&mut self, decoded: &DecodedMessage) -> Result<Effect> {
        let header = &decoded.header;
        match &decoded.message {
            Message::Text(text) => {
                self.trace_text(header, text);
                Ok(Effect::None)
            }
            Message::Map(tile) => {
                self.map.write(tile.address, &tile.data)?;
                self.trace_map(header, tile);
                Ok(Effect::MapUpdated)
            }
            Message::Laser(laser) => {
                self.scan.apply(laser)?;
                self.trace_laser(header, laser);
                if !laser.completes_revolution() {
                    return Ok(Effect::ScanUpdated);
                }
                let pass = self.estimator.estimate(&self.scan);
                self.trace_center(&pass);
                Ok(Effect::RevolutionComplete(pass))
            }
            Message::Odometry(odom) => {
                self.odometry = *odom;
                self.trace_odometry(header, odom);
                Ok(Effect::OdometryUpdated)
            }
            Message::Unknown(code) => {
                if self.verbosity.contains(Verbosity::DEBUG) {
                    log::info!(
                        target: "drishti::debug",
                        "{} ({}):\tunknown type {:#06x}",
                        header.sequence,
                        header.timestamp,
                        code
                    );
                } else {
                    log::debug!("Skipping unknown message type {:#06x}", code);
                }
                Ok(Effect::None)
            }
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[inline]
    pub fn map(&self) -> &MapRaster {
        &self.map
    }

    #[inline]
    pub fn scan(&self) -> &LaserScan {
        &self.scan
    }

    /// Estimated center in raster coordinates
    #[inline]
    pub fn center(&self) -> Option<Point2D> {
        self.estimator.center()
    }

    /// Estimated center in sensor units
    pub fn center_sensor(&self) -> Option<Point2D> {
        self.estimator.center_sensor()
    }

    #[inline]
    pub fn window(&self) -> &RasterWindow {
        self.estimator.window()
    }

    #[inline]
    pub fn odometry(&self) -> &Odometry {
        &self.odometry
    }

    #[inline]
    pub fn stats(&self) -> &DecodeStats {
        &self.stats
    }

    #[inline]
    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// Render the current scan and center estimate
    pub fn render_laser(&self) -> LaserRaster {
        LaserRaster::render(&self.scan, self.estimator.window(), self.estimator.center())
    }

    pub fn log_stats(&self) {
        let s = &self.stats;
        log::info!(
            "Frames: {} (text {}, laser {}, map {}, odometry {}, unknown {}), errors: {} (framing {}, truncated {}, out-of-bounds {}), sequence gaps: {}",
            s.frames,
            s.text,
            s.laser,
            s.map,
            s.odometry,
            s.unknown,
            s.errors(),
            s.framing_errors,
            s.truncated,
            s.out_of_bounds,
            s.sequence_gaps
        );
    }

    // ========================================================================
    // Category traces
    // ========================================================================

    fn trace_text(&self, header: &Header, text: &TextMessage) {
        if self.verbosity.contains(Verbosity::TEXT) {
            log::info!(
                target: "drishti::text",
                "{} ({}):\t(text, {} bytes): {}",
                header.sequence,
                header.timestamp,
                text.body.len(),
                text.text()
            );
        }
    }

    fn trace_map(&self, header: &Header, tile: &MapTile) {
        if self.verbosity.contains(Verbosity::MAP) {
            log::info!(
                target: "drishti::map",
                "{} ({}):\t(map, {} bytes @ {})",
                header.sequence,
                header.timestamp,
                tile.data.len(),
                tile.address
            );
        }
    }

    fn trace_laser(&self, header: &Header, laser: &LaserMessage) {
        if self.verbosity.contains(Verbosity::LASER) {
            let ranges = laser
                .points
                .iter()
                .map(|p| format!("{:.1}", p.range()))
                .collect::<Vec<_>>()
                .join(", ");
            log::info!(
                target: "drishti::laser",
                "{} ({}):\t(laser, {} deg): {}",
                header.sequence,
                header.timestamp,
                laser.index,
                ranges
            );
        }
    }

    fn trace_center(&self, pass: &CenterPass) {
        if !self.verbosity.contains(Verbosity::LASER) {
            return;
        }
        match (pass.center, self.estimator.center_sensor()) {
            (Some(_), Some(sensor)) => log::info!(
                target: "drishti::laser",
                "Revolution complete: center ({:.1}, {:.1}) from {}/{} intersections",
                sensor.x,
                sensor.y,
                pass.intersections,
                pass.candidates
            ),
            _ => log::info!(
                target: "drishti::laser",
                "Revolution complete: no intersections ({} candidates), keeping previous center",
                pass.candidates
            ),
        }
    }

    fn trace_odometry(&self, header: &Header, odom: &Odometry) {
        if self.verbosity.contains(Verbosity::ODOMETRY) {
            log::info!(
                target: "drishti::odometry",
                "{} ({}):\t(odometry) left {} @ {:.3}, right {} @ {:.3}, unknown {}",
                header.sequence,
                header.timestamp,
                odom.left.count,
                odom.left.speed,
                odom.right.count,
                odom.right.speed,
                odom.unknown
            );
        }
    }
}

impl Default for TelemetryDecoder {
    fn default() -> Self {
        Self::new(RasterWindow::sensor_range(512), Verbosity::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::constants::{FOOTER_MARKER, HEADER_MARKER, TYPE_MAP, TYPE_ODOMETRY};

    fn frame(msg_type: u16, seq: u16, body: &[u8]) -> Vec<u8> {
        let mut bytes = HEADER_MARKER.to_vec();
        bytes.extend_from_slice(&msg_type.to_le_bytes());
        bytes.extend_from_slice(&seq.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(body);
        bytes.extend_from_slice(&FOOTER_MARKER);
        bytes
    }

    fn map_body(address: i32, data: &[u8]) -> Vec<u8> {
        let mut body = (data.len() as i32).to_le_bytes().to_vec();
        body.extend_from_slice(&address.to_le_bytes());
        body.extend_from_slice(&[0; 4]);
        body.extend_from_slice(data);
        body
    }

    #[test]
    fn test_map_update_effect() {
        let mut decoder = TelemetryDecoder::default();
        let updates = decoder.update_slice(&frame(TYPE_MAP, 1, &map_body(10, &[1, 2, 3])));

        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].effect, Effect::MapUpdated);
        assert_eq!(decoder.map().read(10, 13).unwrap(), &[1, 2, 3]);
        assert_eq!(decoder.stats().map, 1);
    }

    #[test]
    fn test_rejected_map_counts_and_continues() {
        let mut decoder = TelemetryDecoder::default();
        let mut stream = frame(TYPE_MAP, 1, &map_body(65534, &[9, 9, 9, 9]));
        stream.extend(frame(TYPE_MAP, 2, &map_body(0, &[5])));

        let updates = decoder.update_slice(&stream);
        assert_eq!(updates.len(), 1);
        assert_eq!(decoder.stats().out_of_bounds, 1);
        assert_eq!(decoder.stats().frames, 2);
        assert_eq!(decoder.map().read(65534, 65536).unwrap(), &[0, 0]);
    }

    #[test]
    fn test_sequence_gap_counted() {
        let mut decoder = TelemetryDecoder::default();
        let body = [0u8; 16];
        let mut stream = Vec::new();
        for seq in [7u16, 8, 10, 11] {
            stream.extend(frame(TYPE_ODOMETRY, seq, &body));
        }
        decoder.update_slice(&stream);

        assert_eq!(decoder.stats().odometry, 4);
        assert_eq!(decoder.stats().sequence_gaps, 1);
        assert_eq!(decoder.stats().last_sequence, Some(11));
    }

    #[test]
    fn test_sequence_wraps_without_gap() {
        let mut stats = DecodeStats::default();
        assert!(!stats.record_sequence(u16::MAX));
        assert!(!stats.record_sequence(0));
        assert!(stats.record_sequence(5));
    }

    #[test]
    fn test_framing_error_counted() {
        let mut decoder = TelemetryDecoder::default();
        // Footer alone forms a 4-byte "frame" with no header
        assert!(decoder.update_slice(&FOOTER_MARKER).is_empty());
        assert_eq!(decoder.stats().framing_errors, 1);
    }

    #[test]
    fn test_rejected_frame_still_advances_sequence() {
        let mut decoder = TelemetryDecoder::default();
        let mut stream = frame(TYPE_MAP, 1, &map_body(0, &[5]));
        stream.extend(frame(TYPE_MAP, 2, &map_body(65534, &[9, 9, 9, 9])));
        stream.extend(frame(TYPE_MAP, 3, &map_body(1, &[6])));

        let updates = decoder.update_slice(&stream);
        assert_eq!(updates.len(), 2);
        assert_eq!(decoder.stats().out_of_bounds, 1);
        assert_eq!(decoder.stats().sequence_gaps, 0);
        assert_eq!(decoder.stats().last_sequence, Some(3));
    }

    #[test]
    fn test_long_text_survives_without_cap() {
        let mut body = 70_000i32.to_le_bytes().to_vec();
        body.extend(std::iter::repeat(b'a').take(70_000));
        let stream = frame(crate::protocol::constants::TYPE_TEXT, 1, &body);

        let mut decoder = TelemetryDecoder::default();
        let updates = decoder.update_slice(&stream);
        assert_eq!(updates.len(), 1);
        match &updates[0].decoded.message {
            Message::Text(text) => assert_eq!(text.body.len(), 70_000),
            other => panic!("expected text, got {:?}", other),
        }
        assert_eq!(decoder.stats().overflows, 0);
        assert_eq!(decoder.stats().errors(), 0);

        // A capped decoder drops it as an overflow, not as a framing error
        let mut capped = TelemetryDecoder::default().with_max_frame_len(1024);
        assert!(capped.update_slice(&stream).is_empty());
        assert_eq!(capped.stats().overflows, 1);
        assert_eq!(capped.stats().framing_errors, 0);
        assert_eq!(capped.stats().frames, 0);
    }
}
