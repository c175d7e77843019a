//! Application orchestration: source → decoder → recorder → image files
//!
//! Pumps chunks from a [`ByteSource`] through the [`TelemetryDecoder`] until
//! the source is exhausted or the shutdown flag drops, then writes the
//! configured outputs.

use crate::config::{AppConfig, OutputConfig};
use crate::decoder::{DecodeStats, Effect, TelemetryDecoder};
use crate::encoder;
use crate::error::Result;
use crate::scan::RasterWindow;
use crate::sink::{RasterSink, Recorder};
use crate::source::{self, ByteSource};
use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

const READ_CHUNK: usize = 4096;
const IDLE_SLEEP: Duration = Duration::from_millis(1);
const PROGRESS_LOG_INTERVAL: Duration = Duration::from_secs(10);

/// Decoding session over one byte source
pub struct App {
    source: Box<dyn ByteSource>,
    decoder: TelemetryDecoder,
    recorder: Recorder,
    output: OutputConfig,
    running: Arc<AtomicBool>,
}

impl App {
    /// Open the configured source and build a decoder for it
    pub fn new(config: &AppConfig) -> Result<Self> {
        config.validate()?;
        info!("Opening {:?} source {}", config.source.kind, config.source.path);
        let source = source::open(&config.source)?;
        Ok(Self::with_source(source, config))
    }

    /// Session over an already opened source
    pub fn with_source(source: Box<dyn ByteSource>, config: &AppConfig) -> Self {
        let window = RasterWindow::sensor_range(config.output.laser_raster_size);
        let mut decoder = TelemetryDecoder::new(window, config.logging.verbosity);
        if let Some(max_len) = config.source.max_frame_len {
            decoder = decoder.with_max_frame_len(max_len);
        }
        Self {
            source,
            decoder,
            recorder: Recorder::new(config.output.laser_animation.is_some()),
            output: config.output.clone(),
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Flag that stops [`run`](Self::run) when cleared
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    pub fn decoder(&self) -> &TelemetryDecoder {
        &self.decoder
    }

    pub fn recorder(&self) -> &Recorder {
        &self.recorder
    }

    /// Decode until the source ends or shutdown is requested, then write outputs
    pub fn run(&mut self) -> Result<DecodeStats> {
        info!("Decoding from {}", self.source.describe());

        self.pump()?;
        self.write_outputs()?;

        self.decoder.log_stats();
        let stats = *self.decoder.stats();
        info!(
            "Done: {} map frames, {} revolutions ({} centers), {} overflows",
            self.recorder.map_frames().len(),
            stats.revolutions,
            stats.centers,
            stats.overflows
        );
        if let Some(center) = self.decoder.center_sensor() {
            info!("Final center estimate: ({:.1}, {:.1})", center.x, center.y);
        }
        Ok(stats)
    }

    fn pump(&mut self) -> Result<()> {
        let mut buffer = [0u8; READ_CHUNK];
        let mut last_progress = Instant::now();

        while self.running.load(Ordering::Relaxed) {
            let n = self.source.read(&mut buffer)?;
            if n == 0 {
                if self.source.is_exhausted() {
                    debug!("Source exhausted");
                    break;
                }
                std::thread::sleep(IDLE_SLEEP);
                continue;
            }

            for &byte in &buffer[..n] {
                let Some(update) = self.decoder.update(byte) else {
                    continue;
                };
                match update.effect {
                    Effect::MapUpdated => self.recorder.on_map(self.decoder.map()),
                    Effect::RevolutionComplete(_) => {
                        let laser = self.decoder.render_laser();
                        self.recorder.on_revolution(&laser);
                    }
                    _ => {}
                }
            }

            if last_progress.elapsed() >= PROGRESS_LOG_INTERVAL {
                self.decoder.log_stats();
                last_progress = Instant::now();
            }
        }

        if !self.running.load(Ordering::Relaxed) {
            info!("Shutdown requested, finishing with data decoded so far");
        }
        Ok(())
    }

    fn write_outputs(&self) -> Result<()> {
        let delay = self.output.frame_delay_ms;

        if let Some(path) = &self.output.map_animation {
            let side = self.decoder.map().side();
            encoder::write_animation(path, self.recorder.map_frames(), side, delay)?;
        }

        if let Some(path) = &self.output.laser_animation {
            match self.recorder.laser_side() {
                Some(side) => {
                    encoder::write_animation(path, self.recorder.laser_frames(), side, delay)?;
                }
                None => warn!("No complete revolutions, skipping {}", path),
            }
        }

        if let Some(path) = &self.output.map_image {
            encoder::write_map_image(path, self.decoder.map())?;
        }
        Ok(())
    }
}
