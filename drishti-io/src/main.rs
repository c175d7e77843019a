//! DrishtiIO command line
//!
//! Replays a capture file (or reads a serial port) and writes the decoded map
//! history as an animated GIF.
//!
//! ```text
//! drishti-io capture.bin map.gif
//! drishti-io --serial /dev/ttyUSB0 --laser-gif laser.gif -v text,laser
//! drishti-io -c drishti.toml
//! ```

use clap::Parser;
use drishti_io::config::{AppConfig, SourceKind};
use drishti_io::error::{Error, Result};
use drishti_io::{App, Verbosity};
use std::sync::atomic::Ordering;

#[derive(Parser)]
#[command(name = "drishti-io")]
#[command(about = "Decode rangefinder telemetry into map and laser animations")]
struct Args {
    /// Capture file to replay
    input: Option<String>,

    /// Animated GIF of map updates
    output: Option<String>,

    /// TOML configuration file; command line values override it
    #[arg(short, long)]
    config: Option<String>,

    /// Read from this serial device instead of a file
    #[arg(long, conflicts_with = "input")]
    serial: Option<String>,

    /// Serial baud rate
    #[arg(long)]
    baud: Option<u32>,

    /// Trace categories: names (text,laser,map,odometry,debug), all, none, or a bitmask
    #[arg(short, long)]
    verbose: Option<Verbosity>,

    /// Animated GIF of completed revolutions
    #[arg(long)]
    laser_gif: Option<String>,

    /// Final map as a grayscale image (.pgm)
    #[arg(long)]
    map_image: Option<String>,

    /// Side length of the laser raster
    #[arg(long)]
    raster_size: Option<u32>,
}

impl Args {
    fn into_config(self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::from_file(path)?,
            None => AppConfig::default(),
        };

        if let Some(input) = self.input {
            config.source.kind = SourceKind::File;
            config.source.path = input;
        }
        if let Some(device) = self.serial {
            config.source.kind = SourceKind::Serial;
            config.source.path = device;
        }
        if let Some(baud) = self.baud {
            config.source.baud_rate = baud;
        }
        if let Some(output) = self.output {
            config.output.map_animation = Some(output);
        }
        if let Some(path) = self.laser_gif {
            config.output.laser_animation = Some(path);
        }
        if let Some(path) = self.map_image {
            config.output.map_image = Some(path);
        }
        if let Some(size) = self.raster_size {
            config.output.laser_raster_size = size;
        }
        if let Some(verbosity) = self.verbose {
            config.logging.verbosity = verbosity;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let config = Args::parse().into_config()?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    log::info!("DrishtiIO v{} starting...", env!("CARGO_PKG_VERSION"));
    log::info!("Trace categories: {}", config.logging.verbosity);

    let mut app = App::new(&config)?;

    let running = app.running_flag();
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        running.store(false, Ordering::Relaxed);
    })
    .map_err(|e| Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;

    let stats = app.run()?;
    if stats.errors() > 0 {
        log::warn!("{} frames dropped", stats.errors());
    }
    Ok(())
}
