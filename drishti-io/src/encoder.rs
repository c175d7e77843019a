//! Image output for recorded rasters
//!
//! Gray snapshots are written as an endlessly looping animated GIF; the final
//! map can also be written as a single 8-bit grayscale image (`.pgm`).

use crate::error::{Error, Result};
use crate::raster::MapRaster;
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, GrayImage, Rgba, RgbaImage};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Write `frames` (each `side`×`side` gray bytes) as an animated GIF
///
/// Returns the number of frames written. An empty sequence writes nothing.
pub fn write_animation<P: AsRef<Path>>(
    path: P,
    frames: &[Vec<u8>],
    side: u32,
    delay_ms: u32,
) -> Result<usize> {
    let path = path.as_ref();
    if frames.is_empty() {
        log::warn!("No frames recorded, skipping {}", path.display());
        return Ok(0);
    }

    let expected = (side as usize) * (side as usize);
    if let Some((i, bad)) = frames.iter().enumerate().find(|(_, f)| f.len() != expected) {
        return Err(Error::Other(format!(
            "Frame {} has {} bytes, expected {}",
            i,
            bad.len(),
            expected
        )));
    }

    // Frames are expanded to RGBA one at a time as the encoder pulls them
    let delay = Delay::from_numer_denom_ms(delay_ms, 1);
    let gif_frames = frames
        .iter()
        .map(|gray| Frame::from_parts(gray_to_rgba(gray, side), 0, 0, delay));

    let writer = BufWriter::new(File::create(path)?);
    let mut encoder = GifEncoder::new(writer);
    encoder.set_repeat(Repeat::Infinite)?;
    encoder.encode_frames(gif_frames)?;

    log::info!("Wrote {} frames to {}", frames.len(), path.display());
    Ok(frames.len())
}

/// Write the map as a single grayscale image, format chosen by extension
pub fn write_map_image<P: AsRef<Path>>(path: P, map: &MapRaster) -> Result<()> {
    let path = path.as_ref();
    let side = map.side();
    let image = GrayImage::from_raw(side, side, map.as_bytes().to_vec())
        .ok_or_else(|| Error::Other("Map raster size mismatch".to_string()))?;
    image.save(path)?;

    log::info!("Wrote map image to {}", path.display());
    Ok(())
}

fn gray_to_rgba(gray: &[u8], side: u32) -> RgbaImage {
    RgbaImage::from_fn(side, side, |x, y| {
        let v = gray[(y * side + x) as usize];
        Rgba([v, v, v, 255])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_animation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anim.gif");
        let frames = vec![vec![0u8; 16 * 16], vec![200u8; 16 * 16]];

        assert_eq!(write_animation(&path, &frames, 16, 10).unwrap(), 2);
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"GIF89a"));
    }

    #[test]
    fn test_empty_animation_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("none.gif");
        assert_eq!(write_animation(&path, &[], 16, 10).unwrap(), 0);
        assert!(!path.exists());
    }

    #[test]
    fn test_wrong_frame_size_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.gif");
        let frames = vec![vec![0u8; 16 * 16], vec![0u8; 10]];
        assert!(write_animation(&path, &frames, 16, 10).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_write_map_pgm() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.pgm");
        let mut map = MapRaster::new();
        map.write(0, &[7, 7, 7]).unwrap();

        write_map_image(&path, &map).unwrap();
        let loaded = image::open(&path).unwrap().into_luma8();
        assert_eq!(loaded.dimensions(), (256, 256));
        assert_eq!(loaded.get_pixel(2, 0).0[0], 7);
    }
}
