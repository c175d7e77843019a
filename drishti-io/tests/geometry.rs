//! Revolution assembly and center estimation through the full decoder.

mod common;

use approx::assert_relative_eq;
use common::*;
use drishti_io::{Effect, TelemetryDecoder};

fn last_effect(decoder: &mut TelemetryDecoder, stream: &[u8]) -> Effect {
    decoder
        .update_slice(stream)
        .last()
        .map(|u| u.effect)
        .expect("stream should produce at least one update")
}

#[test]
fn test_four_quarters_mark_every_slot_valid() {
    let mut decoder = TelemetryDecoder::default();
    let effect = last_effect(
        &mut decoder,
        &revolution(1, |deg| circle_point(0.0, 0.0, 100.0, deg)),
    );

    assert_eq!(decoder.scan().valid_count(), 360);
    assert!(decoder
        .scan()
        .slots()
        .iter()
        .all(|s| s.x.abs() <= 100 && s.y.abs() <= 100));

    let Effect::RevolutionComplete(pass) = effect else {
        panic!("expected revolution, got {:?}", effect);
    };
    assert_eq!(pass.candidates, 180);
    assert!(pass.intersections > 0 && pass.intersections <= pass.candidates);

    let center = decoder.center().unwrap();
    let window = decoder.window();
    assert!(window.contains(&center));
    assert_relative_eq!(center.x, 256.0, epsilon = 1.0);
    assert_relative_eq!(center.y, 256.0, epsilon = 1.0);
}

#[test]
fn test_offset_circle_center() {
    let mut decoder = TelemetryDecoder::default();
    decoder.update_slice(&revolution(1, |deg| circle_point(10.0, -20.0, 80.0, deg)));

    // Scale 0.5 with y flipped: (10, -20) lands at (261, 266)
    let center = decoder.center().unwrap();
    assert_relative_eq!(center.x, 261.0, epsilon = 1.0);
    assert_relative_eq!(center.y, 266.0, epsilon = 1.0);

    let sensor = decoder.center_sensor().unwrap();
    assert_relative_eq!(sensor.x, 10.0, epsilon = 2.0);
    assert_relative_eq!(sensor.y, -20.0, epsilon = 2.0);
}

#[test]
fn test_partial_revolution_does_not_estimate() {
    let mut decoder = TelemetryDecoder::default();
    let stream = revolution(1, |deg| circle_point(0.0, 0.0, 60.0, deg));
    // Drop the 270° quarter
    let three_quarters = &stream[..stream.len() * 3 / 4];

    let effect = last_effect(&mut decoder, three_quarters);
    assert_eq!(effect, Effect::ScanUpdated);
    assert_eq!(decoder.scan().valid_count(), 270);
    assert!(decoder.center().is_none());
    assert_eq!(decoder.stats().revolutions, 0);
}

#[test]
fn test_collinear_revolution_keeps_previous_center() {
    let mut decoder = TelemetryDecoder::default();
    decoder.update_slice(&revolution(1, |deg| circle_point(10.0, -20.0, 80.0, deg)));
    let before = decoder.center().unwrap();

    // Every point on y = 0 with distinct x: both segments of every angle are parallel
    let effect = last_effect(
        &mut decoder,
        &revolution(5, |deg| (deg as i16 - 180, 0)),
    );

    let Effect::RevolutionComplete(pass) = effect else {
        panic!("expected revolution, got {:?}", effect);
    };
    assert_eq!(pass.candidates, 180);
    assert_eq!(pass.intersections, 0);
    assert!(pass.center.is_none());
    assert_eq!(decoder.center(), Some(before));
    assert_eq!(decoder.stats().revolutions, 2);
    assert_eq!(decoder.stats().centers, 1);
}

#[test]
fn test_out_of_range_points_are_skipped() {
    let mut decoder = TelemetryDecoder::default();
    // Every third degree far outside the sensor window
    decoder.update_slice(&revolution(1, |deg| {
        if deg % 3 == 0 {
            (600, 600)
        } else {
            circle_point(0.0, 0.0, 90.0, deg)
        }
    }));

    assert_eq!(decoder.scan().valid_count(), 240);
    let center = decoder.center().unwrap();
    assert_relative_eq!(center.x, 256.0, epsilon = 1.0);
    assert_relative_eq!(center.y, 256.0, epsilon = 1.0);
}

#[test]
fn test_rendered_laser_raster_marks_center() {
    let mut decoder = TelemetryDecoder::default();
    decoder.update_slice(&revolution(1, |deg| circle_point(0.0, 0.0, 100.0, deg)));

    let raster = decoder.render_laser();
    assert_eq!(raster.side(), 512);
    let center = decoder.center().unwrap();
    assert_eq!(
        raster.get(center.x as u32, center.y as u32),
        Some(drishti_io::raster::CENTER_MARK)
    );
    // Point at 0° is (100, 0) → column 306, row 256
    assert_eq!(raster.get(306, 256), Some(drishti_io::raster::LASER_HIT));
}
