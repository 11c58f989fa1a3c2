//! Basic example of profiling a track before and after terrain correction.
//!
//! Run with: cargo run --example basic_profile

use track_profile::{
    record::analyze_track, CorrectionOptions, ElevationDataset, Track, TrackPoint,
};

/// A tilted plane standing in for real SRTM tiles: 1m higher per 10m north.
struct TiltedPlane;

impl ElevationDataset for TiltedPlane {
    fn elevation_at(&self, latitude: f64, _longitude: f64, _interpolate: bool) -> Option<f64> {
        Some(400.0 + (latitude - 46.0) * 11_132.0)
    }
}

fn main() {
    // A noisy northbound climb, ~55m between points
    let recorded = [402.0, 409.0, 404.0, 418.0, 415.0, 430.0, 426.0, 441.0];
    let points: Vec<TrackPoint> = recorded
        .iter()
        .enumerate()
        .map(|(i, &e)| TrackPoint::new(46.0 + i as f64 * 0.0005, 7.0, Some(e)))
        .collect();
    let track = Track::from_points(points);

    let record = analyze_track(
        Default::default(),
        "demo.gpx".to_string(),
        track,
        &TiltedPlane,
        &CorrectionOptions::default(),
    );

    println!("Track Profile Example\n");
    println!("  2D length: {}m", record.stats.length_2d_meters);
    println!("  3D length: {}m\n", record.stats.length_3d_meters);

    println!("  Recorded: +{}m / -{}m",
        record.stats.uphill_orig_meters, record.stats.downhill_orig_meters);
    println!("  Terrain:  +{}m / -{}m\n",
        record.stats.uphill_srtm_meters, record.stats.downhill_srtm_meters);

    println!("  {:>8}  {:>9}  {:>9}", "dist", "recorded", "terrain");
    for (orig, srtm) in record.elevation.orig.iter().zip(record.elevation.srtm.iter()) {
        println!("  {:>7.0}m  {:>8.1}m  {:>8.1}m",
            orig.0, orig.1.unwrap_or(f64::NAN), srtm.1.unwrap_or(f64::NAN));
    }
}
